//! Property tests for commission splits.

use proptest::prelude::*;

use crate::domain::money::{commission, split};
use crate::domain::test_prelude;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Net plus commission always reassembles the gross amount.
    #[test]
    fn prop_split_is_exact(gross in 0i64..=1_000_000_000_000, bps in 0u32..=10_000) {
        let s = split(gross, bps);
        prop_assert_eq!(s.net + s.commission, gross);
        prop_assert!(s.commission >= 0);
        prop_assert!(s.net >= 0);
    }

    /// Rounding never moves the commission more than half a unit.
    #[test]
    fn prop_commission_within_half_unit(gross in 0i64..=1_000_000_000, bps in 0u32..=10_000) {
        let exact = gross as f64 * f64::from(bps) / 10_000.0;
        let c = commission(gross, bps) as f64;
        prop_assert!((c - exact).abs() <= 0.5 + 1e-6);
    }

    /// Higher rates never yield a smaller commission.
    #[test]
    fn prop_commission_monotonic_in_rate(gross in 0i64..=1_000_000_000, a in 0u32..=10_000, b in 0u32..=10_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(commission(gross, lo) <= commission(gross, hi));
    }
}
