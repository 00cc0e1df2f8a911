//! Commission arithmetic in integer minor units.

use serde::Serialize;

pub const BPS_DENOMINATOR: i64 = 10_000;

/// `gross * bps / 10_000`, rounded half up.
pub fn commission(gross: i64, bps: u32) -> i64 {
    let scaled = i128::from(gross) * i128::from(bps);
    let half = i128::from(BPS_DENOMINATOR / 2);
    ((scaled + half) / i128::from(BPS_DENOMINATOR)) as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Split {
    pub gross: i64,
    pub commission: i64,
    pub net: i64,
}

pub fn split(gross: i64, bps: u32) -> Split {
    let commission = commission(gross, bps);
    Split {
        gross,
        commission,
        net: gross - commission,
    }
}
