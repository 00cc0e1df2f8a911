//! Domain layer: pure marketplace rules.

pub mod application_lifecycle;
pub mod dashboard;
pub mod listing_rules;
pub mod money;

#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_money;

pub use application_lifecycle::{transition, Action, TransitionContext};
pub use money::{commission, split, Split};
