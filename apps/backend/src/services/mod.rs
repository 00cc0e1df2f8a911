//! Business services: rules that span repos, transactions and the gateway.

pub mod applications;
pub mod breeds;
pub mod dashboard;
pub mod listings;
pub mod notifications;
pub mod payments;
pub mod payouts;
pub mod users;
