//! Repository functions for the domain layer.
//!
//! Generic over `ConnectionTrait`; convert SeaORM models into serializable
//! domain models and `DbErr` into `DomainError`.

pub mod applications;
pub mod breeds;
pub mod listings;
pub mod notifications;
pub mod payouts;
pub mod transactions;
pub mod users;
