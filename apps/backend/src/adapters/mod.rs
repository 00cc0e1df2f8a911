//! SeaORM adapters. Functions return `DbErr`; repos map to `DomainError`.

pub mod applications_sea;
pub mod breeds_sea;
pub mod listings_sea;
pub mod notifications_sea;
pub mod payouts_sea;
pub mod transactions_sea;
pub mod users_sea;
