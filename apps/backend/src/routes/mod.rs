use actix_web::web;

pub mod applications;
pub mod auth;
pub mod breeds;
pub mod dashboard;
pub mod health;
pub mod listings;
pub mod notifications;
pub mod payments;
pub mod payouts;
pub mod users;

/// Register every route. `main.rs` and the integration tests share this, so
/// endpoint behavior is the same with or without the outer middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(auth::configure_routes)
        .configure(users::configure_routes)
        .configure(breeds::configure_routes)
        .configure(listings::configure_routes)
        .configure(applications::configure_routes)
        .configure(payments::configure_routes)
        .configure(notifications::configure_routes)
        .configure(payouts::configure_routes)
        .configure(dashboard::configure_routes);
}
