#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod infra;
pub mod logging;
pub mod middleware;
pub mod payments;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod trace_ctx;

pub use auth::jwt::{mint_access_token, verify_access_token, Claims};
pub use config::db::{DbKind, DbOwner, RuntimeEnv};
pub use db::txn::{with_txn, SharedTxn};
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use extractors::{AdminUser, BreederUser, CurrentUser, ValidatedJson};
pub use infra::db::connect_db;
pub use infra::state::build_state;
pub use middleware::{cors_middleware, RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan};
pub use payments::memory::InMemoryGateway;
pub use payments::PaymentGateway;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
