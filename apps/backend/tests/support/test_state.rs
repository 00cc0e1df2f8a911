use std::sync::Arc;

use pawhaven_backend::config::admin_allowlist::AdminAllowlist;
use pawhaven_backend::config::db::{DbKind, RuntimeEnv};
use pawhaven_backend::config::payments::PaymentConfig;
use pawhaven_backend::db::require_db;
use pawhaven_backend::payments::memory::InMemoryGateway;
use pawhaven_backend::state::app_state::AppState;
use pawhaven_backend::state::security_config::SecurityConfig;
use pawhaven_backend::{build_state, AppError};
use sea_orm::DatabaseConnection;

/// Addresses promoted to admin at login.
pub const ADMIN_PATTERN: &str = "*@admin.pawhaven.test";

/// State plus a handle on the in-memory gateway it was built with, so tests
/// can settle checkouts and fail transfers.
pub struct TestEnv {
    pub state: AppState,
    pub gateway: Arc<InMemoryGateway>,
}

impl TestEnv {
    pub fn db(&self) -> &DatabaseConnection {
        require_db(&self.state).expect("test state has a database")
    }
}

/// `PAWHAVEN_TEST_DB_KIND` (e.g. `postgres`), in-memory SQLite by default.
fn test_db_kind() -> DbKind {
    std::env::var("PAWHAVEN_TEST_DB_KIND")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DbKind::SqliteMemory)
}

pub async fn build_test_env() -> Result<TestEnv, AppError> {
    let gateway = Arc::new(InMemoryGateway::new());
    let state = build_state()
        .with_env(RuntimeEnv::Test)
        .with_db(test_db_kind())
        .with_security(SecurityConfig::for_tests())
        .with_payments(PaymentConfig::for_tests())
        .with_gateway(gateway.clone())
        .with_admins(AdminAllowlist::from_patterns([ADMIN_PATTERN]))
        .build()
        .await?;
    Ok(TestEnv { state, gateway })
}

pub async fn build_test_state() -> Result<AppState, AppError> {
    Ok(build_test_env().await?.state)
}
