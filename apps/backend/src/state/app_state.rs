use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::config::admin_allowlist::AdminAllowlist;
use crate::config::payments::PaymentConfig;
use crate::payments::memory::InMemoryGateway;
use crate::payments::PaymentGateway;

/// Shared resources handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    /// `None` in tests that exercise routing without a database
    db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
    pub payments: PaymentConfig,
    pub gateway: Arc<dyn PaymentGateway>,
    pub admins: Option<AdminAllowlist>,
}

impl AppState {
    pub fn new(
        db: Option<DatabaseConnection>,
        security: SecurityConfig,
        payments: PaymentConfig,
        gateway: Arc<dyn PaymentGateway>,
        admins: Option<AdminAllowlist>,
    ) -> Self {
        Self {
            db,
            security,
            payments,
            gateway,
            admins,
        }
    }

    /// No database, in-memory gateway.
    pub fn without_db(security: SecurityConfig) -> Self {
        Self::new(
            None,
            security,
            PaymentConfig::for_tests(),
            Arc::new(InMemoryGateway::new()),
            None,
        )
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admins
            .as_ref()
            .is_some_and(|admins| admins.is_admin(email))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db.is_some())
            .field("payments", &self.payments)
            .field("gateway", &self.gateway.name())
            .finish_non_exhaustive()
    }
}
