use std::sync::Arc;

use tracing::info;

use crate::config::admin_allowlist::AdminAllowlist;
use crate::config::db::{DbKind, RuntimeEnv};
use crate::config::payments::{GatewayKind, PaymentConfig};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::payments::http::HttpGateway;
use crate::payments::memory::InMemoryGateway;
use crate::payments::PaymentGateway;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Assembles an `AppState` for the server and for tests.
pub struct StateBuilder {
    env: RuntimeEnv,
    db_kind: Option<DbKind>,
    security: SecurityConfig,
    payments: PaymentConfig,
    gateway: Option<Arc<dyn PaymentGateway>>,
    admins: Option<AdminAllowlist>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Test,
            db_kind: None,
            security: SecurityConfig::default(),
            payments: PaymentConfig::for_tests(),
            gateway: None,
            admins: None,
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_payments(mut self, payments: PaymentConfig) -> Self {
        self.payments = payments;
        self
    }

    /// Overrides the gateway `with_payments` would select.
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_admins(mut self, admins: Option<AdminAllowlist>) -> Self {
        self.admins = admins;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => gateway_for(&self.payments)?,
        };
        info!(gateway = gateway.name(), "Payment gateway selected");

        let db = match self.db_kind {
            Some(kind) => Some(bootstrap_db(self.env, kind).await?),
            None => None,
        };

        Ok(AppState::new(
            db,
            self.security,
            self.payments,
            gateway,
            self.admins,
        ))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn gateway_for(cfg: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>, AppError> {
    match cfg.gateway {
        GatewayKind::Memory => Ok(Arc::new(InMemoryGateway::new())),
        GatewayKind::Http => {
            let key = cfg
                .secret_key
                .as_deref()
                .ok_or_else(|| AppError::config("PAYMENT_SECRET_KEY is required for the http gateway"))?;
            Ok(Arc::new(HttpGateway::new(&cfg.base_url, key)?))
        }
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
