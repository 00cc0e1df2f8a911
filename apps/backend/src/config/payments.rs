//! Payment gateway and commission settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Which gateway implementation backs `AppState::gateway`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Http,
    Memory,
}

impl FromStr for GatewayKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::config(format!(
                "PAYMENT_GATEWAY must be 'http' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct PaymentConfig {
    pub gateway: GatewayKind,
    pub base_url: String,
    pub secret_key: Option<String>,
    pub callback_url: Option<String>,
    /// ISO 4217 code for newly created listings
    pub currency: String,
    /// Platform commission in basis points (1000 = 10%)
    pub commission_bps: u32,
    pub poll_max_attempts: u32,
    pub poll_interval: Duration,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("gateway", &self.gateway)
            .field("base_url", &self.base_url)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("currency", &self.currency)
            .field("commission_bps", &self.commission_bps)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

pub const DEFAULT_GATEWAY_URL: &str = "https://api.paystack.co";

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayKind::Http,
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            secret_key: None,
            callback_url: None,
            currency: "NGN".to_string(),
            commission_bps: 1000,
            poll_max_attempts: 10,
            poll_interval: Duration::from_millis(3000),
        }
    }
}

impl PaymentConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let gateway = match env::var("PAYMENT_GATEWAY") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.gateway,
        };
        let secret_key = non_empty_var("PAYMENT_SECRET_KEY");
        if gateway == GatewayKind::Http && secret_key.is_none() {
            return Err(AppError::config(
                "PAYMENT_SECRET_KEY must be set when PAYMENT_GATEWAY=http",
            ));
        }

        let commission_bps = parse_var("PLATFORM_COMMISSION_BPS", defaults.commission_bps)?;
        if commission_bps > 10_000 {
            return Err(AppError::config(format!(
                "PLATFORM_COMMISSION_BPS must be between 0 and 10000, got {commission_bps}"
            )));
        }

        let poll_max_attempts = parse_var("PAYMENT_POLL_MAX_ATTEMPTS", defaults.poll_max_attempts)?;
        if poll_max_attempts == 0 {
            return Err(AppError::config("PAYMENT_POLL_MAX_ATTEMPTS must be at least 1"));
        }
        let poll_interval_ms: u64 = parse_var("PAYMENT_POLL_INTERVAL_MS", 3000)?;

        let currency = non_empty_var("PAYMENT_CURRENCY")
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or(defaults.currency);
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::config(format!(
                "PAYMENT_CURRENCY must be a 3-letter ISO code, got '{currency}'"
            )));
        }

        Ok(Self {
            gateway,
            base_url: non_empty_var("PAYMENT_GATEWAY_URL").unwrap_or(defaults.base_url),
            secret_key,
            callback_url: non_empty_var("PAYMENT_CALLBACK_URL"),
            currency,
            commission_bps,
            poll_max_attempts,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }

    /// In-memory gateway, no poll delay.
    pub fn for_tests() -> Self {
        Self {
            gateway: GatewayKind::Memory,
            poll_max_attempts: 3,
            poll_interval: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
    }
}
