//! JWT helpers for tests

use std::time::{Duration, SystemTime};

use pawhaven_backend::auth::jwt::mint_access_token;
use pawhaven_backend::state::security_config::SecurityConfig;

/// Bearer token (no "Bearer " prefix) for `sub` and `email`.
pub fn mint_test_token(sub: &str, email: &str, sec: &SecurityConfig) -> String {
    mint_access_token(sub, email, SystemTime::now(), sec).expect("should mint token successfully")
}

/// Full `Authorization` header value.
pub fn bearer_header(sub: &str, email: &str, sec: &SecurityConfig) -> String {
    format!("Bearer {}", mint_test_token(sub, email, sec))
}

/// Issued two hours ago, so past any configured lifetime used in tests.
pub fn mint_expired_token(sub: &str, email: &str, sec: &SecurityConfig) -> String {
    let past_time = SystemTime::now()
        .checked_sub(Duration::from_secs(7200))
        .unwrap();
    mint_access_token(sub, email, past_time, sec).expect("should mint expired token successfully")
}
