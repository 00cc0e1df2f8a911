use jsonwebtoken::Algorithm;

/// JWT signing settings.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Vec<u8>,
    pub algorithm: Algorithm,
    /// Access-token lifetime in seconds
    pub token_ttl_secs: i64,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl_secs: 15 * 60,
        }
    }

    /// Random per-process secret for tests.
    pub fn for_tests() -> Self {
        Self::new(format!("pawhaven-test-{}", ulid::Ulid::new()).into_bytes())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
