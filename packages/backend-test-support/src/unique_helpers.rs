//! ULID-based unique values so tests never collide on unique columns.

use ulid::Ulid;

/// `{prefix}-{ulid}`
///
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("sub");
/// assert!(a.starts_with("sub-"));
/// assert_ne!(a, unique_str("sub"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// `{prefix}-{ulid}@example.test`
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, Ulid::new().to_string().to_lowercase())
}

/// A breed name that will not clash with the unique `breeds.name` index.
pub fn unique_breed_name(base: &str) -> String {
    format!("{} {}", base, Ulid::new())
}
