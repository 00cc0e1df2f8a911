//! Admin e-mail allowlist.
//!
//! `ADMIN_EMAILS` is a comma-separated list of exact addresses or `*` glob
//! patterns (`*@pawhaven.app`). Users whose e-mail matches are promoted to
//! the admin role at login.

use std::env;

use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone)]
pub struct AdminAllowlist {
    patterns: Vec<String>,
}

impl AdminAllowlist {
    /// `None` when `ADMIN_EMAILS` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let raw = env::var("ADMIN_EMAILS").ok()?;
        Self::from_patterns(raw.split(','))
    }

    pub fn from_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(normalize_email)
            .filter(|p| !p.is_empty())
            .collect();

        if patterns.is_empty() {
            None
        } else {
            Some(Self { patterns })
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.patterns.iter().any(|p| matches_pattern(&email, p))
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Trim, NFKC, lowercase. Shared with user lookup so stored and compared
/// addresses agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// `*` matches any run of characters, including none.
fn matches_pattern(email: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return email == pattern;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return false,
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return email == *first,
    };

    if !email.starts_with(first) || !email[first.len()..].ends_with(last) {
        return false;
    }
    if first.len() + last.len() > email.len() {
        return false;
    }

    let mut cursor = first.len();
    let end = email.len() - last.len();
    for part in middle.iter().filter(|p| !p.is_empty()) {
        match email[cursor..end].find(part) {
            Some(pos) => cursor += pos + part.len(),
            None => return false,
        }
    }
    true
}
