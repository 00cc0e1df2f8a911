use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Redaction patterns. All are vetted literals.
struct Patterns {
    email: Regex,
    base64_token: Regex,
    hex_token: Regex,
    phone: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Patterns {
        email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap(),
        base64_token: Regex::new(r"\b[A-Za-z0-9+/]{16,}={0,2}\b").unwrap(),
        hex_token: Regex::new(r"\b[A-Fa-f0-9]{16,}\b").unwrap(),
        // +234 803 123 4567, 0803-123-4567, ...
        phone: Regex::new(r"\+?\d[\d\s-]{7,}\d").unwrap(),
    }
});

/// Mask PII in free text before it reaches a log line.
///
/// * e-mails keep the first character of the local part and the domain
/// * base64/hex runs of 16+ characters (tokens, secret keys) become `[REDACTED_TOKEN]`
/// * phone-number-like digit runs become `[REDACTED_PHONE]`
pub fn redact(input: &str) -> String {
    let p = &*PATTERNS;

    let emails = p.email.replace_all(input, |caps: &regex::Captures| {
        let m = &caps[0];
        match m.find('@') {
            Some(0) | None => m.to_string(),
            Some(at) => format!("{}***{}", &m[..1], &m[at..]),
        }
    });
    let tokens = p.base64_token.replace_all(&emails, "[REDACTED_TOKEN]");
    let tokens = p.hex_token.replace_all(&tokens, "[REDACTED_TOKEN]");
    p.phone
        .replace_all(&tokens, "[REDACTED_PHONE]")
        .into_owned()
}

/// Display wrapper that redacts on format.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
