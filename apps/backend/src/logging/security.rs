//! Security-relevant events, emitted with a stable `event` field so log
//! pipelines can alert on them.

use tracing::warn;

use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Login rejected (bad input or account mismatch).
pub fn login_failed(reason: &str, email: Option<&str>) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %email.map(Redacted).unwrap_or(Redacted("")),
        reason,
        "Authentication failure"
    );
}

/// An authenticated user tried something their role or relationship forbids.
pub fn access_denied(user_id: i64, action: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_ACCESS_DENIED",
        %trace_id,
        user_id,
        action,
        "Access denied"
    );
}

/// Gateway reported success for an amount or currency we did not charge.
pub fn payment_amount_mismatch(reference: &str, expected: i64, reported: i64) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_PAYMENT_MISMATCH",
        %trace_id,
        reference,
        expected,
        reported,
        "Payment amount or currency mismatch"
    );
}
