//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repos and services convert here so that
//! constraint names and raw SQL never reach a response body.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// `table.column` out of SQLite's "UNIQUE constraint failed: table.column".
fn sqlite_unique_target(msg: &str) -> Option<&str> {
    const MARKER: &str = "UNIQUE constraint failed: ";
    let start = msg.find(MARKER)? + MARKER.len();
    msg[start..]
        .split(|c: char| c.is_whitespace() || c == '"' || c == ',')
        .next()
}

/// Known unique targets, by SQLite `table.column` or Postgres constraint name.
fn unique_conflict(msg: &str) -> Option<(ConflictKind, &'static str)> {
    const TABLE: &[(&str, &str, ConflictKindTag, &str)] = &[
        (
            "user_credentials.email",
            "user_credentials_email_key",
            ConflictKindTag::UniqueEmail,
            "Email already registered",
        ),
        (
            "user_credentials.google_sub",
            "user_credentials_google_sub_key",
            ConflictKindTag::GoogleSub,
            "Google account already linked to another user",
        ),
        (
            "breeds.name",
            "breeds_name_key",
            ConflictKindTag::BreedName,
            "A breed with this name already exists",
        ),
    ];

    let sqlite_target = sqlite_unique_target(msg);
    TABLE
        .iter()
        .find(|(sqlite, pg, _, _)| sqlite_target == Some(*sqlite) || msg.contains(pg))
        .map(|(_, _, tag, detail)| (tag.kind(), *detail))
}

#[derive(Clone, Copy)]
enum ConflictKindTag {
    UniqueEmail,
    GoogleSub,
    BreedName,
}

impl ConflictKindTag {
    fn kind(self) -> ConflictKind {
        match self {
            Self::UniqueEmail => ConflictKind::UniqueEmail,
            Self::GoogleSub => ConflictKind::GoogleSubMismatch,
            Self::BreedName => ConflictKind::BreedNameTaken,
        }
    }
}

fn optimistic_lock_conflict(payload: &str) -> DomainError {
    #[derive(serde::Deserialize)]
    struct LockInfo {
        expected: i32,
        actual: i32,
    }

    let trace_id = trace_ctx::trace_id();
    match serde_json::from_str::<LockInfo>(payload) {
        Ok(info) => {
            warn!(
                trace_id = %trace_id,
                expected = info.expected,
                actual = info.actual,
                "Optimistic lock conflict"
            );
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Resource was modified concurrently (expected version {}, actual version {}). Refresh and retry.",
                    info.expected, info.actual
                ),
            )
        }
        Err(_) => {
            warn!(trace_id = %trace_id, "Optimistic lock conflict (no version info)");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Resource was modified by another request; refresh and retry",
            )
        }
    }
}

/// Translate a `DbErr` into a `DomainError` with a sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), what.clone());
        }
        sea_orm::DbErr::Custom(custom) => {
            if let Some(payload) = custom.strip_prefix("OPTIMISTIC_LOCK:") {
                return optimistic_lock_conflict(payload);
            }
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Unique constraint violation");
        if let Some((kind, detail)) = unique_conflict(&msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&msg, "23503") || msg.contains("FOREIGN KEY constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Foreign key violation");
        return DomainError::conflict(
            ConflictKind::Other("ForeignKey".into()),
            "Referenced record is missing or still in use",
        );
    }

    if mentions_sqlstate(&msg, "23514") || msg.contains("CHECK constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Check constraint violation");
        return DomainError::validation_other("Check constraint violation");
    }

    if msg.contains("timeout") || msg.contains("timed out") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
