//! ETags for listings.
//!
//! Format `"listing-{id}-v{version}"`. `GET` responses carry it, `If-None-Match`
//! short-circuits to 304 and `If-Match` on writes supplies the expected
//! `lock_version`.

use actix_web::http::header::{IF_MATCH, IF_NONE_MATCH};
use actix_web::HttpRequest;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// ```
/// # use pawhaven_backend::http::etag::listing_etag;
/// assert_eq!(listing_etag(12, 3), r#""listing-12-v3""#);
/// ```
pub fn listing_etag(id: i64, version: i32) -> String {
    format!(r#""listing-{id}-v{version}""#)
}

/// Version number out of a listing ETag (weak prefix and quotes allowed).
pub fn parse_version_from_etag(raw: &str) -> Result<i32, AppError> {
    let s = raw.trim();
    let s = s.strip_prefix("W/").unwrap_or(s).trim_matches('"');

    let start = s.rfind("-v").ok_or_else(|| {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag '{s}': expected \"listing-{{id}}-v{{version}}\""),
        )
    })? + 2;

    s[start..].parse::<i32>().map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag '{s}': version is not an integer"),
        )
    })
}

/// True when `If-None-Match` lists `etag` (or `*`).
pub fn if_none_match_hits(req: &HttpRequest, etag: &str) -> bool {
    let Some(value) = req.headers().get(IF_NONE_MATCH) else {
        return false;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    value.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// Expected lock version for a write: `If-Match` wins over the body field.
/// `None` means the client did not ask for a version check.
pub fn expected_version(req: &HttpRequest, from_body: Option<i32>) -> Result<Option<i32>, AppError> {
    match req.headers().get(IF_MATCH) {
        Some(value) => {
            let value = value.to_str().map_err(|_| {
                AppError::bad_request(ErrorCode::InvalidHeader, "If-Match is not valid ASCII")
            })?;
            if value.trim() == "*" {
                return Ok(from_body);
            }
            parse_version_from_etag(value).map(Some)
        }
        None => Ok(from_body),
    }
}
