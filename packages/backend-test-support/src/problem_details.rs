//! Assertions for `application/problem+json` error responses.
//!
//! Kept independent of backend types so route tests check the wire contract,
//! not the Rust structs that produce it.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Wire shape of an error body.
#[derive(Debug, Clone, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// Parse and check a problem body against its headers.
///
/// Checks the status, the content type, that `x-trace-id` matches the body's
/// `trace_id`, and the machine-readable `code`.
pub fn assert_problem_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
) -> Problem {
    assert_eq!(
        status,
        expected_status,
        "unexpected status; body: {}",
        String::from_utf8_lossy(body)
    );

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "expected problem+json content type, got '{content_type}'"
    );

    let problem: Problem =
        serde_json::from_slice(body).expect("response body should be Problem Details JSON");

    let header_trace = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be ASCII");
    assert_eq!(problem.trace_id, header_trace, "trace_id body/header mismatch");

    assert_eq!(problem.code, expected_code, "detail: {}", problem.detail);
    assert_eq!(problem.status, expected_status.as_u16());
    problem
}

/// Same as [`assert_problem_parts`] for a test-service response.
pub async fn assert_problem(
    resp: ServiceResponse<BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
) -> Problem {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;
    assert_problem_parts(status, &headers, &body, expected_code, expected_status)
}
