#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

// Commit by default: each test owns a fresh database and multi-request flows
// must see earlier writes. `PAWHAVEN_TXN_POLICY=rollback` flips it per run.
#[ctor::ctor]
fn init_txn_policy() {
    let policy = match std::env::var("PAWHAVEN_TXN_POLICY")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "rollback" => pawhaven_backend::db::txn_policy::TxnPolicy::RollbackOnOk,
        _ => pawhaven_backend::db::txn_policy::TxnPolicy::CommitOnOk,
    };

    pawhaven_backend::db::txn_policy::set_txn_policy(policy);
}

/// Read a JSON body after asserting the status.
pub async fn json_body(resp: ServiceResponse<BoxBody>, expected: u16) -> Value {
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        expected,
        "unexpected status; body: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("response body should be JSON")
}
