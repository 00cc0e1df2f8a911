use std::sync::Arc;

use actix_http::Request;
use actix_web::HttpMessage;
use pawhaven_backend::db::txn::SharedTxn;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Begin a transaction and wrap it as a `SharedTxn`.
///
/// The test owns the lifecycle; `with_txn` never commits or rolls it back.
pub async fn open(conn: &DatabaseConnection) -> SharedTxn {
    let txn = conn.begin().await.expect("Failed to begin transaction");
    SharedTxn(Arc::new(txn))
}

/// Attach `shared` to a test request so handlers run on it.
pub fn inject(req: &Request, shared: &SharedTxn) {
    req.extensions_mut().insert(shared.clone());
}

/// Roll back once every clone (request extensions included) has been dropped.
pub async fn rollback(shared: SharedTxn) -> Result<(), sea_orm::DbErr> {
    let txn = Arc::try_unwrap(shared.0).map_err(|_| {
        sea_orm::DbErr::Custom("Cannot rollback: transaction is still shared".to_string())
    })?;
    txn.rollback().await
}
