//! Payment transaction repository.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::transactions_sea::{
    self as transactions_adapter, TransactionCreate, TransactionOutcome,
};
use crate::entities::transactions::{self, TransactionKind, TransactionStatus};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub application_id: i64,
    pub payer_id: i64,
    pub breeder_id: i64,
    pub kind: TransactionKind,
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    pub status: TransactionStatus,
    pub authorization_url: Option<String>,
    pub gateway_status: Option<String>,
    pub failure_reason: Option<String>,
    pub verify_attempts: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    pub payout_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TransactionCreate,
) -> Result<Transaction, DomainError> {
    Ok(Transaction::from(transactions_adapter::create(conn, dto).await?))
}

pub async fn find_by_reference<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reference: &str,
) -> Result<Option<Transaction>, DomainError> {
    Ok(transactions_adapter::find_by_reference(conn, reference)
        .await?
        .map(Transaction::from))
}

pub async fn require_by_reference<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reference: &str,
) -> Result<Transaction, DomainError> {
    find_by_reference(conn, reference).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Transaction,
            format!("Transaction {reference} not found"),
        )
    })
}

pub async fn find_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
    kind: TransactionKind,
) -> Result<Option<Transaction>, DomainError> {
    Ok(transactions_adapter::find_pending(conn, application_id, kind)
        .await?
        .map(Transaction::from))
}

pub async fn set_authorization_url<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    url: String,
) -> Result<(), DomainError> {
    Ok(transactions_adapter::set_authorization_url(conn, id, url).await?)
}

pub async fn record_verify_attempt<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    gateway_status: &str,
) -> Result<(), DomainError> {
    Ok(transactions_adapter::record_verify_attempt(conn, id, gateway_status).await?)
}

/// `false` when the transaction had already left `pending`.
pub async fn settle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    outcome: TransactionOutcome,
) -> Result<bool, DomainError> {
    Ok(transactions_adapter::settle(conn, id, outcome).await?)
}

pub async fn settle_from<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    from: TransactionStatus,
    outcome: TransactionOutcome,
) -> Result<bool, DomainError> {
    Ok(transactions_adapter::settle_from(conn, id, from, outcome).await?)
}

pub async fn abandon_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
    reason: &str,
) -> Result<u64, DomainError> {
    Ok(transactions_adapter::abandon_pending(conn, application_id, reason).await?)
}

pub async fn list_by_payer<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payer_id: i64,
) -> Result<Vec<Transaction>, DomainError> {
    let rows = transactions_adapter::list_by_payer(conn, payer_id).await?;
    Ok(rows.into_iter().map(Transaction::from).collect())
}

pub async fn list_by_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<Transaction>, DomainError> {
    let rows = transactions_adapter::list_by_breeder(conn, breeder_id).await?;
    Ok(rows.into_iter().map(Transaction::from).collect())
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Transaction>, DomainError> {
    let rows = transactions_adapter::list_all(conn).await?;
    Ok(rows.into_iter().map(Transaction::from).collect())
}

pub async fn list_unpaid_out<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: Option<i64>,
    currency: Option<&str>,
) -> Result<Vec<Transaction>, DomainError> {
    let rows = transactions_adapter::list_unpaid_out(conn, breeder_id, currency).await?;
    Ok(rows.into_iter().map(Transaction::from).collect())
}

pub async fn attach_to_payout<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<i64>,
    payout_id: i64,
) -> Result<u64, DomainError> {
    Ok(transactions_adapter::attach_to_payout(conn, ids, payout_id).await?)
}

pub async fn release_payout<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payout_id: i64,
) -> Result<u64, DomainError> {
    Ok(transactions_adapter::release_payout(conn, payout_id).await?)
}

impl From<transactions::Model> for Transaction {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            application_id: model.application_id,
            payer_id: model.payer_id,
            breeder_id: model.breeder_id,
            kind: model.kind,
            amount: model.amount,
            currency: model.currency,
            reference: model.reference,
            status: model.status,
            authorization_url: model.authorization_url,
            gateway_status: model.gateway_status,
            failure_reason: model.failure_reason,
            verify_attempts: model.verify_attempts,
            paid_at: model.paid_at,
            payout_id: model.payout_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
