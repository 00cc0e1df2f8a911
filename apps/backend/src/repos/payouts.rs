//! Payout repository.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::payouts_sea::{self as payouts_adapter, PayoutCreate};
use crate::entities::payouts::{self, PayoutStatus};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payout {
    pub id: i64,
    pub breeder_id: i64,
    pub currency: String,
    pub gross_amount: i64,
    pub commission_amount: i64,
    pub net_amount: i64,
    pub commission_bps: i32,
    pub status: PayoutStatus,
    pub transfer_reference: String,
    pub transfer_code: Option<String>,
    pub failure_reason: Option<String>,
    pub created_by: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub processed_at: Option<OffsetDateTime>,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PayoutCreate,
) -> Result<Payout, DomainError> {
    Ok(Payout::from(payouts_adapter::create(conn, dto).await?))
}

async fn load<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<payouts::Model, DomainError> {
    payouts_adapter::find_by_id(conn, id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Other("Payout".into()), format!("Payout {id} not found"))
    })
}

pub async fn require<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Payout, DomainError> {
    Ok(Payout::from(load(conn, id).await?))
}

pub async fn mark_paid<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    transfer_code: Option<String>,
) -> Result<Payout, DomainError> {
    let model = load(conn, id).await?;
    Ok(Payout::from(
        payouts_adapter::mark_paid(conn, model, transfer_code).await?,
    ))
}

pub async fn mark_failed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    reason: String,
) -> Result<Payout, DomainError> {
    let model = load(conn, id).await?;
    Ok(Payout::from(payouts_adapter::mark_failed(conn, model, reason).await?))
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Payout>, DomainError> {
    let rows = payouts_adapter::list_all(conn).await?;
    Ok(rows.into_iter().map(Payout::from).collect())
}

pub async fn list_by_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<Payout>, DomainError> {
    let rows = payouts_adapter::list_by_breeder(conn, breeder_id).await?;
    Ok(rows.into_iter().map(Payout::from).collect())
}

impl From<payouts::Model> for Payout {
    fn from(model: payouts::Model) -> Self {
        Self {
            id: model.id,
            breeder_id: model.breeder_id,
            currency: model.currency,
            gross_amount: model.gross_amount,
            commission_amount: model.commission_amount,
            net_amount: model.net_amount,
            commission_bps: model.commission_bps,
            status: model.status,
            transfer_reference: model.transfer_reference,
            transfer_code: model.transfer_code,
            failure_reason: model.failure_reason,
            created_by: model.created_by,
            created_at: model.created_at,
            processed_at: model.processed_at,
        }
    }
}
