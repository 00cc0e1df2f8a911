//! SeaORM adapter for breeder payouts.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::payouts::{self, PayoutStatus};

#[derive(Debug, Clone)]
pub struct PayoutCreate {
    pub breeder_id: i64,
    pub currency: String,
    pub gross_amount: i64,
    pub commission_amount: i64,
    pub net_amount: i64,
    pub commission_bps: i32,
    pub transfer_reference: String,
    pub created_by: Option<i64>,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PayoutCreate,
) -> Result<payouts::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    payouts::ActiveModel {
        id: NotSet,
        breeder_id: Set(dto.breeder_id),
        currency: Set(dto.currency),
        gross_amount: Set(dto.gross_amount),
        commission_amount: Set(dto.commission_amount),
        net_amount: Set(dto.net_amount),
        commission_bps: Set(dto.commission_bps),
        status: Set(PayoutStatus::Processing),
        transfer_reference: Set(dto.transfer_reference),
        transfer_code: Set(None),
        failure_reason: Set(None),
        created_by: Set(dto.created_by),
        created_at: Set(now),
        updated_at: Set(now),
        processed_at: Set(None),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<payouts::Model>, sea_orm::DbErr> {
    payouts::Entity::find_by_id(id).one(conn).await
}

pub async fn mark_paid<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payout: payouts::Model,
    transfer_code: Option<String>,
) -> Result<payouts::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let mut active: payouts::ActiveModel = payout.into();
    active.status = Set(PayoutStatus::Paid);
    active.transfer_code = Set(transfer_code);
    active.processed_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(conn).await
}

pub async fn mark_failed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payout: payouts::Model,
    reason: String,
) -> Result<payouts::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let mut active: payouts::ActiveModel = payout.into();
    active.status = Set(PayoutStatus::Failed);
    active.failure_reason = Set(Some(reason));
    active.processed_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(conn).await
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<payouts::Model>, sea_orm::DbErr> {
    payouts::Entity::find()
        .order_by_desc(payouts::Column::Id)
        .all(conn)
        .await
}

pub async fn list_by_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<payouts::Model>, sea_orm::DbErr> {
    payouts::Entity::find()
        .filter(payouts::Column::BreederId.eq(breeder_id))
        .order_by_desc(payouts::Column::Id)
        .all(conn)
        .await
}
