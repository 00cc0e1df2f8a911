//! SeaORM adapter for payment transactions.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::transactions::{self, TransactionKind, TransactionStatus};

#[derive(Debug, Clone)]
pub struct TransactionCreate {
    pub application_id: i64,
    pub payer_id: i64,
    pub breeder_id: i64,
    pub kind: TransactionKind,
    pub amount: i64,
    pub currency: String,
    pub reference: String,
}

/// Final gateway outcome of a pending transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub status: TransactionStatus,
    pub gateway_status: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<OffsetDateTime>,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TransactionCreate,
) -> Result<transactions::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    transactions::ActiveModel {
        id: NotSet,
        application_id: Set(dto.application_id),
        payer_id: Set(dto.payer_id),
        breeder_id: Set(dto.breeder_id),
        kind: Set(dto.kind),
        amount: Set(dto.amount),
        currency: Set(dto.currency),
        reference: Set(dto.reference),
        status: Set(TransactionStatus::Pending),
        authorization_url: Set(None),
        gateway_status: Set(None),
        failure_reason: Set(None),
        verify_attempts: Set(0),
        paid_at: Set(None),
        payout_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn find_by_reference<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reference: &str,
) -> Result<Option<transactions::Model>, sea_orm::DbErr> {
    transactions::Entity::find()
        .filter(transactions::Column::Reference.eq(reference))
        .one(conn)
        .await
}

pub async fn find_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
    kind: TransactionKind,
) -> Result<Option<transactions::Model>, sea_orm::DbErr> {
    transactions::Entity::find()
        .filter(transactions::Column::ApplicationId.eq(application_id))
        .filter(transactions::Column::Kind.eq(kind))
        .filter(transactions::Column::Status.eq(TransactionStatus::Pending))
        .order_by_desc(transactions::Column::Id)
        .one(conn)
        .await
}

pub async fn set_authorization_url<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    url: String,
) -> Result<(), sea_orm::DbErr> {
    transactions::Entity::update_many()
        .col_expr(transactions::Column::AuthorizationUrl, Expr::val(Some(url)).into())
        .col_expr(
            transactions::Column::UpdatedAt,
            Expr::val(OffsetDateTime::now_utc()).into(),
        )
        .filter(transactions::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn record_verify_attempt<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    gateway_status: &str,
) -> Result<(), sea_orm::DbErr> {
    transactions::Entity::update_many()
        .col_expr(
            transactions::Column::VerifyAttempts,
            Expr::col(transactions::Column::VerifyAttempts).add(1),
        )
        .col_expr(
            transactions::Column::GatewayStatus,
            Expr::val(Some(gateway_status.to_string())).into(),
        )
        .col_expr(
            transactions::Column::UpdatedAt,
            Expr::val(OffsetDateTime::now_utc()).into(),
        )
        .filter(transactions::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Settle a pending transaction. Returns `false` when it was no longer
/// pending, so an outcome is applied at most once.
pub async fn settle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    outcome: TransactionOutcome,
) -> Result<bool, sea_orm::DbErr> {
    settle_from(conn, id, TransactionStatus::Pending, outcome).await
}

/// Like [`settle`], guarded on `from` instead of `pending`.
pub async fn settle_from<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    from: TransactionStatus,
    outcome: TransactionOutcome,
) -> Result<bool, sea_orm::DbErr> {
    let result = transactions::Entity::update_many()
        .col_expr(transactions::Column::Status, Expr::val(outcome.status).into())
        .col_expr(
            transactions::Column::GatewayStatus,
            Expr::val(outcome.gateway_status).into(),
        )
        .col_expr(
            transactions::Column::FailureReason,
            Expr::val(outcome.failure_reason).into(),
        )
        .col_expr(transactions::Column::PaidAt, Expr::val(outcome.paid_at).into())
        .col_expr(
            transactions::Column::UpdatedAt,
            Expr::val(OffsetDateTime::now_utc()).into(),
        )
        .filter(transactions::Column::Id.eq(id))
        .filter(transactions::Column::Status.eq(from))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Abandon every pending transaction of the application with `reason`.
pub async fn abandon_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
    reason: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = transactions::Entity::update_many()
        .col_expr(
            transactions::Column::Status,
            Expr::val(TransactionStatus::Abandoned).into(),
        )
        .col_expr(
            transactions::Column::FailureReason,
            Expr::val(Some(reason.to_string())).into(),
        )
        .col_expr(
            transactions::Column::UpdatedAt,
            Expr::val(OffsetDateTime::now_utc()).into(),
        )
        .filter(transactions::Column::ApplicationId.eq(application_id))
        .filter(transactions::Column::Status.eq(TransactionStatus::Pending))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn list_by_payer<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payer_id: i64,
) -> Result<Vec<transactions::Model>, sea_orm::DbErr> {
    transactions::Entity::find()
        .filter(transactions::Column::PayerId.eq(payer_id))
        .order_by_desc(transactions::Column::Id)
        .all(conn)
        .await
}

pub async fn list_by_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<transactions::Model>, sea_orm::DbErr> {
    transactions::Entity::find()
        .filter(transactions::Column::BreederId.eq(breeder_id))
        .order_by_desc(transactions::Column::Id)
        .all(conn)
        .await
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<transactions::Model>, sea_orm::DbErr> {
    transactions::Entity::find()
        .order_by_asc(transactions::Column::Id)
        .all(conn)
        .await
}

/// Successful transactions not yet attached to a payout. Both filters optional.
pub async fn list_unpaid_out<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: Option<i64>,
    currency: Option<&str>,
) -> Result<Vec<transactions::Model>, sea_orm::DbErr> {
    let mut query = transactions::Entity::find()
        .filter(transactions::Column::Status.eq(TransactionStatus::Success))
        .filter(transactions::Column::PayoutId.is_null());
    if let Some(breeder_id) = breeder_id {
        query = query.filter(transactions::Column::BreederId.eq(breeder_id));
    }
    if let Some(currency) = currency {
        query = query.filter(transactions::Column::Currency.eq(currency));
    }
    query
        .order_by_asc(transactions::Column::Id)
        .all(conn)
        .await
}

/// Attach the given ids to `payout_id`; skips rows already attached.
pub async fn attach_to_payout<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<i64>,
    payout_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = transactions::Entity::update_many()
        .col_expr(transactions::Column::PayoutId, Expr::val(Some(payout_id)).into())
        .filter(transactions::Column::Id.is_in(ids))
        .filter(transactions::Column::PayoutId.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn release_payout<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payout_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = transactions::Entity::update_many()
        .col_expr(transactions::Column::PayoutId, Expr::val(None::<i64>).into())
        .filter(transactions::Column::PayoutId.eq(payout_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
