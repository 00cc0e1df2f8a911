//! SeaORM adapter for applications and their transition history.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use time::OffsetDateTime;

use crate::entities::application_events;
use crate::entities::applications::{self, ApplicationStatus};
use crate::entities::listings;

pub mod dto;

pub use dto::{ApplicationCreate, EventCreate};

/// Statuses after which a seeker may apply to the same listing again.
pub const CLOSED_STATUSES: [ApplicationStatus; 3] = [
    ApplicationStatus::Rejected,
    ApplicationStatus::Withdrawn,
    ApplicationStatus::Completed,
];

/// Statuses holding a unit of a listing.
pub const HOLDING_STATUSES: [ApplicationStatus; 3] = [
    ApplicationStatus::Reserved,
    ApplicationStatus::ContractSigned,
    ApplicationStatus::Paid,
];

/// Statuses whose unit has left `available_count` for good or for now.
pub const CLAIMING_STATUSES: [ApplicationStatus; 4] = [
    ApplicationStatus::Reserved,
    ApplicationStatus::ContractSigned,
    ApplicationStatus::Paid,
    ApplicationStatus::Completed,
];

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ApplicationCreate,
) -> Result<applications::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    applications::ActiveModel {
        id: NotSet,
        listing_id: Set(dto.listing_id),
        seeker_id: Set(dto.seeker_id),
        status: Set(ApplicationStatus::Submitted),
        message: Set(dto.message),
        household: Set(dto.household),
        has_other_pets: Set(dto.has_other_pets),
        preferred_sex: Set(dto.preferred_sex),
        decided_at: Set(None),
        lock_version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<applications::Model>, sea_orm::DbErr> {
    applications::Entity::find_by_id(id).one(conn).await
}

/// The seeker's application on `listing_id` that is not yet closed, if any.
pub async fn find_open<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker_id: i64,
    listing_id: i64,
) -> Result<Option<applications::Model>, sea_orm::DbErr> {
    applications::Entity::find()
        .filter(applications::Column::SeekerId.eq(seeker_id))
        .filter(applications::Column::ListingId.eq(listing_id))
        .filter(applications::Column::Status.is_not_in(CLOSED_STATUSES))
        .one(conn)
        .await
}

pub async fn list_by_seeker<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker_id: i64,
) -> Result<Vec<applications::Model>, sea_orm::DbErr> {
    applications::Entity::find()
        .filter(applications::Column::SeekerId.eq(seeker_id))
        .order_by_desc(applications::Column::CreatedAt)
        .order_by_desc(applications::Column::Id)
        .all(conn)
        .await
}

/// Applications on any of the breeder's listings.
pub async fn list_for_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    status: Option<ApplicationStatus>,
) -> Result<Vec<applications::Model>, sea_orm::DbErr> {
    let mut query = applications::Entity::find()
        .join(
            sea_orm::JoinType::InnerJoin,
            applications::Relation::Listing.def(),
        )
        .filter(listings::Column::BreederId.eq(breeder_id));
    if let Some(status) = status {
        query = query.filter(applications::Column::Status.eq(status));
    }
    query
        .order_by_desc(applications::Column::CreatedAt)
        .order_by_desc(applications::Column::Id)
        .all(conn)
        .await
}

/// Other applications on the listing currently holding a unit.
pub async fn count_holding<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing_id: i64,
    exclude_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    applications::Entity::find()
        .filter(applications::Column::ListingId.eq(listing_id))
        .filter(applications::Column::Id.ne(exclude_id))
        .filter(applications::Column::Status.is_in(HOLDING_STATUSES))
        .count(conn)
        .await
}

pub async fn count_claimed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    applications::Entity::find()
        .filter(applications::Column::ListingId.eq(listing_id))
        .filter(applications::Column::Status.is_in(CLAIMING_STATUSES))
        .count(conn)
        .await
}

/// Move to `to`, guarded by `lock_version`. `decided` stamps `decided_at`.
pub async fn set_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    current_lock_version: i32,
    to: ApplicationStatus,
    decided: bool,
) -> Result<applications::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();

    let mut update = applications::Entity::update_many()
        .col_expr(applications::Column::Status, Expr::val(to).into())
        .col_expr(applications::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            applications::Column::LockVersion,
            Expr::col(applications::Column::LockVersion).add(1),
        );
    if decided {
        update = update.col_expr(applications::Column::DecidedAt, Expr::val(Some(now)).into());
    }

    let result = update
        .filter(applications::Column::Id.eq(id))
        .filter(applications::Column::LockVersion.eq(current_lock_version))
        .exec(conn)
        .await?;

    let current = applications::Entity::find_by_id(id).one(conn).await?;
    match current {
        Some(app) if result.rows_affected == 0 => Err(sea_orm::DbErr::Custom(format!(
            "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
            current_lock_version, app.lock_version
        ))),
        Some(app) => Ok(app),
        None => Err(sea_orm::DbErr::RecordNotFound(
            "Application not found".to_string(),
        )),
    }
}

pub async fn insert_event<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: EventCreate,
) -> Result<application_events::Model, sea_orm::DbErr> {
    application_events::ActiveModel {
        id: NotSet,
        application_id: Set(dto.application_id),
        from_status: Set(dto.from_status),
        to_status: Set(dto.to_status),
        actor_id: Set(dto.actor_id),
        actor_role: Set(dto.actor_role),
        note: Set(dto.note),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

/// Oldest first.
pub async fn list_events<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
) -> Result<Vec<application_events::Model>, sea_orm::DbErr> {
    application_events::Entity::find()
        .filter(application_events::Column::ApplicationId.eq(application_id))
        .order_by_asc(application_events::Column::Id)
        .all(conn)
        .await
}
