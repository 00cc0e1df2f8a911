//! SeaORM adapter for listings.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::listings::{self, ListingStatus};

pub mod dto;

pub use dto::{ListingCreate, ListingQuery, ListingUpdate};

/// Apply an update guarded by `lock_version`, bump the version, refetch.
///
/// Zero rows affected means either a missing row (`RecordNotFound`) or a
/// stale version (`OPTIMISTIC_LOCK:{expected,actual}` payload).
async fn optimistic_update_then_fetch<C, F>(
    conn: &C,
    id: i64,
    current_lock_version: i32,
    configure_update: F,
) -> Result<listings::Model, sea_orm::DbErr>
where
    C: ConnectionTrait + Send + Sync,
    F: FnOnce(sea_orm::UpdateMany<listings::Entity>) -> sea_orm::UpdateMany<listings::Entity>,
{
    let now = OffsetDateTime::now_utc();

    let result = configure_update(listings::Entity::update_many())
        .col_expr(listings::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            listings::Column::LockVersion,
            Expr::col(listings::Column::LockVersion).add(1),
        )
        .filter(listings::Column::Id.eq(id))
        .filter(listings::Column::LockVersion.eq(current_lock_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match listings::Entity::find_by_id(id).one(conn).await? {
            Some(listing) => Err(sea_orm::DbErr::Custom(format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                current_lock_version, listing.lock_version
            ))),
            None => Err(sea_orm::DbErr::RecordNotFound(
                "Listing not found".to_string(),
            )),
        };
    }

    listings::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Listing not found".to_string()))
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ListingCreate,
) -> Result<listings::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let published_at = (dto.status == ListingStatus::Active).then_some(now);
    listings::ActiveModel {
        id: NotSet,
        breeder_id: Set(dto.breeder_id),
        breed_id: Set(dto.breed_id),
        kind: Set(dto.kind),
        title: Set(dto.title),
        description: Set(dto.description),
        sex: Set(dto.sex),
        location: Set(dto.location),
        price: Set(dto.price),
        reservation_fee: Set(dto.reservation_fee),
        currency: Set(dto.currency),
        total_count: Set(dto.total_count),
        available_count: Set(dto.available_count),
        status: Set(dto.status),
        available_from: Set(dto.available_from),
        published_at: Set(published_at),
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
) -> Result<Option<listings::Model>, sea_orm::DbErr> {
    listings::Entity::find_by_id(id).one(conn).await
}

/// Active and reserved listings matching `query`, newest first, with the
/// total match count.
pub async fn list_public<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: ListingQuery,
) -> Result<(Vec<listings::Model>, u64), sea_orm::DbErr> {
    let mut cond = Condition::all().add(
        listings::Column::Status.is_in([ListingStatus::Active, ListingStatus::Reserved]),
    );
    if let Some(breed_id) = query.breed_id {
        cond = cond.add(listings::Column::BreedId.eq(breed_id));
    }
    if let Some(kind) = query.kind {
        cond = cond.add(listings::Column::Kind.eq(kind));
    }
    if let Some(min) = query.min_price {
        cond = cond.add(listings::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        cond = cond.add(listings::Column::Price.lte(max));
    }
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", q.to_lowercase());
        cond = cond.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        listings::Entity,
                        listings::Column::Title,
                    ))))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        listings::Entity,
                        listings::Column::Location,
                    ))))
                    .like(pattern),
                ),
        );
    }

    let paginator = listings::Entity::find()
        .filter(cond)
        .order_by_desc(listings::Column::PublishedAt)
        .order_by_desc(listings::Column::Id)
        .paginate(conn, query.per_page.max(1));

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(query.page.saturating_sub(1)).await?;
    Ok((items, total))
}

pub async fn list_by_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<listings::Model>, sea_orm::DbErr> {
    listings::Entity::find()
        .filter(listings::Column::BreederId.eq(breeder_id))
        .order_by_desc(listings::Column::CreatedAt)
        .order_by_desc(listings::Column::Id)
        .all(conn)
        .await
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<listings::Model>, sea_orm::DbErr> {
    listings::Entity::find()
        .order_by_asc(listings::Column::Id)
        .all(conn)
        .await
}

pub async fn update_details<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    current_lock_version: i32,
    dto: ListingUpdate,
) -> Result<listings::Model, sea_orm::DbErr> {
    optimistic_update_then_fetch(conn, id, current_lock_version, |mut update| {
        if let Some(v) = dto.breed_id {
            update = update.col_expr(listings::Column::BreedId, Expr::val(v).into());
        }
        if let Some(v) = dto.title {
            update = update.col_expr(listings::Column::Title, Expr::val(v).into());
        }
        if let Some(v) = dto.description {
            update = update.col_expr(listings::Column::Description, Expr::val(v).into());
        }
        if let Some(v) = dto.sex {
            update = update.col_expr(listings::Column::Sex, Expr::val(v).into());
        }
        if let Some(v) = dto.location {
            update = update.col_expr(listings::Column::Location, Expr::val(v).into());
        }
        if let Some(v) = dto.price {
            update = update.col_expr(listings::Column::Price, Expr::val(v).into());
        }
        if let Some(v) = dto.reservation_fee {
            update = update.col_expr(listings::Column::ReservationFee, Expr::val(v).into());
        }
        if let Some(v) = dto.total_count {
            update = update.col_expr(listings::Column::TotalCount, Expr::val(v).into());
        }
        if let Some(v) = dto.available_count {
            update = update.col_expr(listings::Column::AvailableCount, Expr::val(v).into());
        }
        if let Some(v) = dto.available_from {
            update = update.col_expr(listings::Column::AvailableFrom, Expr::val(v).into());
        }
        if let Some(v) = dto.status {
            update = update.col_expr(listings::Column::Status, Expr::val(v).into());
        }
        update
    })
    .await
}

/// Status change; stamps `published_at` the first time a listing goes active.
pub async fn set_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing: &listings::Model,
    status: ListingStatus,
) -> Result<listings::Model, sea_orm::DbErr> {
    let stamp_published = status == ListingStatus::Active && listing.published_at.is_none();
    optimistic_update_then_fetch(conn, listing.id, listing.lock_version, |mut update| {
        update = update.col_expr(listings::Column::Status, Expr::val(status).into());
        if stamp_published {
            update = update.col_expr(
                listings::Column::PublishedAt,
                Expr::val(Some(OffsetDateTime::now_utc())).into(),
            );
        }
        update
    })
    .await
}

/// Set `available_count` and `status` together.
pub async fn set_availability<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing: &listings::Model,
    available_count: i32,
    status: ListingStatus,
) -> Result<listings::Model, sea_orm::DbErr> {
    optimistic_update_then_fetch(conn, listing.id, listing.lock_version, |update| {
        update
            .col_expr(
                listings::Column::AvailableCount,
                Expr::val(available_count).into(),
            )
            .col_expr(listings::Column::Status, Expr::val(status).into())
    })
    .await
}
