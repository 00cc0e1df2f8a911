//! SeaORM adapter for in-app notifications.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::notifications::{self, NotificationKind};

#[derive(Debug, Clone)]
pub struct NotificationCreate {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: NotificationCreate,
) -> Result<notifications::Model, sea_orm::DbErr> {
    notifications::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        kind: Set(dto.kind),
        title: Set(dto.title),
        body: Set(dto.body),
        link: Set(dto.link),
        read_at: Set(None),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

/// Newest first.
pub async fn list_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<notifications::Model>, sea_orm::DbErr> {
    let mut query = notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
    if unread_only {
        query = query.filter(notifications::Column::ReadAt.is_null());
    }
    query
        .order_by_desc(notifications::Column::Id)
        .all(conn)
        .await
}

pub async fn count_unread<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::ReadAt.is_null())
        .count(conn)
        .await
}

/// Scoped to the owner: another user's id matches nothing.
pub async fn find_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    user_id: i64,
) -> Result<Option<notifications::Model>, sea_orm::DbErr> {
    notifications::Entity::find_by_id(id)
        .filter(notifications::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

pub async fn mark_read<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    notification: notifications::Model,
) -> Result<notifications::Model, sea_orm::DbErr> {
    if notification.read_at.is_some() {
        return Ok(notification);
    }
    let mut active: notifications::ActiveModel = notification.into();
    active.read_at = Set(Some(OffsetDateTime::now_utc()));
    active.update(conn).await
}

pub async fn mark_all_read<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(
            notifications::Column::ReadAt,
            Expr::val(Some(OffsetDateTime::now_utc())).into(),
        )
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::ReadAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
