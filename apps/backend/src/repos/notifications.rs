//! Notification repository.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::notifications_sea::{self as notifications_adapter, NotificationCreate};
use crate::entities::notifications::{self, NotificationKind};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: NotificationCreate,
) -> Result<Notification, DomainError> {
    Ok(Notification::from(
        notifications_adapter::create(conn, dto).await?,
    ))
}

pub async fn list_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<Notification>, DomainError> {
    let rows = notifications_adapter::list_for_user(conn, user_id, unread_only).await?;
    Ok(rows.into_iter().map(Notification::from).collect())
}

pub async fn count_unread<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, DomainError> {
    Ok(notifications_adapter::count_unread(conn, user_id).await?)
}

/// Not-found for ids owned by another user.
pub async fn mark_read<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    user_id: i64,
) -> Result<Notification, DomainError> {
    let model = notifications_adapter::find_for_user(conn, id, user_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Notification,
                format!("Notification {id} not found"),
            )
        })?;
    Ok(Notification::from(
        notifications_adapter::mark_read(conn, model).await?,
    ))
}

pub async fn mark_all_read<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, DomainError> {
    Ok(notifications_adapter::mark_all_read(conn, user_id).await?)
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            title: model.title,
            body: model.body,
            link: model.link,
            read_at: model.read_at,
            created_at: model.created_at,
        }
    }
}
