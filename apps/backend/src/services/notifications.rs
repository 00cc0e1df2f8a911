//! In-app notifications: fan-out by insert, plus the inbox operations.

use sea_orm::ConnectionTrait;
use tracing::debug;

use crate::adapters::notifications_sea::NotificationCreate;
use crate::entities::notifications::NotificationKind;
use crate::errors::domain::DomainError;
use crate::repos::notifications::{self, Notification};

pub async fn notify<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    kind: NotificationKind,
    title: impl Into<String>,
    body: impl Into<String>,
    link: Option<String>,
) -> Result<(), DomainError> {
    notifications::create(
        conn,
        NotificationCreate {
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            link,
        },
    )
    .await?;
    debug!(user_id, kind = ?kind, "Notification queued");
    Ok(())
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<Notification>, DomainError> {
    notifications::list_for_user(conn, user_id, unread_only).await
}

pub async fn unread_count<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, DomainError> {
    notifications::count_unread(conn, user_id).await
}

pub async fn mark_read<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
) -> Result<Notification, DomainError> {
    notifications::mark_read(conn, id, user_id).await
}

pub async fn mark_all_read<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, DomainError> {
    notifications::mark_all_read(conn, user_id).await
}

pub fn application_link(application_id: i64) -> Option<String> {
    Some(format!("/applications/{application_id}"))
}
