use actix_web::{web, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::repos::notifications::Notification;
use crate::services::notifications as notification_service;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked: u64,
}

/// GET /api/notifications?unread_only=
async fn list_notifications(
    http_req: HttpRequest,
    current_user: CurrentUser,
    query: web::Query<NotificationsQuery>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Notification>>, AppError> {
    let user_id = current_user.id;
    let unread_only = query.unread_only;

    let notifications = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(notification_service::list(txn, user_id, unread_only).await?) })
    })
    .await?;

    Ok(web::Json(notifications))
}

/// GET /api/notifications/unread_count
async fn unread_count(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<UnreadCountResponse>, AppError> {
    let user_id = current_user.id;

    let unread = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(notification_service::unread_count(txn, user_id).await?) })
    })
    .await?;

    Ok(web::Json(UnreadCountResponse { unread }))
}

/// POST /api/notifications/{id}/read; 404 for someone else's notification.
async fn mark_read(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Notification>, AppError> {
    let user_id = current_user.id;
    let id = path.into_inner();

    let notification = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(notification_service::mark_read(txn, user_id, id).await?) })
    })
    .await?;

    Ok(web::Json(notification))
}

/// POST /api/notifications/read_all
async fn mark_all_read(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MarkAllReadResponse>, AppError> {
    let user_id = current_user.id;

    let marked = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(notification_service::mark_all_read(txn, user_id).await?) })
    })
    .await?;

    Ok(web::Json(MarkAllReadResponse { marked }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/notifications").route(web::get().to(list_notifications)));
    cfg.service(
        web::resource("/api/notifications/unread_count").route(web::get().to(unread_count)),
    );
    cfg.service(web::resource("/api/notifications/read_all").route(web::post().to(mark_all_read)));
    cfg.service(web::resource("/api/notifications/{id}/read").route(web::post().to(mark_read)));
}
