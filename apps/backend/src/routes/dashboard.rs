use actix_web::{web, HttpRequest};

use crate::db::txn::with_txn;
use crate::domain::dashboard::{AdminDashboard, BreederDashboard, SeekerDashboard};
use crate::error::AppError;
use crate::extractors::{AdminUser, BreederUser, CurrentUser};
use crate::services::dashboard as dashboard_service;
use crate::state::app_state::AppState;

/// GET /api/me/dashboard
async fn seeker_dashboard(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<SeekerDashboard>, AppError> {
    let user_id = current_user.id;

    let dashboard = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(dashboard_service::seeker(txn, user_id).await?) })
    })
    .await?;

    Ok(web::Json(dashboard))
}

/// GET /api/breeder/dashboard
async fn breeder_dashboard(
    http_req: HttpRequest,
    breeder: BreederUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<BreederDashboard>, AppError> {
    let breeder_id = breeder.id;
    let bps = app_state.payments.commission_bps;

    let dashboard = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(dashboard_service::breeder(txn, breeder_id, bps).await?) })
    })
    .await?;

    Ok(web::Json(dashboard))
}

/// GET /api/admin/dashboard
async fn admin_dashboard(
    http_req: HttpRequest,
    _admin: AdminUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<AdminDashboard>, AppError> {
    let bps = app_state.payments.commission_bps;

    let dashboard = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(dashboard_service::admin(txn, bps).await?) })
    })
    .await?;

    Ok(web::Json(dashboard))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/me/dashboard").route(web::get().to(seeker_dashboard)));
    cfg.service(web::resource("/api/breeder/dashboard").route(web::get().to(breeder_dashboard)));
    cfg.service(web::resource("/api/admin/dashboard").route(web::get().to(admin_dashboard)));
}
