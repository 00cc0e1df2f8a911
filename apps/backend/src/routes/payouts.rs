use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::{AdminUser, BreederUser, ValidatedJson};
use crate::repos::payouts::Payout;
use crate::services::payouts::{self as payout_service, PayoutPreview};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePayoutRequest {
    pub breeder_id: i64,
    pub currency: String,
}

/// GET /api/admin/payouts/preview
async fn preview(
    http_req: HttpRequest,
    _admin: AdminUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<PayoutPreview>>, AppError> {
    let bps = app_state.payments.commission_bps;

    let rows = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(payout_service::preview(txn, bps).await?) })
    })
    .await?;

    Ok(web::Json(rows))
}

/// POST /api/admin/payouts {breeder_id, currency}
///
/// Responds 201 with the payout in its final state (`paid` or `failed`).
async fn create_payout(
    http_req: HttpRequest,
    admin: AdminUser,
    body: ValidatedJson<CreatePayoutRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let currency = body.currency.trim().to_ascii_uppercase();

    let payout = payout_service::create(
        Some(&http_req),
        &app_state,
        &admin,
        body.breeder_id,
        &currency,
    )
    .await?;

    Ok(HttpResponse::Created().json(payout))
}

/// POST /api/admin/payouts/{id}/settle
///
/// Records the gateway's outcome for a payout still `processing`.
async fn settle_payout(
    http_req: HttpRequest,
    admin: AdminUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Payout>, AppError> {
    let payout_id = path.into_inner();
    let payout =
        payout_service::settle_processing(Some(&http_req), &app_state, &admin, payout_id).await?;

    Ok(web::Json(payout))
}

/// GET /api/admin/payouts
async fn list_all(
    http_req: HttpRequest,
    _admin: AdminUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Payout>>, AppError> {
    let payouts = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move { Ok(payout_service::list_all(txn).await?) })
    })
    .await?;

    Ok(web::Json(payouts))
}

/// GET /api/breeder/payouts
async fn list_mine(
    http_req: HttpRequest,
    breeder: BreederUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Payout>>, AppError> {
    let breeder_id = breeder.id;

    let payouts = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(payout_service::list_for_breeder(txn, breeder_id).await?) })
    })
    .await?;

    Ok(web::Json(payouts))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/admin/payouts/preview").route(web::get().to(preview)));
    cfg.service(
        web::resource("/api/admin/payouts")
            .route(web::get().to(list_all))
            .route(web::post().to(create_payout)),
    );
    cfg.service(
        web::resource("/api/admin/payouts/{id}/settle").route(web::post().to(settle_payout)),
    );
    cfg.service(web::resource("/api/breeder/payouts").route(web::get().to(list_mine)));
}
