use actix_web::{web, HttpRequest};

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::repos::transactions::Transaction;
use crate::services::payments as payment_service;
use crate::state::app_state::AppState;

/// GET /api/payments: seekers see what they paid, breeders what they
/// received, admins everything.
async fn list_payments(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Transaction>>, AppError> {
    let user = current_user.into_inner();

    let transactions = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(payment_service::list(txn, &user).await?) })
    })
    .await?;

    Ok(web::Json(transactions))
}

/// GET /api/payments/{reference}
async fn get_payment(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Transaction>, AppError> {
    let user = current_user.into_inner();
    let reference = path.into_inner();

    let transaction = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(payment_service::get(txn, &user, &reference).await?) })
    })
    .await?;

    Ok(web::Json(transaction))
}

/// POST /api/payments/{reference}/verify: one gateway lookup.
async fn verify_payment(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Transaction>, AppError> {
    let transaction =
        payment_service::verify(Some(&http_req), &app_state, &current_user, &path).await?;
    Ok(web::Json(transaction))
}

/// POST /api/payments/{reference}/poll: bounded verify loop.
async fn poll_payment(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Transaction>, AppError> {
    let transaction =
        payment_service::poll(Some(&http_req), &app_state, &current_user, &path).await?;
    Ok(web::Json(transaction))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/payments").route(web::get().to(list_payments)));
    cfg.service(web::resource("/api/payments/{reference}").route(web::get().to(get_payment)));
    cfg.service(
        web::resource("/api/payments/{reference}/verify").route(web::post().to(verify_payment)),
    );
    cfg.service(web::resource("/api/payments/{reference}/poll").route(web::post().to(poll_payment)));
}
