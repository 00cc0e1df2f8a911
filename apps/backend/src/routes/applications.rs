use std::str::FromStr;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::db::txn::with_txn;
use crate::domain::Action;
use crate::entities::applications::ApplicationStatus;
use crate::entities::listings::PetSex;
use crate::entities::transactions::TransactionKind;
use crate::error::AppError;
use crate::extractors::{BreederUser, CurrentUser, OptionalJson, ValidatedJson};
use crate::repos::applications::{Application, ApplicationEvent};
use crate::services::applications::{self as application_service, NewApplication};
use crate::services::payments as payment_service;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitApplicationRequest {
    pub listing_id: i64,
    #[serde(default)]
    pub message: String,
    pub household: Option<String>,
    #[serde(default)]
    pub has_other_pets: bool,
    pub preferred_sex: Option<PetSex>,
}

impl From<SubmitApplicationRequest> for NewApplication {
    fn from(value: SubmitApplicationRequest) -> Self {
        Self {
            listing_id: value.listing_id,
            message: value.message,
            household: value.household,
            has_other_pets: value.has_other_pets,
            preferred_sex: value.preferred_sex,
        }
    }
}

/// Body of `POST /api/applications/{id}/{action}`; may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRequest {
    pub expected_version: Option<i32>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BreederApplicationsQuery {
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub kind: TransactionKind,
}

/// POST /api/applications
async fn submit(
    http_req: HttpRequest,
    current_user: CurrentUser,
    body: ValidatedJson<SubmitApplicationRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let seeker = current_user.into_inner();
    let input = NewApplication::from(body.into_inner());

    let application = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(application_service::submit(txn, &seeker, input).await?) })
    })
    .await?;

    Ok(HttpResponse::Created().json(application))
}

/// GET /api/applications: the caller's own applications.
async fn list_mine(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Application>>, AppError> {
    let seeker_id = current_user.id;

    let applications = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(application_service::list_mine(txn, seeker_id).await?) })
    })
    .await?;

    Ok(web::Json(applications))
}

/// GET /api/applications/{id} (seeker, listing breeder or admin)
async fn get_application(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Application>, AppError> {
    let user = current_user.into_inner();
    let id = path.into_inner();

    let application = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(application_service::get(txn, &user, id).await?) })
    })
    .await?;

    Ok(web::Json(application))
}

/// GET /api/applications/{id}/events, oldest first.
async fn list_events(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<ApplicationEvent>>, AppError> {
    let user = current_user.into_inner();
    let id = path.into_inner();

    let events = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(application_service::events(txn, &user, id).await?) })
    })
    .await?;

    Ok(web::Json(events))
}

/// POST /api/applications/{id}/{action}
///
/// `action` is one of `review`, `approve`, `reject`, `withdraw`, `reserve`,
/// `sign_contract`, `complete`.
async fn perform_action(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<(i64, String)>,
    body: OptionalJson<ActionRequest>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Application>, AppError> {
    let user = current_user.into_inner();
    let (id, action) = path.into_inner();
    let action = Action::from_str(&action)?;
    let ActionRequest {
        expected_version,
        note,
    } = body.into_inner();

    let application = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            Ok(application_service::act(txn, &user, id, action, expected_version, note).await?)
        })
    })
    .await?;

    Ok(web::Json(application))
}

/// POST /api/applications/{id}/payments {kind}
///
/// Starts (or resumes) a gateway checkout and returns the pending
/// transaction with its `authorization_url`.
async fn initiate_payment(
    http_req: HttpRequest,
    current_user: CurrentUser,
    path: web::Path<i64>,
    body: ValidatedJson<InitiatePaymentRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = current_user.into_inner();
    let id = path.into_inner();

    let transaction =
        payment_service::initiate(Some(&http_req), &app_state, &user, id, body.kind).await?;

    Ok(HttpResponse::Created().json(transaction))
}

/// GET /api/breeder/applications?status=
async fn list_for_breeder(
    http_req: HttpRequest,
    breeder: BreederUser,
    query: web::Query<BreederApplicationsQuery>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Application>>, AppError> {
    let breeder_id = breeder.id;
    let status = query.into_inner().status;

    let applications = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            Ok(application_service::list_for_breeder(txn, breeder_id, status).await?)
        })
    })
    .await?;

    Ok(web::Json(applications))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/applications")
            .route(web::get().to(list_mine))
            .route(web::post().to(submit)),
    );
    cfg.service(web::resource("/api/applications/{id}").route(web::get().to(get_application)));
    // Fixed segments must be registered ahead of `{action}`.
    cfg.service(web::resource("/api/applications/{id}/events").route(web::get().to(list_events)));
    cfg.service(
        web::resource("/api/applications/{id}/payments").route(web::post().to(initiate_payment)),
    );
    cfg.service(
        web::resource("/api/applications/{id}/{action}").route(web::post().to(perform_action)),
    );
    cfg.service(web::resource("/api/breeder/applications").route(web::get().to(list_for_breeder)));
}
