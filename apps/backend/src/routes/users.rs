use actix_web::{web, HttpRequest};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

use crate::adapters::users_sea::ProfileUpdate;
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::repos::users::User;
use crate::services::users::{self as user_service, BreederProfile};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub email: String,
}

/// Absent leaves a field unchanged, `null` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatchRequest {
    #[serde(default, with = "double_option")]
    pub username: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub kennel_name: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub payout_recipient_code: Option<Option<String>>,
}

impl From<ProfilePatchRequest> for ProfileUpdate {
    fn from(value: ProfilePatchRequest) -> Self {
        Self {
            username: value.username,
            bio: value.bio,
            location: value.location,
            phone: value.phone,
            kennel_name: value.kennel_name,
            payout_recipient_code: value.payout_recipient_code,
        }
    }
}

async fn me_response(
    http_req: &HttpRequest,
    app_state: &AppState,
    user: User,
) -> Result<MeResponse, AppError> {
    with_txn(Some(http_req), app_state, move |txn| {
        Box::pin(async move {
            let email = user_service::email_of(txn, user.id).await?;
            Ok(MeResponse { user, email })
        })
    })
    .await
}

/// GET /api/me
async fn get_me(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MeResponse>, AppError> {
    let me = me_response(&http_req, &app_state, current_user.into_inner()).await?;
    Ok(web::Json(me))
}

/// PATCH /api/me
async fn patch_me(
    http_req: HttpRequest,
    current_user: CurrentUser,
    body: ValidatedJson<ProfilePatchRequest>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MeResponse>, AppError> {
    let user = current_user.into_inner();
    let patch = ProfileUpdate::from(body.into_inner());

    let updated = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(user_service::update_profile(txn, &user, patch).await?) })
    })
    .await?;

    Ok(web::Json(me_response(&http_req, &app_state, updated).await?))
}

/// POST /api/me/become-breeder
async fn become_breeder(
    http_req: HttpRequest,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MeResponse>, AppError> {
    let user = current_user.into_inner();

    let updated = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(user_service::become_breeder(txn, &user).await?) })
    })
    .await?;

    Ok(web::Json(me_response(&http_req, &app_state, updated).await?))
}

/// GET /api/breeders/{id}
async fn get_breeder(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<BreederProfile>, AppError> {
    let breeder_id = path.into_inner();

    let profile = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(user_service::breeder_profile(txn, breeder_id).await?) })
    })
    .await?;

    Ok(web::Json(profile))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/me")
            .route(web::get().to(get_me))
            .route(web::patch().to(patch_me)),
    );
    cfg.service(web::resource("/api/me/become-breeder").route(web::post().to(become_breeder)));
    cfg.service(web::resource("/api/breeders/{id}").route(web::get().to(get_breeder)));
}
