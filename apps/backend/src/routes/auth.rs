use std::time::SystemTime;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::mint_access_token;
use crate::config::admin_allowlist::normalize_email;
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::ValidatedJson;
use crate::logging::security;
use crate::repos::users::User;
use crate::services::users::{ensure_user, LoginInput};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub google_sub: String,
    /// `seeker` (default) or `breeder`
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

fn wants_breeder(role: Option<&str>) -> Result<bool, AppError> {
    match role.map(str::trim) {
        None | Some("") | Some("seeker") => Ok(false),
        Some("breeder") => Ok(true),
        Some("admin") => Err(AppError::invalid(
            ErrorCode::InvalidRole,
            "The admin role is granted by configuration, not requested",
        )),
        Some(other) => Err(AppError::invalid(
            ErrorCode::InvalidRole,
            format!("Unknown role '{other}'"),
        )),
    }
}

/// POST /api/auth/login
///
/// Creates the user on first login, reuses it afterwards, and returns a
/// short-lived access token.
async fn login(
    http_req: HttpRequest,
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let email = normalize_email(&body.email);

    let as_breeder = match wants_breeder(body.role.as_deref()) {
        Ok(v) => v,
        Err(err) => {
            security::login_failed(err.code().as_str(), Some(&email));
            return Err(err);
        }
    };

    let input = LoginInput {
        email: body.email,
        name: body.name,
        google_sub: body.google_sub,
        as_breeder,
        is_admin: app_state.is_admin_email(&email),
    };

    let result = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(ensure_user(txn, input).await?) })
    })
    .await;

    let user = match result {
        Ok(user) => user,
        Err(err) => {
            security::login_failed(err.code().as_str(), Some(&email));
            return Err(err);
        }
    };

    let token = mint_access_token(&user.sub, &email, SystemTime::now(), &app_state.security)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token, user }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/auth/login").route(web::post().to(login)));
}
