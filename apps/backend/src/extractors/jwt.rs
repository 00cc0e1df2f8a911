use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};

use crate::auth::jwt::{verify_access_token, Claims};
use crate::error::AppError;
use crate::state::app_state::AppState;

/// Verified claims of the request's `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

impl BearerClaims {
    pub fn into_inner(self) -> Claims {
        self.0
    }
}

/// The raw token of a `Bearer <token>` header value.
pub fn parse_bearer(header_value: &str) -> Result<&str, AppError> {
    let mut parts = header_value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}

/// Verify the bearer token carried by `req`.
pub fn claims_from_request(req: &HttpRequest) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(AppError::unauthorized_missing_bearer)?;
    let value = header
        .to_str()
        .map_err(|_| AppError::unauthorized_missing_bearer())?;
    let token = parse_bearer(value)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not found"))?;

    verify_access_token(token, &state.security)
}

impl FromRequest for BearerClaims {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = claims_from_request(req).map(BearerClaims);
        Box::pin(async move { result })
    }
}
