//! Authenticated-user extractors.
//!
//! `CurrentUser` resolves the bearer token's `sub` to a stored user. The role
//! wrappers additionally require the breeder or admin role and answer
//! `403 INSUFFICIENT_ROLE` otherwise.

use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use super::jwt::claims_from_request;
use crate::db::require_db;
use crate::db::txn::SharedTxn;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::security;
use crate::repos::users::{self, User};
use crate::state::app_state::AppState;

#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

async fn load_current_user(req: HttpRequest) -> Result<User, AppError> {
    let claims = claims_from_request(&req)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not found"))?;

    let user = if let Some(shared) = SharedTxn::from_req(&req) {
        users::find_user_by_sub(shared.transaction(), &claims.sub).await?
    } else {
        let db = require_db(state)?;
        users::find_user_by_sub(db, &claims.sub).await?
    };

    user.ok_or_else(AppError::forbidden_user_not_found)
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { load_current_user(req).await.map(CurrentUser) })
    }
}

fn insufficient_role(user: &User, required: &str, path: &str) -> AppError {
    security::access_denied(user.id, path);
    AppError::forbidden(
        ErrorCode::InsufficientRole,
        format!("This action requires the {required} role"),
    )
}

/// A user with the breeder role.
#[derive(Debug, Clone)]
pub struct BreederUser(pub User);

impl Deref for BreederUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for BreederUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = load_current_user(req.clone()).await?;
            if !user.is_breeder() {
                return Err(insufficient_role(&user, "breeder", req.path()));
            }
            Ok(BreederUser(user))
        })
    }
}

/// A user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl Deref for AdminUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = load_current_user(req.clone()).await?;
            if !user.is_admin() {
                return Err(insufficient_role(&user, "admin", req.path()));
            }
            Ok(AdminUser(user))
        })
    }
}
