//! User repository functions for domain layer (generic over ConnectionTrait).

use sea_orm::{ConnectionTrait, EntityTrait};
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::users_sea::{self as users_adapter, CredentialsCreate, ProfileUpdate, UserCreate};
use crate::entities::users::UserRole;
use crate::errors::domain::DomainError;

/// User domain model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(skip)]
    pub sub: String,
    pub username: Option<String>,
    pub role: UserRole,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub kennel_name: Option<String>,
    pub payout_recipient_code: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn is_breeder(&self) -> bool {
        self.role == UserRole::Breeder
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User credentials domain model
#[derive(Debug, Clone, PartialEq)]
pub struct UserCredentials {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub google_sub: Option<String>,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn find_credentials_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<UserCredentials>, DomainError> {
    let credential = users_adapter::find_credentials_by_email(conn, email).await?;
    Ok(credential.map(UserCredentials::from))
}

pub async fn find_credentials_by_user_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<UserCredentials>, DomainError> {
    let credential = users_adapter::find_credentials_by_user_id(conn, user_id).await?;
    Ok(credential.map(UserCredentials::from))
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<User, DomainError> {
    let user = users_adapter::create_user(conn, dto).await?;
    Ok(User::from(user))
}

pub async fn create_credentials<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CredentialsCreate,
) -> Result<UserCredentials, DomainError> {
    let credential = users_adapter::create_credentials(conn, dto).await?;
    Ok(UserCredentials::from(credential))
}

/// Stamp `last_login` on the credentials row, linking `google_sub` if given.
pub async fn record_login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    credentials_id: i64,
    link_google_sub: Option<String>,
) -> Result<UserCredentials, DomainError> {
    let model = crate::entities::UserCredentials::find_by_id(credentials_id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Credentials not found".into()))?;
    let updated = users_adapter::record_login(conn, model, link_google_sub).await?;
    Ok(UserCredentials::from(updated))
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_id(conn, user_id).await?;
    Ok(user.map(User::from))
}

pub async fn find_user_by_sub<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    sub: &str,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_sub(conn, sub).await?;
    Ok(user.map(User::from))
}

pub async fn list_users<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<User>, DomainError> {
    let users = users_adapter::list_users(conn).await?;
    Ok(users.into_iter().map(User::from).collect())
}

pub async fn update_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    dto: ProfileUpdate,
) -> Result<User, DomainError> {
    let model = load_model(conn, user_id).await?;
    let updated = users_adapter::update_profile(conn, model, dto).await?;
    Ok(User::from(updated))
}

pub async fn set_role<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    role: UserRole,
) -> Result<User, DomainError> {
    let model = load_model(conn, user_id).await?;
    let updated = users_adapter::set_role(conn, model, role).await?;
    Ok(User::from(updated))
}

async fn load_model<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<crate::entities::users::Model, DomainError> {
    users_adapter::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(
                crate::errors::domain::NotFoundKind::User,
                format!("User {user_id} not found"),
            )
        })
}

// Conversions between SeaORM models and domain models

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            sub: model.sub,
            username: model.username,
            role: model.role,
            bio: model.bio,
            location: model.location,
            phone: model.phone,
            kennel_name: model.kennel_name,
            payout_recipient_code: model.payout_recipient_code,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<crate::entities::user_credentials::Model> for UserCredentials {
    fn from(model: crate::entities::user_credentials::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            google_sub: model.google_sub,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
