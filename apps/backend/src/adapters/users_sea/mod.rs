//! SeaORM adapter for users and their credentials.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::users::UserRole;
use crate::entities::{user_credentials, users};

pub mod dto;

pub use dto::{CredentialsCreate, ProfileUpdate, UserCreate};

// Adapter functions return DbErr; repos map to DomainError via From<DbErr>.

pub async fn find_credentials_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<user_credentials::Model>, sea_orm::DbErr> {
    user_credentials::Entity::find()
        .filter(user_credentials::Column::Email.eq(email))
        .one(conn)
        .await
}

pub async fn find_credentials_by_user_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<user_credentials::Model>, sea_orm::DbErr> {
    user_credentials::Entity::find()
        .filter(user_credentials::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    users::ActiveModel {
        id: NotSet,
        sub: Set(dto.sub),
        username: Set(dto.username),
        role: Set(dto.role),
        bio: Set(None),
        location: Set(None),
        phone: Set(None),
        kennel_name: Set(None),
        payout_recipient_code: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn create_credentials<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CredentialsCreate,
) -> Result<user_credentials::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    user_credentials::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        email: Set(dto.email),
        google_sub: Set(dto.google_sub),
        last_login: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Stamp `last_login`; links `google_sub` when given.
pub async fn record_login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    credentials: user_credentials::Model,
    link_google_sub: Option<String>,
) -> Result<user_credentials::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let mut active: user_credentials::ActiveModel = credentials.into();
    active.last_login = Set(Some(now));
    if let Some(sub) = link_google_sub {
        active.google_sub = Set(Some(sub));
    }
    active.updated_at = Set(now);
    active.update(conn).await
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(user_id).one(conn).await
}

pub async fn find_user_by_sub<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    sub: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::Sub.eq(sub))
        .one(conn)
        .await
}

pub async fn list_users<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(conn)
        .await
}

pub async fn update_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: users::Model,
    dto: ProfileUpdate,
) -> Result<users::Model, sea_orm::DbErr> {
    let mut active: users::ActiveModel = user.into();
    if let Some(v) = dto.username {
        active.username = Set(v);
    }
    if let Some(v) = dto.bio {
        active.bio = Set(v);
    }
    if let Some(v) = dto.location {
        active.location = Set(v);
    }
    if let Some(v) = dto.phone {
        active.phone = Set(v);
    }
    if let Some(v) = dto.kennel_name {
        active.kennel_name = Set(v);
    }
    if let Some(v) = dto.payout_recipient_code {
        active.payout_recipient_code = Set(v);
    }
    active.updated_at = Set(time::OffsetDateTime::now_utc());
    active.update(conn).await
}

pub async fn set_role<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: users::Model,
    role: UserRole,
) -> Result<users::Model, sea_orm::DbErr> {
    let mut active: users::ActiveModel = user.into();
    active.role = Set(role);
    active.updated_at = Set(time::OffsetDateTime::now_utc());
    active.update(conn).await
}
