//! Application and transition-history repository.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::applications_sea::{self as applications_adapter, ApplicationCreate, EventCreate};
use crate::entities::application_events::{self, ActorRole};
use crate::entities::applications::{self, ApplicationStatus};
use crate::entities::listings::PetSex;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: i64,
    pub listing_id: i64,
    pub seeker_id: i64,
    pub status: ApplicationStatus,
    pub message: String,
    pub household: Option<String>,
    pub has_other_pets: bool,
    pub preferred_sex: Option<PetSex>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub decided_at: Option<OffsetDateTime>,
    pub lock_version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationEvent {
    pub id: i64,
    pub application_id: i64,
    pub from_status: Option<ApplicationStatus>,
    pub to_status: ApplicationStatus,
    pub actor_id: Option<i64>,
    pub actor_role: ActorRole,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ApplicationCreate,
) -> Result<Application, DomainError> {
    Ok(Application::from(applications_adapter::create(conn, dto).await?))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Application>, DomainError> {
    Ok(applications_adapter::find_by_id(conn, id)
        .await?
        .map(Application::from))
}

pub async fn require<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Application, DomainError> {
    find_by_id(conn, id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Application, format!("Application {id} not found"))
    })
}

pub async fn find_open<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker_id: i64,
    listing_id: i64,
) -> Result<Option<Application>, DomainError> {
    Ok(applications_adapter::find_open(conn, seeker_id, listing_id)
        .await?
        .map(Application::from))
}

pub async fn list_by_seeker<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker_id: i64,
) -> Result<Vec<Application>, DomainError> {
    let rows = applications_adapter::list_by_seeker(conn, seeker_id).await?;
    Ok(rows.into_iter().map(Application::from).collect())
}

pub async fn list_for_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    status: Option<ApplicationStatus>,
) -> Result<Vec<Application>, DomainError> {
    let rows = applications_adapter::list_for_breeder(conn, breeder_id, status).await?;
    Ok(rows.into_iter().map(Application::from).collect())
}

pub async fn count_holding<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing_id: i64,
    exclude_id: i64,
) -> Result<u64, DomainError> {
    Ok(applications_adapter::count_holding(conn, listing_id, exclude_id).await?)
}

/// Units held or handed over on the listing.
pub async fn count_claimed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing_id: i64,
) -> Result<u64, DomainError> {
    Ok(applications_adapter::count_claimed(conn, listing_id).await?)
}

pub async fn set_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    expected_version: i32,
    to: ApplicationStatus,
    decided: bool,
) -> Result<Application, DomainError> {
    let updated =
        applications_adapter::set_status(conn, id, expected_version, to, decided).await?;
    Ok(Application::from(updated))
}

pub async fn insert_event<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: EventCreate,
) -> Result<ApplicationEvent, DomainError> {
    Ok(ApplicationEvent::from(
        applications_adapter::insert_event(conn, dto).await?,
    ))
}

pub async fn list_events<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
) -> Result<Vec<ApplicationEvent>, DomainError> {
    let rows = applications_adapter::list_events(conn, application_id).await?;
    Ok(rows.into_iter().map(ApplicationEvent::from).collect())
}

impl From<applications::Model> for Application {
    fn from(model: applications::Model) -> Self {
        Self {
            id: model.id,
            listing_id: model.listing_id,
            seeker_id: model.seeker_id,
            status: model.status,
            message: model.message,
            household: model.household,
            has_other_pets: model.has_other_pets,
            preferred_sex: model.preferred_sex,
            decided_at: model.decided_at,
            lock_version: model.lock_version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<application_events::Model> for ApplicationEvent {
    fn from(model: application_events::Model) -> Self {
        Self {
            id: model.id,
            application_id: model.application_id,
            from_status: model.from_status,
            to_status: model.to_status,
            actor_id: model.actor_id,
            actor_role: model.actor_role,
            note: model.note,
            created_at: model.created_at,
        }
    }
}
