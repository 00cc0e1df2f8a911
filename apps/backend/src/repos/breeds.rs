//! Breed catalog repository.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::breeds_sea::{self as breeds_adapter, BreedCreate, BreedFilter, BreedUpdate};
use crate::entities::breeds::{BreedSize, Species};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breed {
    pub id: i64,
    pub name: String,
    pub species: Species,
    pub size: Option<BreedSize>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: BreedFilter,
) -> Result<Vec<Breed>, DomainError> {
    let rows = breeds_adapter::list(conn, filter).await?;
    Ok(rows.into_iter().map(Breed::from).collect())
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Breed>, DomainError> {
    Ok(breeds_adapter::find_by_id(conn, id).await?.map(Breed::from))
}

pub async fn require<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Breed, DomainError> {
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Breed, format!("Breed {id} not found")))
}

pub async fn find_by_name<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<Option<Breed>, DomainError> {
    Ok(breeds_adapter::find_by_name(conn, name).await?.map(Breed::from))
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: BreedCreate,
) -> Result<Breed, DomainError> {
    Ok(Breed::from(breeds_adapter::create(conn, dto).await?))
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    dto: BreedUpdate,
) -> Result<Breed, DomainError> {
    let model = breeds_adapter::find_by_id(conn, id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Breed, format!("Breed {id} not found")))?;
    Ok(Breed::from(breeds_adapter::update(conn, model, dto).await?))
}

/// `true` when a row was deleted.
pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<bool, DomainError> {
    Ok(breeds_adapter::delete(conn, id).await? > 0)
}

pub async fn count_listings<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breed_id: i64,
) -> Result<u64, DomainError> {
    Ok(breeds_adapter::count_listings(conn, breed_id).await?)
}

impl From<crate::entities::breeds::Model> for Breed {
    fn from(model: crate::entities::breeds::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            species: model.species,
            size: model.size,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
