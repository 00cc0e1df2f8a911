//! Breed catalog administration.

use sea_orm::ConnectionTrait;
use tracing::info;

use crate::adapters::breeds_sea::{BreedCreate, BreedFilter, BreedUpdate};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::breeds::{self, Breed};

fn clean_name(name: &str) -> Result<String, DomainError> {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(DomainError::validation_other("Breed name must not be empty"));
    }
    Ok(name)
}

async fn ensure_name_free<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
    except_id: Option<i64>,
) -> Result<(), DomainError> {
    match breeds::find_by_name(conn, name).await? {
        Some(existing) if Some(existing.id) != except_id => Err(DomainError::conflict(
            ConflictKind::BreedNameTaken,
            format!("A breed named '{}' already exists", existing.name),
        )),
        _ => Ok(()),
    }
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: BreedFilter,
) -> Result<Vec<Breed>, DomainError> {
    breeds::list(conn, filter).await
}

pub async fn get<C: ConnectionTrait + Send + Sync>(conn: &C, id: i64) -> Result<Breed, DomainError> {
    breeds::require(conn, id).await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    mut dto: BreedCreate,
) -> Result<Breed, DomainError> {
    dto.name = clean_name(&dto.name)?;
    ensure_name_free(conn, &dto.name, None).await?;
    let breed = breeds::create(conn, dto).await?;
    info!(breed_id = breed.id, name = %breed.name, "Breed created");
    Ok(breed)
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    mut dto: BreedUpdate,
) -> Result<Breed, DomainError> {
    breeds::require(conn, id).await?;
    if let Some(name) = dto.name.as_deref() {
        let name = clean_name(name)?;
        ensure_name_free(conn, &name, Some(id)).await?;
        dto.name = Some(name);
    }
    breeds::update(conn, id, dto).await
}

/// Refused while any listing references the breed.
pub async fn delete<C: ConnectionTrait + Send + Sync>(conn: &C, id: i64) -> Result<(), DomainError> {
    breeds::require(conn, id).await?;
    let in_use = breeds::count_listings(conn, id).await?;
    if in_use > 0 {
        return Err(DomainError::conflict(
            ConflictKind::BreedInUse,
            format!("Breed is used by {in_use} listing(s)"),
        ));
    }
    if !breeds::delete(conn, id).await? {
        return Err(DomainError::not_found(NotFoundKind::Breed, format!("Breed {id} not found")));
    }
    info!(breed_id = id, "Breed deleted");
    Ok(())
}
