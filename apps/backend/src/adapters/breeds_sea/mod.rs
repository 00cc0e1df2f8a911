//! SeaORM adapter for the breed catalog.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::breeds::{self, BreedSize, Species};
use crate::entities::listings;

#[derive(Debug, Clone)]
pub struct BreedCreate {
    pub name: String,
    pub species: Species,
    pub size: Option<BreedSize>,
    pub description: Option<String>,
}

/// Outer `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct BreedUpdate {
    pub name: Option<String>,
    pub species: Option<Species>,
    pub size: Option<Option<BreedSize>>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct BreedFilter {
    pub species: Option<Species>,
    /// Case-insensitive substring of the name
    pub q: Option<String>,
}

fn lower_name() -> sea_orm::sea_query::SimpleExpr {
    Func::lower(Expr::col((breeds::Entity, breeds::Column::Name))).into()
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: BreedFilter,
) -> Result<Vec<breeds::Model>, sea_orm::DbErr> {
    let mut query = breeds::Entity::find();
    if let Some(species) = filter.species {
        query = query.filter(breeds::Column::Species.eq(species));
    }
    if let Some(q) = filter.q.filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim().to_lowercase());
        query = query.filter(Expr::expr(lower_name()).like(pattern));
    }
    query.order_by_asc(breeds::Column::Name).all(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<breeds::Model>, sea_orm::DbErr> {
    breeds::Entity::find_by_id(id).one(conn).await
}

/// Case-insensitive exact name lookup.
pub async fn find_by_name<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<Option<breeds::Model>, sea_orm::DbErr> {
    breeds::Entity::find()
        .filter(Expr::expr(lower_name()).eq(name.trim().to_lowercase()))
        .one(conn)
        .await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: BreedCreate,
) -> Result<breeds::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    breeds::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        species: Set(dto.species),
        size: Set(dto.size),
        description: Set(dto.description),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breed: breeds::Model,
    dto: BreedUpdate,
) -> Result<breeds::Model, sea_orm::DbErr> {
    let mut active: breeds::ActiveModel = breed.into();
    if let Some(name) = dto.name {
        active.name = Set(name);
    }
    if let Some(species) = dto.species {
        active.species = Set(species);
    }
    if let Some(size) = dto.size {
        active.size = Set(size);
    }
    if let Some(description) = dto.description {
        active.description = Set(description);
    }
    active.updated_at = Set(time::OffsetDateTime::now_utc());
    active.update(conn).await
}

/// Rows deleted (0 or 1).
pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<u64, sea_orm::DbErr> {
    Ok(breeds::Entity::delete_by_id(id).exec(conn).await?.rows_affected)
}

pub async fn count_listings<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breed_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    listings::Entity::find()
        .filter(listings::Column::BreedId.eq(breed_id))
        .count(conn)
        .await
}
