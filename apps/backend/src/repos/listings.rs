//! Listing repository.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::listings_sea::{
    self as listings_adapter, ListingCreate, ListingQuery, ListingUpdate,
};
use crate::entities::listings::{self, ListingKind, ListingStatus, PetSex};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: i64,
    pub breeder_id: i64,
    pub breed_id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub description: Option<String>,
    pub sex: Option<PetSex>,
    pub location: Option<String>,
    pub price: i64,
    pub reservation_fee: i64,
    pub currency: String,
    pub total_count: i32,
    pub available_count: i32,
    pub status: ListingStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub available_from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub lock_version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Listing {
    /// Price left after the reservation fee.
    pub fn final_amount(&self) -> i64 {
        self.price - self.reservation_fee
    }

    /// Visible on the public browse endpoints.
    pub fn is_public(&self) -> bool {
        matches!(self.status, ListingStatus::Active | ListingStatus::Reserved)
    }
}

/// One page of public listings.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ListingCreate,
) -> Result<Listing, DomainError> {
    Ok(Listing::from(listings_adapter::create(conn, dto).await?))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Listing>, DomainError> {
    Ok(listings_adapter::find_by_id(conn, id).await?.map(Listing::from))
}

pub async fn require<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Listing, DomainError> {
    find_by_id(conn, id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Listing, format!("Listing {id} not found"))
    })
}

pub async fn list_public<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: ListingQuery,
) -> Result<ListingPage, DomainError> {
    let page = query.page.max(1);
    let per_page = query.per_page.max(1);
    let (rows, total) = listings_adapter::list_public(conn, query).await?;
    Ok(ListingPage {
        items: rows.into_iter().map(Listing::from).collect(),
        total,
        page,
        per_page,
    })
}

pub async fn list_by_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<Listing>, DomainError> {
    let rows = listings_adapter::list_by_breeder(conn, breeder_id).await?;
    Ok(rows.into_iter().map(Listing::from).collect())
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Listing>, DomainError> {
    let rows = listings_adapter::list_all(conn).await?;
    Ok(rows.into_iter().map(Listing::from).collect())
}

pub async fn update_details<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    expected_version: i32,
    dto: ListingUpdate,
) -> Result<Listing, DomainError> {
    let updated = listings_adapter::update_details(conn, id, expected_version, dto).await?;
    Ok(Listing::from(updated))
}

pub async fn set_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing: &Listing,
    status: ListingStatus,
) -> Result<Listing, DomainError> {
    let model = listings::Model::from(listing.clone());
    Ok(Listing::from(
        listings_adapter::set_status(conn, &model, status).await?,
    ))
}

pub async fn set_availability<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    listing: &Listing,
    available_count: i32,
    status: ListingStatus,
) -> Result<Listing, DomainError> {
    let model = listings::Model::from(listing.clone());
    Ok(Listing::from(
        listings_adapter::set_availability(conn, &model, available_count, status).await?,
    ))
}

impl From<listings::Model> for Listing {
    fn from(model: listings::Model) -> Self {
        Self {
            id: model.id,
            breeder_id: model.breeder_id,
            breed_id: model.breed_id,
            kind: model.kind,
            title: model.title,
            description: model.description,
            sex: model.sex,
            location: model.location,
            price: model.price,
            reservation_fee: model.reservation_fee,
            currency: model.currency,
            total_count: model.total_count,
            available_count: model.available_count,
            status: model.status,
            available_from: model.available_from,
            published_at: model.published_at,
            lock_version: model.lock_version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Listing> for listings::Model {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            breeder_id: listing.breeder_id,
            breed_id: listing.breed_id,
            kind: listing.kind,
            title: listing.title,
            description: listing.description,
            sex: listing.sex,
            location: listing.location,
            price: listing.price,
            reservation_fee: listing.reservation_fee,
            currency: listing.currency,
            total_count: listing.total_count,
            available_count: listing.available_count,
            status: listing.status,
            available_from: listing.available_from,
            published_at: listing.published_at,
            lock_version: listing.lock_version,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}
