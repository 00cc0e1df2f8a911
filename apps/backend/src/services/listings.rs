//! Listing management for breeders and the public catalogue.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::info;

use crate::adapters::listings_sea::{ListingCreate, ListingQuery, ListingUpdate};
use crate::domain::listing_rules::{self, ListingShape};
use crate::entities::listings::{ListingKind, ListingStatus, PetSex};
use crate::errors::domain::{DomainError, ForbiddenKind, NotFoundKind};
use crate::repos::applications;
use crate::repos::breeds;
use crate::repos::listings::{self, Listing, ListingPage};
use crate::repos::users::User;

#[derive(Debug, Clone)]
pub struct NewListing {
    pub breed_id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub description: Option<String>,
    pub sex: Option<PetSex>,
    pub location: Option<String>,
    pub price: i64,
    pub reservation_fee: i64,
    /// Falls back to the platform currency
    pub currency: Option<String>,
    /// Defaults to 1; individual listings must be 1
    pub total_count: Option<i32>,
    pub available_from: Option<OffsetDateTime>,
    pub publish: bool,
}

fn require_owner(listing: &Listing, breeder_id: i64) -> Result<(), DomainError> {
    if listing.breeder_id != breeder_id {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            "Only the listing's breeder may change it",
        ));
    }
    Ok(())
}

fn normalize_currency(currency: &str) -> Result<String, DomainError> {
    let currency = currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::validation_other(format!(
            "Currency must be a 3-letter ISO code, got '{currency}'"
        )));
    }
    Ok(currency)
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder: &User,
    input: NewListing,
    default_currency: &str,
) -> Result<Listing, DomainError> {
    breeds::require(conn, input.breed_id).await?;

    let total_count = input.total_count.unwrap_or(1);
    let title = input.title.trim().to_string();
    listing_rules::validate(&ListingShape {
        kind: input.kind,
        title: &title,
        price: input.price,
        reservation_fee: input.reservation_fee,
        total_count,
        available_count: total_count,
    })?;
    let currency = normalize_currency(input.currency.as_deref().unwrap_or(default_currency))?;

    let listing = listings::create(
        conn,
        ListingCreate {
            breeder_id: breeder.id,
            breed_id: input.breed_id,
            kind: input.kind,
            title,
            description: input.description,
            sex: input.sex,
            location: input.location,
            price: input.price,
            reservation_fee: input.reservation_fee,
            currency,
            total_count,
            available_count: total_count,
            status: if input.publish {
                ListingStatus::Active
            } else {
                ListingStatus::Draft
            },
            available_from: input.available_from,
        },
    )
    .await?;

    info!(
        listing_id = listing.id,
        breeder_id = breeder.id,
        status = ?listing.status,
        "Listing created"
    );
    Ok(listing)
}

/// Drafts and archived listings are hidden from the public.
pub async fn get_public<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Listing, DomainError> {
    let listing = listings::require(conn, id).await?;
    match listing.status {
        ListingStatus::Draft | ListingStatus::Archived => Err(DomainError::not_found(
            NotFoundKind::Listing,
            format!("Listing {id} not found"),
        )),
        _ => Ok(listing),
    }
}

pub async fn list_public<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: ListingQuery,
) -> Result<ListingPage, DomainError> {
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(DomainError::validation_other(
                "min_price must not exceed max_price",
            ));
        }
    }
    let query = ListingQuery {
        page: query.page.max(1),
        per_page: query.per_page.clamp(1, 100),
        ..query
    };
    listings::list_public(conn, query).await
}

pub async fn list_for_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<Listing>, DomainError> {
    listings::list_by_breeder(conn, breeder_id).await
}

/// Patch details. `expected_version` defaults to the stored version.
///
/// Changing `total_count` without `available_count` shifts availability by
/// the same delta. Availability is capped by the units applications already
/// claim, and `active`/`reserved` follow it across zero.
pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    id: i64,
    expected_version: Option<i32>,
    mut patch: ListingUpdate,
) -> Result<Listing, DomainError> {
    let current = listings::require(conn, id).await?;
    require_owner(&current, breeder_id)?;
    listing_rules::ensure_editable(current.status)?;

    if let Some(breed_id) = patch.breed_id {
        breeds::require(conn, breed_id).await?;
    }
    if let Some(title) = patch.title.as_mut() {
        *title = title.trim().to_string();
    }
    if let (Some(total), None) = (patch.total_count, patch.available_count) {
        patch.available_count = Some(current.available_count + (total - current.total_count));
    }

    listing_rules::validate(&ListingShape {
        kind: current.kind,
        title: patch.title.as_deref().unwrap_or(&current.title),
        price: patch.price.unwrap_or(current.price),
        reservation_fee: patch.reservation_fee.unwrap_or(current.reservation_fee),
        total_count: patch.total_count.unwrap_or(current.total_count),
        available_count: patch.available_count.unwrap_or(current.available_count),
    })?;

    if let Some(available) = patch.available_count {
        let claimed = applications::count_claimed(conn, id).await?;
        let total = patch.total_count.unwrap_or(current.total_count);
        listing_rules::ensure_within_capacity(total, available, claimed)?;
        let status = listing_rules::status_for_availability(current.status, available);
        if status != current.status {
            patch.status = Some(status);
        }
    }

    let version = expected_version.unwrap_or(current.lock_version);
    let updated = listings::update_details(conn, id, version, patch).await?;
    if updated.status != current.status {
        info!(listing_id = id, status = ?updated.status, "Listing status follows availability");
    }
    Ok(updated)
}

pub async fn publish<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    id: i64,
) -> Result<Listing, DomainError> {
    let listing = listings::require(conn, id).await?;
    require_owner(&listing, breeder_id)?;
    listing_rules::ensure_publishable(listing.status)?;
    let listing = listings::set_status(conn, &listing, ListingStatus::Active).await?;
    info!(listing_id = id, "Listing published");
    Ok(listing)
}

pub async fn archive<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    id: i64,
) -> Result<Listing, DomainError> {
    let listing = listings::require(conn, id).await?;
    require_owner(&listing, breeder_id)?;
    listing_rules::ensure_archivable(listing.status)?;
    let listing = listings::set_status(conn, &listing, ListingStatus::Archived).await?;
    info!(listing_id = id, "Listing archived");
    Ok(listing)
}
