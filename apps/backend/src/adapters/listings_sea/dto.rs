//! DTOs for listings_sea adapter.

use time::OffsetDateTime;

use crate::entities::listings::{ListingKind, ListingStatus, PetSex};

#[derive(Debug, Clone)]
pub struct ListingCreate {
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
    pub available_from: Option<OffsetDateTime>,
}

/// Column patch. Outer `None` leaves a column alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ListingUpdate {
    pub breed_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub sex: Option<Option<PetSex>>,
    pub location: Option<Option<String>>,
    pub price: Option<i64>,
    pub reservation_fee: Option<i64>,
    pub total_count: Option<i32>,
    pub available_count: Option<i32>,
    pub available_from: Option<Option<OffsetDateTime>>,
    /// Set by the service when availability crosses zero
    pub status: Option<ListingStatus>,
}

/// Public browse filter; pages are 1-based.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub breed_id: Option<i64>,
    pub kind: Option<ListingKind>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub q: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            breed_id: None,
            kind: None,
            min_price: None,
            max_price: None,
            q: None,
            page: 1,
            per_page: 20,
        }
    }
}
