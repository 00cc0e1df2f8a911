//! Listing routes: public browse, breeder management.
//!
//! Single-listing responses carry a versioned ETag. `If-None-Match` on
//! `GET /api/listings/{id}` short-circuits to 304 and `If-Match` on `PATCH`
//! supplies the expected `lock_version`.

use actix_web::http::header::{CACHE_CONTROL, ETAG};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_with::rust::double_option;
use time::OffsetDateTime;

use crate::adapters::listings_sea::{ListingQuery, ListingUpdate};
use crate::db::txn::with_txn;
use crate::entities::listings::{ListingKind, PetSex};
use crate::error::AppError;
use crate::extractors::{BreederUser, ValidatedJson};
use crate::http::etag::{expected_version, if_none_match_hits, listing_etag};
use crate::repos::listings::{Listing, ListingPage};
use crate::services::listings::{self as listing_service, NewListing};
use crate::state::app_state::AppState;

/// RFC 3339 timestamp in request bodies.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(transparent)]
pub struct Rfc3339(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

#[derive(Debug, Deserialize)]
pub struct ListingListQuery {
    pub breed_id: Option<i64>,
    pub kind: Option<ListingKind>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl From<ListingListQuery> for ListingQuery {
    fn from(value: ListingListQuery) -> Self {
        let defaults = ListingQuery::default();
        Self {
            breed_id: value.breed_id,
            kind: value.kind,
            min_price: value.min_price,
            max_price: value.max_price,
            q: value.q,
            page: value.page.unwrap_or(defaults.page),
            per_page: value.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateListingRequest {
    pub breed_id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub description: Option<String>,
    pub sex: Option<PetSex>,
    pub location: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub reservation_fee: i64,
    pub currency: Option<String>,
    pub total_count: Option<i32>,
    pub available_from: Option<Rfc3339>,
    #[serde(default)]
    pub publish: bool,
}

impl From<CreateListingRequest> for NewListing {
    fn from(value: CreateListingRequest) -> Self {
        Self {
            breed_id: value.breed_id,
            kind: value.kind,
            title: value.title,
            description: value.description,
            sex: value.sex,
            location: value.location,
            price: value.price,
            reservation_fee: value.reservation_fee,
            currency: value.currency,
            total_count: value.total_count,
            available_from: value.available_from.map(|t| t.0),
            publish: value.publish,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub breed_id: Option<i64>,
    pub title: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub sex: Option<Option<PetSex>>,
    #[serde(default, with = "double_option")]
    pub location: Option<Option<String>>,
    pub price: Option<i64>,
    pub reservation_fee: Option<i64>,
    pub total_count: Option<i32>,
    pub available_count: Option<i32>,
    #[serde(default, with = "double_option")]
    pub available_from: Option<Option<Rfc3339>>,
    /// Alternative to `If-Match`
    pub expected_version: Option<i32>,
}

impl UpdateListingRequest {
    fn into_parts(self) -> (Option<i32>, ListingUpdate) {
        let patch = ListingUpdate {
            breed_id: self.breed_id,
            title: self.title,
            description: self.description,
            sex: self.sex,
            location: self.location,
            price: self.price,
            reservation_fee: self.reservation_fee,
            total_count: self.total_count,
            available_count: self.available_count,
            available_from: self.available_from.map(|v| v.map(|t| t.0)),
            status: None,
        };
        (self.expected_version, patch)
    }
}

fn with_etag(status: StatusCode, listing: &Listing) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((ETAG, listing_etag(listing.id, listing.lock_version)))
        .json(listing)
}

/// GET /api/listings
async fn list_listings(
    http_req: HttpRequest,
    query: web::Query<ListingListQuery>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<ListingPage>, AppError> {
    let query = ListingQuery::from(query.into_inner());

    let page = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(listing_service::list_public(txn, query).await?) })
    })
    .await?;

    Ok(web::Json(page))
}

/// GET /api/listings/{id}
async fn get_listing(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let listing = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(listing_service::get_public(txn, id).await?) })
    })
    .await?;

    let etag = listing_etag(listing.id, listing.lock_version);
    if if_none_match_hits(&http_req, &etag) {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag))
            .insert_header((CACHE_CONTROL, "no-cache"))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .json(listing))
}

/// POST /api/listings (breeder)
async fn create_listing(
    http_req: HttpRequest,
    breeder: BreederUser,
    body: ValidatedJson<CreateListingRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let breeder = breeder.0;
    let input = NewListing::from(body.into_inner());
    let currency = app_state.payments.currency.clone();

    let listing = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            Ok(listing_service::create(txn, &breeder, input, &currency).await?)
        })
    })
    .await?;

    Ok(with_etag(StatusCode::CREATED, &listing))
}

/// PATCH /api/listings/{id} (owner)
async fn update_listing(
    http_req: HttpRequest,
    breeder: BreederUser,
    path: web::Path<i64>,
    body: ValidatedJson<UpdateListingRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let breeder_id = breeder.id;
    let (body_version, patch) = body.into_inner().into_parts();
    let expected = expected_version(&http_req, body_version)?;

    let listing = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            Ok(listing_service::update(txn, breeder_id, id, expected, patch).await?)
        })
    })
    .await?;

    Ok(with_etag(StatusCode::OK, &listing))
}

/// POST /api/listings/{id}/publish (owner)
async fn publish_listing(
    http_req: HttpRequest,
    breeder: BreederUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let breeder_id = breeder.id;

    let listing = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(listing_service::publish(txn, breeder_id, id).await?) })
    })
    .await?;

    Ok(with_etag(StatusCode::OK, &listing))
}

/// POST /api/listings/{id}/archive (owner)
async fn archive_listing(
    http_req: HttpRequest,
    breeder: BreederUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let breeder_id = breeder.id;

    let listing = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(listing_service::archive(txn, breeder_id, id).await?) })
    })
    .await?;

    Ok(with_etag(StatusCode::OK, &listing))
}

/// GET /api/breeder/listings: the breeder's own listings, any status.
async fn my_listings(
    http_req: HttpRequest,
    breeder: BreederUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Listing>>, AppError> {
    let breeder_id = breeder.id;

    let listings = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(listing_service::list_for_breeder(txn, breeder_id).await?) })
    })
    .await?;

    Ok(web::Json(listings))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/listings")
            .route(web::get().to(list_listings))
            .route(web::post().to(create_listing)),
    );
    cfg.service(
        web::resource("/api/listings/{id}")
            .route(web::get().to(get_listing))
            .route(web::patch().to(update_listing)),
    );
    cfg.service(web::resource("/api/listings/{id}/publish").route(web::post().to(publish_listing)));
    cfg.service(web::resource("/api/listings/{id}/archive").route(web::post().to(archive_listing)));
    cfg.service(web::resource("/api/breeder/listings").route(web::get().to(my_listings)));
}
