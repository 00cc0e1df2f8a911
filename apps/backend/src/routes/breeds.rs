use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_with::rust::double_option;

use crate::adapters::breeds_sea::{BreedCreate, BreedFilter, BreedUpdate};
use crate::db::txn::with_txn;
use crate::entities::breeds::{BreedSize, Species};
use crate::error::AppError;
use crate::extractors::{AdminUser, ValidatedJson};
use crate::repos::breeds::Breed;
use crate::services::breeds as breed_service;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct BreedListQuery {
    pub species: Option<Species>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBreedRequest {
    pub name: String,
    pub species: Species,
    pub size: Option<BreedSize>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBreedRequest {
    pub name: Option<String>,
    pub species: Option<Species>,
    #[serde(default, with = "double_option")]
    pub size: Option<Option<BreedSize>>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
}

/// GET /api/breeds?species=&q=
async fn list_breeds(
    http_req: HttpRequest,
    query: web::Query<BreedListQuery>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Vec<Breed>>, AppError> {
    let query = query.into_inner();
    let filter = BreedFilter {
        species: query.species,
        q: query.q,
    };

    let breeds = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(breed_service::list(txn, filter).await?) })
    })
    .await?;

    Ok(web::Json(breeds))
}

/// GET /api/breeds/{id}
async fn get_breed(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Breed>, AppError> {
    let id = path.into_inner();

    let breed = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(breed_service::get(txn, id).await?) })
    })
    .await?;

    Ok(web::Json(breed))
}

/// POST /api/breeds (admin)
async fn create_breed(
    http_req: HttpRequest,
    _admin: AdminUser,
    body: ValidatedJson<CreateBreedRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let dto = BreedCreate {
        name: body.name,
        species: body.species,
        size: body.size,
        description: body.description,
    };

    let breed = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(breed_service::create(txn, dto).await?) })
    })
    .await?;

    Ok(HttpResponse::Created().json(breed))
}

/// PATCH /api/breeds/{id} (admin)
async fn update_breed(
    http_req: HttpRequest,
    _admin: AdminUser,
    path: web::Path<i64>,
    body: ValidatedJson<UpdateBreedRequest>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Breed>, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let dto = BreedUpdate {
        name: body.name,
        species: body.species,
        size: body.size,
        description: body.description,
    };

    let breed = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(breed_service::update(txn, id, dto).await?) })
    })
    .await?;

    Ok(web::Json(breed))
}

/// DELETE /api/breeds/{id} (admin); 409 while listings still use it.
async fn delete_breed(
    http_req: HttpRequest,
    _admin: AdminUser,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { Ok(breed_service::delete(txn, id).await?) })
    })
    .await?;

    Ok(HttpResponse::new(StatusCode::NO_CONTENT))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/breeds")
            .route(web::get().to(list_breeds))
            .route(web::post().to(create_breed)),
    );
    cfg.service(
        web::resource("/api/breeds/{id}")
            .route(web::get().to(get_breed))
            .route(web::patch().to(update_breed))
            .route(web::delete().to(delete_breed)),
    );
}
