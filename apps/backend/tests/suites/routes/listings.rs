use actix_web::http::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::factory;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn breeder_creates_draft_then_publishes() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = breeder.bearer(&env.state.security);

    let req = test::TestRequest::post()
        .uri("/api/listings")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({
            "breed_id": breed.id,
            "kind": "litter",
            "title": "Spring litter",
            "price": 250000,
            "reservation_fee": 25000,
            "total_count": 6,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().contains_key(ETAG));
    let created = json_body(resp, 201).await;
    assert_eq!(created["status"], "draft");
    assert_eq!(created["currency"], "NGN");
    assert_eq!(created["available_count"], 6);
    let id = created["id"].as_i64().unwrap();

    // drafts are invisible to the public
    let req = test::TestRequest::get()
        .uri(&format!("/api/listings/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "LISTING_NOT_FOUND", StatusCode::NOT_FOUND).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/listings/{id}/publish"))
        .insert_header(("Authorization", auth))
        .to_request();
    let published = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(published["status"], "active");

    let req = test::TestRequest::get()
        .uri("/api/listings?kind=litter")
        .to_request();
    let page = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], id);
    Ok(())
}

#[tokio::test]
async fn get_honours_if_none_match() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri(&format!("/api/listings/{}", listing.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp
        .headers()
        .get(ETAG)
        .expect("ETag header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        etag,
        format!("\"listing-{}-v{}\"", listing.id, listing.lock_version)
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/listings/{}", listing.id))
        .insert_header((IF_NONE_MATCH, etag))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
    Ok(())
}

#[tokio::test]
async fn patch_with_stale_if_match_conflicts() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = breeder.bearer(&env.state.security);
    let original_etag = format!("\"listing-{}-v{}\"", listing.id, listing.lock_version);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/listings/{}", listing.id))
        .insert_header(("Authorization", auth.clone()))
        .insert_header((IF_MATCH, original_etag.clone()))
        .set_json(json!({"price": 90000}))
        .to_request();
    let updated = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(updated["price"], 90000);
    assert_eq!(updated["lock_version"], listing.lock_version + 1);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/listings/{}", listing.id))
        .insert_header(("Authorization", auth))
        .insert_header((IF_MATCH, original_etag))
        .set_json(json!({"price": 80000}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "OPTIMISTIC_LOCK", StatusCode::CONFLICT).await;
    Ok(())
}

#[tokio::test]
async fn only_owner_may_edit() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let owner = factory::breeder(env.db()).await?;
    let rival = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &owner).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/listings/{}", listing.id))
        .insert_header(("Authorization", rival.bearer(&env.state.security)))
        .set_json(json!({"title": "Mine now"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "NOT_A_PARTY", StatusCode::FORBIDDEN).await;
    Ok(())
}

#[tokio::test]
async fn search_validates_price_range() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri("/api/listings?min_price=500&max_price=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}
