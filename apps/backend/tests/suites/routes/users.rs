use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::factory;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn patch_me_sets_and_clears_fields() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let seeker = factory::seeker(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = seeker.bearer(&env.state.security);

    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"bio": "Cat person", "location": "Abuja"}))
        .to_request();
    let me = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(me["bio"], "Cat person");
    assert_eq!(me["location"], "Abuja");

    // null clears, absent leaves alone
    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header(("Authorization", auth))
        .set_json(json!({"bio": null}))
        .to_request();
    let me = json_body(test::call_service(&app, req).await, 200).await;
    assert!(me["bio"].is_null());
    assert_eq!(me["location"], "Abuja");
    Ok(())
}

#[tokio::test]
async fn patch_me_rejects_unknown_fields() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let seeker = factory::seeker(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .set_json(json!({"role": "admin"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "BAD_REQUEST", StatusCode::BAD_REQUEST).await;
    Ok(())
}

#[tokio::test]
async fn seeker_can_become_breeder() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let seeker = factory::seeker(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/me/become-breeder")
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .to_request();
    let me = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(me["role"], "breeder");

    // breeder routes now open up
    let req = test::TestRequest::get()
        .uri("/api/breeder/listings")
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .to_request();
    let listings = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(listings, json!([]));
    Ok(())
}

#[tokio::test]
async fn public_breeder_profile() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri(&format!("/api/breeders/{}", breeder.id()))
        .to_request();
    let profile = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(profile["kennel_name"], "Happy Tails");
    assert!(
        profile.get("payout_recipient_code").is_none(),
        "payout details are private"
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/breeders/{}", seeker.id()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "USER_NOT_FOUND", StatusCode::NOT_FOUND).await;
    Ok(())
}
