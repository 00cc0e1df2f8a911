use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::factory;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn submit_then_breeder_approves() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let seeker_auth = seeker.bearer(&env.state.security);
    let breeder_auth = breeder.bearer(&env.state.security);

    let req = test::TestRequest::post()
        .uri("/api/applications")
        .insert_header(("Authorization", seeker_auth.clone()))
        .set_json(json!({
            "listing_id": listing.id,
            "message": "Fenced garden, work from home",
            "has_other_pets": true,
        }))
        .to_request();
    let submitted = json_body(test::call_service(&app, req).await, 201).await;
    assert_eq!(submitted["status"], "submitted");
    let id = submitted["id"].as_i64().unwrap();

    // the breeder's inbox shows it
    let req = test::TestRequest::get()
        .uri("/api/breeder/applications?status=submitted")
        .insert_header(("Authorization", breeder_auth.clone()))
        .to_request();
    let inbox = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(inbox.as_array().map(Vec::len), Some(1));

    // action body is optional
    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{id}/approve"))
        .insert_header(("Authorization", breeder_auth))
        .to_request();
    let approved = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(approved["status"], "approved");

    let req = test::TestRequest::get()
        .uri(&format!("/api/applications/{id}/events"))
        .insert_header(("Authorization", seeker_auth))
        .to_request();
    let events = json_body(test::call_service(&app, req).await, 200).await;
    let to: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["to_status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(to, ["submitted", "approved"]);
    Ok(())
}

#[tokio::test]
async fn seeker_cannot_approve_own_application() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let application = factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/approve", application.id))
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .set_json(json!({"note": "looks good to me"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "NOT_A_PARTY", StatusCode::FORBIDDEN).await;
    Ok(())
}

#[tokio::test]
async fn unknown_action_and_stale_version() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let application = factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = breeder.bearer(&env.state.security);

    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/adopt", application.id))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "VALIDATION_ERROR", StatusCode::UNPROCESSABLE_ENTITY).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/review", application.id))
        .insert_header(("Authorization", auth))
        .set_json(json!({"expected_version": application.lock_version + 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "OPTIMISTIC_LOCK", StatusCode::CONFLICT).await;
    Ok(())
}

#[tokio::test]
async fn duplicate_application_conflicts() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/applications")
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .set_json(json!({"listing_id": listing.id, "message": "Again"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "DUPLICATE_APPLICATION", StatusCode::CONFLICT).await;
    Ok(())
}

#[tokio::test]
async fn strangers_cannot_read_applications() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let stranger = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let application = factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri(&format!("/api/applications/{}", application.id))
        .insert_header(("Authorization", stranger.bearer(&env.state.security)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "NOT_A_PARTY", StatusCode::FORBIDDEN).await;
    Ok(())
}
