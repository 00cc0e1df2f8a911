use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use pawhaven_backend::payments::GatewayPaymentStatus;
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::factory;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn reservation_fee_checkout_and_verify() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let application =
        factory::approved_application(env.db(), &seeker, &breeder, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = seeker.bearer(&env.state.security);

    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/payments", application.id))
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"kind": "reservation_fee"}))
        .to_request();
    let tx = json_body(test::call_service(&app, req).await, 201).await;
    assert_eq!(tx["status"], "pending");
    assert_eq!(tx["amount"], 10_000);
    let reference = tx["reference"].as_str().unwrap().to_string();
    assert_eq!(
        tx["authorization_url"],
        format!("https://checkout.pawhaven.test/{reference}")
    );

    // not settled yet
    let req = test::TestRequest::post()
        .uri(&format!("/api/payments/{reference}/verify"))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let tx = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(tx["status"], "pending");

    env.gateway.settle(&reference, GatewayPaymentStatus::Success);
    let req = test::TestRequest::post()
        .uri(&format!("/api/payments/{reference}/poll"))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let tx = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(tx["status"], "success");

    let req = test::TestRequest::get()
        .uri(&format!("/api/applications/{}", application.id))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let app_body = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(app_body["status"], "reserved");

    let req = test::TestRequest::get()
        .uri("/api/payments")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .to_request();
    let received = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(received.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn payment_before_approval_is_refused() -> Result<(), AppError> {
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
        .uri(&format!("/api/applications/{}/payments", application.id))
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .set_json(json!({"kind": "reservation_fee"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "PAYMENT_NOT_ALLOWED", StatusCode::UNPROCESSABLE_ENTITY).await;
    Ok(())
}

#[tokio::test]
async fn gateway_outage_is_502() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let application =
        factory::approved_application(env.db(), &seeker, &breeder, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    env.gateway.set_unavailable(true);
    let req = test::TestRequest::post()
        .uri(&format!("/api/applications/{}/payments", application.id))
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .set_json(json!({"kind": "reservation_fee"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "PAYMENT_GATEWAY_ERROR", StatusCode::BAD_GATEWAY).await;
    Ok(())
}

#[tokio::test]
async fn unknown_reference_is_404() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let seeker = factory::seeker(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri("/api/payments/PH-missing")
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "TRANSACTION_NOT_FOUND", StatusCode::NOT_FOUND).await;
    Ok(())
}
