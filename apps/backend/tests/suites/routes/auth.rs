use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use backend_test_support::unique_helpers::{unique_email, unique_str};
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn login_creates_user_and_token_works() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let email = unique_email("newcomer");
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": email,
            "name": "Ada",
            "google_sub": unique_str("google"),
        }))
        .to_request();
    let body = json_body(test::call_service(&app, req).await, 200).await;

    assert_eq!(body["user"]["role"], "seeker");
    assert!(body["user"].get("sub").is_none(), "sub stays server-side");
    let token = body["token"].as_str().expect("token string").to_string();

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let me = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(me["email"], email.to_lowercase());
    assert_eq!(me["id"], body["user"]["id"]);
    Ok(())
}

#[tokio::test]
async fn breeder_signup_and_admin_allowlist() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": unique_email("kennel"),
            "google_sub": unique_str("google"),
            "role": "breeder",
        }))
        .to_request();
    let body = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(body["user"]["role"], "breeder");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": format!("{}@admin.pawhaven.test", unique_str("ops").to_lowercase()),
            "google_sub": unique_str("google"),
        }))
        .to_request();
    let body = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(body["user"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn login_rejects_requested_admin_role() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    for role in ["admin", "wizard"] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": unique_email("sneaky"),
                "google_sub": unique_str("google"),
                "role": role,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem(resp, "INVALID_ROLE", StatusCode::UNPROCESSABLE_ENTITY).await;
    }
    Ok(())
}

#[tokio::test]
async fn login_validates_credentials() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "not-an-email", "google_sub": unique_str("google")}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "INVALID_EMAIL", StatusCode::UNPROCESSABLE_ENTITY).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": unique_email("nosub"), "google_sub": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "INVALID_GOOGLE_SUB", StatusCode::UNPROCESSABLE_ENTITY).await;
    Ok(())
}

#[tokio::test]
async fn second_login_with_other_google_account_conflicts() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let email = unique_email("twice");
    let first = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": email, "google_sub": unique_str("google")}))
        .to_request();
    json_body(test::call_service(&app, first).await, 200).await;

    let second = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": email, "google_sub": unique_str("google")}))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_problem(resp, "GOOGLE_SUB_MISMATCH", StatusCode::CONFLICT).await;
    Ok(())
}
