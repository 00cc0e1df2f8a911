use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use pawhaven_backend::AppError;

use crate::common::json_body;
use crate::support::factory;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn breeder_reads_new_application_notice() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = breeder.bearer(&env.state.security);

    let req = test::TestRequest::get()
        .uri("/api/notifications/unread_count")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let count = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(count["unread"], 1);

    let req = test::TestRequest::get()
        .uri("/api/notifications?unread_only=true")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let list = json_body(test::call_service(&app, req).await, 200).await;
    let id = list[0]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/notifications/{id}/read"))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let read = json_body(test::call_service(&app, req).await, 200).await;
    assert!(read["read_at"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/notifications/unread_count")
        .insert_header(("Authorization", auth))
        .to_request();
    let count = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(count["unread"], 0);
    Ok(())
}

#[tokio::test]
async fn cannot_mark_someone_elses_notification() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri("/api/notifications")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .to_request();
    let list = json_body(test::call_service(&app, req).await, 200).await;
    let id = list[0]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/notifications/{id}/read"))
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "NOTIFICATION_NOT_FOUND", StatusCode::NOT_FOUND).await;
    Ok(())
}

#[tokio::test]
async fn read_all_reports_count() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    for _ in 0..2 {
        let seeker = factory::seeker(env.db()).await?;
        factory::submit(env.db(), &seeker, listing.id).await?;
    }
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/notifications/read_all")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .to_request();
    let body = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(body["marked"], 2);
    Ok(())
}
