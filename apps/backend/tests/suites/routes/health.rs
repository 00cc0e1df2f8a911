use actix_web::test;
use pawhaven_backend::AppError;

use crate::common::json_body;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn health_reports_database_and_migrations() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    let body = json_body(resp, 200).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert_ne!(body["migrations"], "no_migrations");
    Ok(())
}
