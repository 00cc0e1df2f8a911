use actix_web::test;
use pawhaven_backend::services::listings;
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::factory;
use crate::support::shared_txn;
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn handlers_run_on_the_injected_transaction() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let shared = shared_txn::open(env.db()).await;

    let req = test::TestRequest::post()
        .uri("/api/listings")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .set_json(json!({
            "breed_id": breed.id,
            "kind": "individual",
            "title": "Rescue tabby",
            "price": 30000,
            "publish": true,
        }))
        .to_request();
    shared_txn::inject(&req, &shared);
    let created = json_body(test::call_service(&app, req).await, 201).await;
    let id = created["id"].as_i64().unwrap();

    // visible inside the transaction
    let inside = listings::get_public(shared.transaction(), id).await?;
    assert_eq!(inside.title, "Rescue tabby");

    drop(app);
    shared_txn::rollback(shared).await?;

    let after = listings::list_for_breeder(env.db(), breeder.id()).await?;
    assert!(after.is_empty(), "shared transaction was never committed");
    Ok(())
}
