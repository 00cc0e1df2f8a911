use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use pawhaven_backend::AppError;
use serde_json::json;

use crate::common::json_body;
use crate::support::factory::{self, paid_fee};
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn admin_previews_and_pays_out() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let admin = factory::admin(env.db()).await?;
    paid_fee(&env, &breeder).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = admin.bearer(&env.state.security);

    let req = test::TestRequest::get()
        .uri("/api/admin/payouts/preview")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let preview = json_body(test::call_service(&app, req).await, 200).await;
    let row = preview
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["breeder_id"] == breeder.id())
        .expect("breeder has a balance")
        .clone();
    assert_eq!(row["net"], 9_000);

    let req = test::TestRequest::post()
        .uri("/api/admin/payouts")
        .insert_header(("Authorization", auth))
        .set_json(json!({"breeder_id": breeder.id(), "currency": "ngn"}))
        .to_request();
    let payout = json_body(test::call_service(&app, req).await, 201).await;
    assert_eq!(payout["status"], "paid");
    assert_eq!(payout["currency"], "NGN");
    assert_eq!(payout["net_amount"], 9_000);

    let req = test::TestRequest::get()
        .uri("/api/breeder/payouts")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .to_request();
    let mine = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(mine[0]["id"], payout["id"]);
    Ok(())
}

#[tokio::test]
async fn nothing_owed_is_a_conflict() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let admin = factory::admin(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/admin/payouts")
        .insert_header(("Authorization", admin.bearer(&env.state.security)))
        .set_json(json!({"breeder_id": breeder.id(), "currency": "NGN"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "NOTHING_TO_PAY_OUT", StatusCode::CONFLICT).await;
    Ok(())
}

#[tokio::test]
async fn breeders_cannot_pay_themselves() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/api/admin/payouts")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .set_json(json!({"breeder_id": breeder.id(), "currency": "NGN"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "INSUFFICIENT_ROLE", StatusCode::FORBIDDEN).await;
    Ok(())
}

#[tokio::test]
async fn settling_a_finished_payout_is_a_conflict() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let admin = factory::admin(env.db()).await?;
    paid_fee(&env, &breeder).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;
    let auth = admin.bearer(&env.state.security);

    let req = test::TestRequest::post()
        .uri("/api/admin/payouts")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"breeder_id": breeder.id(), "currency": "NGN"}))
        .to_request();
    let payout = json_body(test::call_service(&app, req).await, 201).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/payouts/{}/settle", payout["id"]))
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "INVALID_TRANSITION", StatusCode::CONFLICT).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/payouts/{}/settle", payout["id"]))
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "INSUFFICIENT_ROLE", StatusCode::FORBIDDEN).await;
    Ok(())
}
