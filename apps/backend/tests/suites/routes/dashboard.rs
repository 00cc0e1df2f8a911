use actix_web::test;
use pawhaven_backend::AppError;

use crate::common::json_body;
use crate::support::factory::{self, paid_fee};
use crate::support::{build_test_env, create_test_app};

#[tokio::test]
async fn each_role_sees_its_dashboard() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let admin = factory::admin(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    paid_fee(&env, &breeder).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    factory::submit(env.db(), &seeker, listing.id).await?;
    let app = create_test_app(env.state.clone())
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::get()
        .uri("/api/me/dashboard")
        .insert_header(("Authorization", seeker.bearer(&env.state.security)))
        .to_request();
    let mine = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(mine["open_applications"], 1);
    assert_eq!(mine["applications_by_status"]["submitted"], 1);

    let req = test::TestRequest::get()
        .uri("/api/breeder/dashboard")
        .insert_header(("Authorization", breeder.bearer(&env.state.security)))
        .to_request();
    let kennel = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(kennel["revenue"]["NGN"]["gross"], 10_000);
    assert_eq!(kennel["revenue"]["NGN"]["pending_payout"], 9_000);
    assert_eq!(kennel["applications_awaiting_action"], 1);

    let req = test::TestRequest::get()
        .uri("/api/admin/dashboard")
        .insert_header(("Authorization", admin.bearer(&env.state.security)))
        .to_request();
    let ops = json_body(test::call_service(&app, req).await, 200).await;
    assert_eq!(ops["gross_merchandise_volume"]["NGN"], 10_000);
    assert_eq!(ops["pending_payouts"]["NGN"], 9_000);
    assert!(ops["users_by_role"]["breeder"].as_u64().unwrap_or(0) >= 1);
    Ok(())
}
