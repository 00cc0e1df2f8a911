use pawhaven_backend::domain::Action;
use pawhaven_backend::entities::applications::ApplicationStatus;
use pawhaven_backend::entities::listings::ListingStatus;
use pawhaven_backend::entities::transactions::TransactionKind;
use pawhaven_backend::entities::users::UserRole;
use pawhaven_backend::payments::GatewayPaymentStatus;
use pawhaven_backend::services::{dashboard, payments, payouts};
use pawhaven_backend::AppError;

use crate::support::build_test_env;
use crate::support::factory;

#[tokio::test]
async fn seeker_and_breeder_views_follow_the_money() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let bps = env.state.payments.commission_bps;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    let admin = factory::admin(env.db()).await?;

    let paid_listing = factory::listing(env.db(), &breeder).await?;
    let other_listing = factory::listing(env.db(), &breeder).await?;
    let app = factory::approved_application(env.db(), &seeker, &breeder, paid_listing.id).await?;
    let withdrawn = factory::submit(env.db(), &seeker, other_listing.id).await?;
    factory::act(env.db(), &seeker, withdrawn.id, Action::Withdraw).await?;

    let tx = payments::initiate(
        None,
        &env.state,
        &seeker.user,
        app.id,
        TransactionKind::ReservationFee,
    )
    .await?;
    env.gateway.settle(&tx.reference, GatewayPaymentStatus::Success);
    payments::verify(None, &env.state, &seeker.user, &tx.reference).await?;

    let mine = dashboard::seeker(env.db(), seeker.id()).await?;
    assert_eq!(mine.open_applications, 1);
    assert_eq!(mine.applications_by_status.get(&ApplicationStatus::Reserved), Some(&1));
    assert_eq!(mine.applications_by_status.get(&ApplicationStatus::Withdrawn), Some(&1));
    assert_eq!(mine.total_paid.get("NGN"), Some(&10_000));

    let before = dashboard::breeder(env.db(), breeder.id(), bps).await?;
    assert_eq!(before.listings_by_status.get(&ListingStatus::Reserved), Some(&1));
    assert_eq!(before.listings_by_status.get(&ListingStatus::Active), Some(&1));
    assert_eq!(before.units_available, 1);
    assert_eq!(before.applications_awaiting_action, 0);
    let ngn = &before.revenue["NGN"];
    assert_eq!(ngn.gross, 10_000);
    assert_eq!(ngn.commission, 1_000);
    assert_eq!(ngn.net, 9_000);
    assert_eq!(ngn.pending_payout, 9_000);
    assert_eq!(ngn.paid_out, 0);

    payouts::create(None, &env.state, &admin.user, breeder.id(), "NGN").await?;
    let after = dashboard::breeder(env.db(), breeder.id(), bps).await?;
    let ngn = &after.revenue["NGN"];
    assert_eq!(ngn.gross, 10_000);
    assert_eq!(ngn.paid_out, 9_000);
    assert_eq!(ngn.pending_payout, 0);
    assert_eq!(ngn.net, 9_000);
    Ok(())
}

#[tokio::test]
async fn admin_view_counts_platform_activity() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let bps = env.state.payments.commission_bps;
    let breeder = factory::breeder(env.db()).await?;
    let seeker = factory::seeker(env.db()).await?;
    factory::admin(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let app = factory::approved_application(env.db(), &seeker, &breeder, listing.id).await?;

    let tx = payments::initiate(
        None,
        &env.state,
        &seeker.user,
        app.id,
        TransactionKind::ReservationFee,
    )
    .await?;
    env.gateway.settle(&tx.reference, GatewayPaymentStatus::Failed);
    payments::verify(None, &env.state, &seeker.user, &tx.reference).await?;

    let view = dashboard::admin(env.db(), bps).await?;
    assert!(view.users_by_role.get(&UserRole::Breeder).copied().unwrap_or(0) >= 1);
    assert!(view.users_by_role.get(&UserRole::Seeker).copied().unwrap_or(0) >= 1);
    assert!(view.users_by_role.get(&UserRole::Admin).copied().unwrap_or(0) >= 1);
    assert!(view.listings_by_status.get(&ListingStatus::Active).copied().unwrap_or(0) >= 1);
    assert!(view.failed_payments >= 1);
    Ok(())
}
