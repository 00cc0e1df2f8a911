//! Seed data through the service layer, so rows always pass the same
//! validation the API applies.

use backend_test_support::unique_helpers::{unique_breed_name, unique_email, unique_str};
use pawhaven_backend::adapters::breeds_sea::BreedCreate;
use pawhaven_backend::adapters::users_sea::ProfileUpdate;
use pawhaven_backend::domain::Action;
use pawhaven_backend::entities::breeds::Species;
use pawhaven_backend::entities::listings::ListingKind;
use pawhaven_backend::entities::transactions::TransactionKind;
use pawhaven_backend::payments::GatewayPaymentStatus;
use pawhaven_backend::repos::applications::Application;
use pawhaven_backend::repos::breeds::Breed;
use pawhaven_backend::repos::listings::Listing;
use pawhaven_backend::repos::transactions::Transaction;
use pawhaven_backend::repos::users::User;
use pawhaven_backend::services::applications::{self, NewApplication};
use pawhaven_backend::services::breeds;
use pawhaven_backend::services::listings::{self, NewListing};
use pawhaven_backend::services::payments;
use pawhaven_backend::services::users::{self, LoginInput};
use pawhaven_backend::state::security_config::SecurityConfig;
use pawhaven_backend::AppError;
use sea_orm::ConnectionTrait;

use super::auth::bearer_header;
use super::test_state::TestEnv;

/// A persisted user plus the e-mail it logs in with.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user: User,
    pub email: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn bearer(&self, sec: &SecurityConfig) -> String {
        bearer_header(&self.user.sub, &self.email, sec)
    }
}

async fn login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: String,
    as_breeder: bool,
    is_admin: bool,
) -> Result<TestUser, AppError> {
    let user = users::ensure_user(
        conn,
        LoginInput {
            email: email.clone(),
            name: None,
            google_sub: unique_str("google"),
            as_breeder,
            is_admin,
        },
    )
    .await?;
    Ok(TestUser { user, email })
}

pub async fn seeker<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<TestUser, AppError> {
    login(conn, unique_email("seeker"), false, false).await
}

/// Breeder with a kennel name and a payout recipient on file.
pub async fn breeder<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<TestUser, AppError> {
    let mut breeder = login(conn, unique_email("breeder"), true, false).await?;
    breeder.user = users::update_profile(
        conn,
        &breeder.user,
        ProfileUpdate {
            kennel_name: Some(Some("Happy Tails".to_string())),
            payout_recipient_code: Some(Some(unique_str("RCP"))),
            ..ProfileUpdate::default()
        },
    )
    .await?;
    Ok(breeder)
}

/// Breeder without a payout recipient.
pub async fn breeder_without_recipient<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<TestUser, AppError> {
    login(conn, unique_email("breeder"), true, false).await
}

pub async fn admin<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<TestUser, AppError> {
    let email = format!("{}@admin.pawhaven.test", unique_str("ops").to_lowercase());
    login(conn, email, false, true).await
}

pub async fn breed<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<Breed, AppError> {
    Ok(breeds::create(
        conn,
        BreedCreate {
            name: unique_breed_name("Labrador"),
            species: Species::Dog,
            size: None,
            description: None,
        },
    )
    .await?)
}

/// Published individual listing priced 100_000 with a 10_000 fee.
pub fn new_listing(breed_id: i64) -> NewListing {
    NewListing {
        breed_id,
        kind: ListingKind::Individual,
        title: "Golden puppy".to_string(),
        description: Some("Vaccinated and microchipped".to_string()),
        sex: None,
        location: Some("Lagos".to_string()),
        price: 100_000,
        reservation_fee: 10_000,
        currency: None,
        total_count: None,
        available_from: None,
        publish: true,
    }
}

pub async fn listing_with<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder: &TestUser,
    input: NewListing,
) -> Result<Listing, AppError> {
    Ok(listings::create(conn, &breeder.user, input, "NGN").await?)
}

/// Breed plus a published listing from `breeder`.
pub async fn listing<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder: &TestUser,
) -> Result<Listing, AppError> {
    let breed = breed(conn).await?;
    listing_with(conn, breeder, new_listing(breed.id)).await
}

pub async fn submit<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker: &TestUser,
    listing_id: i64,
) -> Result<Application, AppError> {
    Ok(applications::submit(
        conn,
        &seeker.user,
        NewApplication {
            listing_id,
            message: "We have a big garden and lots of time".to_string(),
            household: Some("Two adults".to_string()),
            has_other_pets: false,
            preferred_sex: None,
        },
    )
    .await?)
}

pub async fn act<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    actor: &TestUser,
    application_id: i64,
    action: Action,
) -> Result<Application, AppError> {
    Ok(applications::act(conn, &actor.user, application_id, action, None, None).await?)
}

/// Submitted and approved by the listing's breeder.
pub async fn approved_application<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker: &TestUser,
    breeder: &TestUser,
    listing_id: i64,
) -> Result<Application, AppError> {
    let application = submit(conn, seeker, listing_id).await?;
    act(conn, breeder, application.id, Action::Approve).await
}

/// A settled 10_000 NGN reservation fee owed to `breeder`, from a fresh seeker.
pub async fn paid_fee(env: &TestEnv, breeder: &TestUser) -> Result<Transaction, AppError> {
    let seeker = seeker(env.db()).await?;
    let listing = listing(env.db(), breeder).await?;
    let app = approved_application(env.db(), &seeker, breeder, listing.id).await?;
    let tx = payments::initiate(
        None,
        &env.state,
        &seeker.user,
        app.id,
        TransactionKind::ReservationFee,
    )
    .await?;
    env.gateway.settle(&tx.reference, GatewayPaymentStatus::Success);
    payments::verify(None, &env.state, &seeker.user, &tx.reference).await
}
