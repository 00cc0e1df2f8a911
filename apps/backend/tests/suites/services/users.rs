use backend_test_support::unique_helpers::{unique_email, unique_str};
use pawhaven_backend::adapters::users_sea::ProfileUpdate;
use pawhaven_backend::entities::user_credentials;
use pawhaven_backend::entities::users::UserRole;
use pawhaven_backend::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use pawhaven_backend::services::applications::{self, NewApplication};
use pawhaven_backend::services::listings;
use pawhaven_backend::services::users::{self, LoginInput};
use pawhaven_backend::AppError;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::support::build_test_env;
use crate::support::factory;

fn login_input(email: &str, google_sub: &str) -> LoginInput {
    LoginInput {
        email: email.to_string(),
        name: Some("Ada".to_string()),
        google_sub: google_sub.to_string(),
        as_breeder: false,
        is_admin: false,
    }
}

#[tokio::test]
async fn ensure_user_inserts_then_reuses() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let db = env.db();
    let email = unique_email("ada");
    let sub = unique_str("google");

    let first = users::ensure_user(db, login_input(&email, &sub)).await?;
    assert_eq!(first.username.as_deref(), Some("Ada"));
    assert_eq!(first.role, UserRole::Seeker);

    let mut again = login_input(&email.to_uppercase(), &sub);
    again.name = Some("Ada Lovelace".to_string());
    let second = users::ensure_user(db, again).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.username.as_deref(), Some("Ada"), "username is set once");

    let credentials = user_credentials::Entity::find()
        .filter(user_credentials::Column::Email.eq(email.to_lowercase()))
        .count(db)
        .await?;
    assert_eq!(credentials, 1);
    Ok(())
}

#[tokio::test]
async fn ensure_user_rejects_a_different_google_account() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let email = unique_email("ada");
    users::ensure_user(env.db(), login_input(&email, &unique_str("google"))).await?;

    let err = users::ensure_user(env.db(), login_input(&email, &unique_str("google")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::GoogleSubMismatch, _)
    ));
    Ok(())
}

#[tokio::test]
async fn ensure_user_validates_input() -> Result<(), AppError> {
    let env = build_test_env().await?;

    let err = users::ensure_user(env.db(), login_input("not-an-email", "g-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidEmail, _)));

    let err = users::ensure_user(env.db(), login_input(&unique_email("ada"), "   "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidGoogleSub, _)
    ));
    Ok(())
}

#[tokio::test]
async fn breeder_signup_and_admin_promotion() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let email = unique_email("kennel");
    let sub = unique_str("google");

    let breeder = users::ensure_user(
        env.db(),
        LoginInput {
            as_breeder: true,
            ..login_input(&email, &sub)
        },
    )
    .await?;
    assert_eq!(breeder.role, UserRole::Breeder);

    let promoted = users::ensure_user(
        env.db(),
        LoginInput {
            is_admin: true,
            ..login_input(&email, &sub)
        },
    )
    .await?;
    assert_eq!(promoted.id, breeder.id);
    assert_eq!(promoted.role, UserRole::Admin);
    Ok(())
}

#[tokio::test]
async fn profile_patch_rules() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let seeker = factory::seeker(env.db()).await?;

    let err = users::update_profile(
        env.db(),
        &seeker.user,
        ProfileUpdate {
            kennel_name: Some(Some("Nope Kennels".to_string())),
            ..ProfileUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidRole, _)));

    let updated = users::update_profile(
        env.db(),
        &seeker.user,
        ProfileUpdate {
            bio: Some(Some("  Loves dogs  ".to_string())),
            location: Some(Some("Abuja".to_string())),
            ..ProfileUpdate::default()
        },
    )
    .await?;
    assert_eq!(updated.bio.as_deref(), Some("Loves dogs"));
    assert_eq!(updated.location.as_deref(), Some("Abuja"));

    let cleared = users::update_profile(
        env.db(),
        &updated,
        ProfileUpdate {
            bio: Some(None),
            ..ProfileUpdate::default()
        },
    )
    .await?;
    assert_eq!(cleared.bio, None);
    assert_eq!(cleared.location.as_deref(), Some("Abuja"));
    Ok(())
}

#[tokio::test]
async fn become_breeder_is_idempotent_and_closed_to_admins() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let seeker = factory::seeker(env.db()).await?;

    let upgraded = users::become_breeder(env.db(), &seeker.user).await?;
    assert_eq!(upgraded.role, UserRole::Breeder);
    let again = users::become_breeder(env.db(), &upgraded).await?;
    assert_eq!(again.role, UserRole::Breeder);

    let admin = factory::admin(env.db()).await?;
    let err = users::become_breeder(env.db(), &admin.user).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidRole, _)));
    Ok(())
}

#[tokio::test]
async fn breeder_profile_lists_only_public_listings() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;

    let public = factory::listing_with(env.db(), &breeder, factory::new_listing(breed.id)).await?;
    let mut draft = factory::new_listing(breed.id);
    draft.publish = false;
    factory::listing_with(env.db(), &breeder, draft).await?;

    let profile = users::breeder_profile(env.db(), breeder.id()).await?;
    assert_eq!(profile.kennel_name.as_deref(), Some("Happy Tails"));
    let ids: Vec<i64> = profile.listings.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![public.id]);

    let seeker = factory::seeker(env.db()).await?;
    let err = users::breeder_profile(env.db(), seeker.id()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::User, _)));
    Ok(())
}

#[tokio::test]
async fn admins_cannot_apply() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;
    let admin = factory::admin(env.db()).await?;

    let err = applications::submit(
        env.db(),
        &admin.user,
        NewApplication {
            listing_id: listing.id,
            message: "hello".to_string(),
            household: None,
            has_other_pets: false,
            preferred_sex: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_, _)));

    // Listing untouched
    let listing = listings::get_public(env.db(), listing.id).await?;
    assert_eq!(listing.available_count, 1);
    Ok(())
}
