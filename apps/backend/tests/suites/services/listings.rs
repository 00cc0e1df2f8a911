use pawhaven_backend::adapters::listings_sea::{ListingQuery, ListingUpdate};
use pawhaven_backend::domain::Action;
use pawhaven_backend::entities::listings::{ListingKind, ListingStatus};
use pawhaven_backend::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, NotFoundKind, ValidationKind,
};
use pawhaven_backend::services::listings::{self, NewListing};
use pawhaven_backend::AppError;

use crate::support::build_test_env;
use crate::support::factory;

fn litter(breed_id: i64, total: i32) -> NewListing {
    NewListing {
        kind: ListingKind::Litter,
        title: "Golden litter".to_string(),
        total_count: Some(total),
        ..factory::new_listing(breed_id)
    }
}

#[tokio::test]
async fn create_applies_defaults() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;

    let listing = factory::listing(env.db(), &breeder).await?;
    assert_eq!(listing.breeder_id, breeder.id());
    assert_eq!(listing.status, ListingStatus::Active);
    assert_eq!(listing.total_count, 1);
    assert_eq!(listing.available_count, 1);
    assert_eq!(listing.currency, "NGN");
    assert_eq!(listing.lock_version, 1);
    assert!(listing.published_at.is_some());
    assert_eq!(listing.final_amount(), 90_000);
    Ok(())
}

#[tokio::test]
async fn drafts_are_hidden_until_published() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;

    let mut input = factory::new_listing(breed.id);
    input.publish = false;
    input.currency = Some("usd".to_string());
    let draft = factory::listing_with(env.db(), &breeder, input).await?;
    assert_eq!(draft.status, ListingStatus::Draft);
    assert_eq!(draft.currency, "USD");
    assert!(draft.published_at.is_none());

    let err = listings::get_public(env.db(), draft.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Listing, _)));

    let published = listings::publish(env.db(), breeder.id(), draft.id).await?;
    assert_eq!(published.status, ListingStatus::Active);
    assert!(published.published_at.is_some());
    assert_eq!(published.lock_version, draft.lock_version + 1);
    assert_eq!(listings::get_public(env.db(), draft.id).await?.id, draft.id);

    let err = listings::publish(env.db(), breeder.id(), draft.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::InvalidTransition, _)));
    Ok(())
}

#[tokio::test]
async fn create_validates_shape() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;

    let mut two_of_one = factory::new_listing(breed.id);
    two_of_one.total_count = Some(2);
    let err = listings::create(env.db(), &breeder.user, two_of_one, "NGN")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidCount, _)));

    let mut fee_over_price = factory::new_listing(breed.id);
    fee_over_price.reservation_fee = fee_over_price.price + 1;
    let err = listings::create(env.db(), &breeder.user, fee_over_price, "NGN")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidPrice, _)));

    let mut bad_currency = factory::new_listing(breed.id);
    bad_currency.currency = Some("naira".to_string());
    assert!(listings::create(env.db(), &breeder.user, bad_currency, "NGN")
        .await
        .is_err());

    let err = listings::create(env.db(), &breeder.user, factory::new_listing(breed.id + 1000), "NGN")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Breed, _)));
    Ok(())
}

#[tokio::test]
async fn update_checks_owner_and_version() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let other = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;

    let patch = ListingUpdate {
        title: Some("  Golden boy ".to_string()),
        ..ListingUpdate::default()
    };

    let err = listings::update(env.db(), other.id(), listing.id, None, patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(ForbiddenKind::NotAParty, _)));

    let updated = listings::update(
        env.db(),
        breeder.id(),
        listing.id,
        Some(listing.lock_version),
        patch.clone(),
    )
    .await?;
    assert_eq!(updated.title, "Golden boy");
    assert_eq!(updated.lock_version, listing.lock_version + 1);

    let err = listings::update(
        env.db(),
        breeder.id(),
        listing.id,
        Some(listing.lock_version),
        patch,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::OptimisticLock, _)));
    Ok(())
}

#[tokio::test]
async fn total_count_change_shifts_availability() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;
    let listing = factory::listing_with(env.db(), &breeder, litter(breed.id, 5)).await?;

    let grown = listings::update(
        env.db(),
        breeder.id(),
        listing.id,
        None,
        ListingUpdate {
            total_count: Some(7),
            ..ListingUpdate::default()
        },
    )
    .await?;
    assert_eq!(grown.total_count, 7);
    assert_eq!(grown.available_count, 7);

    let err = listings::update(
        env.db(),
        breeder.id(),
        listing.id,
        None,
        ListingUpdate {
            available_count: Some(8),
            ..ListingUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidCount, _)));
    Ok(())
}

#[tokio::test]
async fn availability_cannot_reoffer_claimed_units() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;
    let input = NewListing {
        reservation_fee: 0,
        ..litter(breed.id, 2)
    };
    let listing = factory::listing_with(env.db(), &breeder, input).await?;

    let first = factory::seeker(env.db()).await?;
    let app = factory::approved_application(env.db(), &first, &breeder, listing.id).await?;
    factory::act(env.db(), &first, app.id, Action::Reserve).await?;

    let patch = |available: i32| ListingUpdate {
        available_count: Some(available),
        ..ListingUpdate::default()
    };

    let err = listings::update(env.db(), breeder.id(), listing.id, None, patch(2))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidCount, _)));

    let grown = listings::update(
        env.db(),
        breeder.id(),
        listing.id,
        None,
        ListingUpdate {
            total_count: Some(3),
            ..ListingUpdate::default()
        },
    )
    .await?;
    assert_eq!(grown.available_count, 2);
    assert_eq!(grown.status, ListingStatus::Active);

    let held_back = listings::update(env.db(), breeder.id(), listing.id, None, patch(0)).await?;
    assert_eq!(held_back.status, ListingStatus::Reserved);

    let second = factory::seeker(env.db()).await?;
    let err = factory::submit(env.db(), &second, listing.id).await.unwrap_err();
    assert_eq!(err.code().as_str(), "LISTING_UNAVAILABLE");

    let reopened = listings::update(env.db(), breeder.id(), listing.id, None, patch(1)).await?;
    assert_eq!(reopened.status, ListingStatus::Active);
    assert_eq!(reopened.available_count, 1);
    Ok(())
}

#[tokio::test]
async fn archived_listings_are_frozen() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;

    let archived = listings::archive(env.db(), breeder.id(), listing.id).await?;
    assert_eq!(archived.status, ListingStatus::Archived);

    let err = listings::update(
        env.db(),
        breeder.id(),
        listing.id,
        None,
        ListingUpdate {
            price: Some(1),
            ..ListingUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::InvalidTransition, _)));

    let err = listings::get_public(env.db(), listing.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_, _)));

    let mine = listings::list_for_breeder(env.db(), breeder.id()).await?;
    assert_eq!(mine.len(), 1, "owners still see archived listings");
    Ok(())
}

#[tokio::test]
async fn public_search_filters_and_pages() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let breed = factory::breed(env.db()).await?;

    for (title, price) in [("Calm beagle", 50_000), ("Calm poodle", 150_000), ("Lively corgi", 90_000)] {
        let input = NewListing {
            title: title.to_string(),
            price,
            reservation_fee: 0,
            ..factory::new_listing(breed.id)
        };
        factory::listing_with(env.db(), &breeder, input).await?;
    }
    let mut hidden = factory::new_listing(breed.id);
    hidden.title = "Calm draft".to_string();
    hidden.publish = false;
    factory::listing_with(env.db(), &breeder, hidden).await?;

    let calm = listings::list_public(
        env.db(),
        ListingQuery {
            breed_id: Some(breed.id),
            q: Some("CALM".to_string()),
            ..ListingQuery::default()
        },
    )
    .await?;
    assert_eq!(calm.total, 2);

    let cheap_calm = listings::list_public(
        env.db(),
        ListingQuery {
            breed_id: Some(breed.id),
            q: Some("calm".to_string()),
            max_price: Some(100_000),
            ..ListingQuery::default()
        },
    )
    .await?;
    assert_eq!(cheap_calm.total, 1);
    assert_eq!(cheap_calm.items[0].title, "Calm beagle");

    let page_two = listings::list_public(
        env.db(),
        ListingQuery {
            breed_id: Some(breed.id),
            page: 2,
            per_page: 2,
            ..ListingQuery::default()
        },
    )
    .await?;
    assert_eq!(page_two.total, 3);
    assert_eq!(page_two.items.len(), 1);
    assert_eq!(page_two.page, 2);

    let err = listings::list_public(
        env.db(),
        ListingQuery {
            min_price: Some(10),
            max_price: Some(5),
            ..ListingQuery::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_, _)));
    Ok(())
}
