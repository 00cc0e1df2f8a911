use actix_web::http::StatusCode;

use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn validation_maps_to_422_with_specific_code() {
    let app: AppError = DomainError::validation(
        ValidationKind::MissingPayoutRecipient,
        "breeder has no payout recipient",
    )
    .into();
    assert_eq!(app.code(), ErrorCode::MissingPayoutRecipient);
    assert_eq!(app.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let app: AppError = DomainError::validation_other("bad field").into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn conflicts_keep_their_codes() {
    let cases = [
        (ConflictKind::InvalidTransition, "INVALID_TRANSITION"),
        (ConflictKind::BreedInUse, "BREED_IN_USE"),
        (ConflictKind::DuplicateApplication, "DUPLICATE_APPLICATION"),
        (ConflictKind::NothingToPayOut, "NOTHING_TO_PAY_OUT"),
        (ConflictKind::Other("Unique".into()), "UNIQUE_VIOLATION"),
        (ConflictKind::Other("whatever".into()), "CONFLICT"),
    ];
    for (kind, expected) in cases {
        let app: AppError = DomainError::conflict(kind, "x").into();
        assert_eq!(app.code().as_str(), expected);
        assert_eq!(app.status(), StatusCode::CONFLICT);
    }
}

#[test]
fn not_found_and_forbidden() {
    let app: AppError = DomainError::not_found(NotFoundKind::Listing, "no listing").into();
    assert_eq!(app.code(), ErrorCode::ListingNotFound);
    assert_eq!(app.status(), StatusCode::NOT_FOUND);

    let app: AppError = DomainError::forbidden(ForbiddenKind::NotAParty, "nope").into();
    assert_eq!(app.code(), ErrorCode::NotAParty);
    assert_eq!(app.status(), StatusCode::FORBIDDEN);
}

#[test]
fn infra_kinds() {
    let app: AppError = DomainError::infra(InfraErrorKind::DbUnavailable, "down").into();
    assert!(matches!(app, AppError::DbUnavailable));
    assert_eq!(app.status(), StatusCode::SERVICE_UNAVAILABLE);

    let app: AppError = DomainError::infra(InfraErrorKind::Timeout, "slow").into();
    assert_eq!(app.code(), ErrorCode::DbTimeout);
    assert_eq!(app.status(), StatusCode::GATEWAY_TIMEOUT);

    let app: AppError = DomainError::infra(InfraErrorKind::Other("x".into()), "boom").into();
    assert_eq!(app.code(), ErrorCode::DbError);
}

#[test]
fn optimistic_lock_payload_becomes_conflict() {
    let err = sea_orm::DbErr::Custom(r#"OPTIMISTIC_LOCK:{"expected":1,"actual":3}"#.into());
    let app: AppError = err.into();
    assert_eq!(app.code(), ErrorCode::OptimisticLock);
    assert!(app.to_string().contains("expected version 1"));
}
