//! Error codes for the PawHaven API.
//!
//! Every machine-readable `code` that can appear in a problem-details body
//! is a variant here. Add new codes here; never pass ad-hoc strings.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & authorization
    Unauthorized,
    UnauthorizedMissingBearer,
    UnauthorizedInvalidJwt,
    UnauthorizedExpiredJwt,
    Forbidden,
    ForbiddenUserNotFound,
    /// Caller's role does not permit the operation
    InsufficientRole,
    /// Caller is not a party to the resource
    NotAParty,

    // Request validation
    InvalidEmail,
    InvalidGoogleSub,
    InvalidRole,
    InvalidPrice,
    InvalidCount,
    InvalidField,
    InvalidHeader,
    ValidationError,
    BadRequest,
    MissingPayoutRecipient,
    PaymentNotAllowed,

    // Not found
    NotFound,
    UserNotFound,
    BreedNotFound,
    ListingNotFound,
    ApplicationNotFound,
    TransactionNotFound,
    NotificationNotFound,

    // Conflicts
    GoogleSubMismatch,
    UniqueEmail,
    BreedNameTaken,
    BreedInUse,
    OptimisticLock,
    InvalidTransition,
    DuplicateApplication,
    ListingUnavailable,
    NothingToPayOut,
    UniqueViolation,
    Conflict,

    // Upstream
    PaymentGatewayError,

    // System
    DbError,
    DbUnavailable,
    DbTimeout,
    Internal,
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::Forbidden => "FORBIDDEN",
            Self::ForbiddenUserNotFound => "FORBIDDEN_USER_NOT_FOUND",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::NotAParty => "NOT_A_PARTY",

            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidGoogleSub => "INVALID_GOOGLE_SUB",
            Self::InvalidRole => "INVALID_ROLE",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidCount => "INVALID_COUNT",
            Self::InvalidField => "INVALID_FIELD",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::MissingPayoutRecipient => "MISSING_PAYOUT_RECIPIENT",
            Self::PaymentNotAllowed => "PAYMENT_NOT_ALLOWED",

            Self::NotFound => "NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::BreedNotFound => "BREED_NOT_FOUND",
            Self::ListingNotFound => "LISTING_NOT_FOUND",
            Self::ApplicationNotFound => "APPLICATION_NOT_FOUND",
            Self::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            Self::NotificationNotFound => "NOTIFICATION_NOT_FOUND",

            Self::GoogleSubMismatch => "GOOGLE_SUB_MISMATCH",
            Self::UniqueEmail => "UNIQUE_EMAIL",
            Self::BreedNameTaken => "BREED_NAME_TAKEN",
            Self::BreedInUse => "BREED_IN_USE",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::DuplicateApplication => "DUPLICATE_APPLICATION",
            Self::ListingUnavailable => "LISTING_UNAVAILABLE",
            Self::NothingToPayOut => "NOTHING_TO_PAY_OUT",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::Conflict => "CONFLICT",

            Self::PaymentGatewayError => "PAYMENT_GATEWAY_ERROR",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }

    /// All variants, for uniqueness checks.
    pub const ALL: &'static [ErrorCode] = &[
        Self::Unauthorized,
        Self::UnauthorizedMissingBearer,
        Self::UnauthorizedInvalidJwt,
        Self::UnauthorizedExpiredJwt,
        Self::Forbidden,
        Self::ForbiddenUserNotFound,
        Self::InsufficientRole,
        Self::NotAParty,
        Self::InvalidEmail,
        Self::InvalidGoogleSub,
        Self::InvalidRole,
        Self::InvalidPrice,
        Self::InvalidCount,
        Self::InvalidField,
        Self::InvalidHeader,
        Self::ValidationError,
        Self::BadRequest,
        Self::MissingPayoutRecipient,
        Self::PaymentNotAllowed,
        Self::NotFound,
        Self::UserNotFound,
        Self::BreedNotFound,
        Self::ListingNotFound,
        Self::ApplicationNotFound,
        Self::TransactionNotFound,
        Self::NotificationNotFound,
        Self::GoogleSubMismatch,
        Self::UniqueEmail,
        Self::BreedNameTaken,
        Self::BreedInUse,
        Self::OptimisticLock,
        Self::InvalidTransition,
        Self::DuplicateApplication,
        Self::ListingUnavailable,
        Self::NothingToPayOut,
        Self::UniqueViolation,
        Self::Conflict,
        Self::PaymentGatewayError,
        Self::DbError,
        Self::DbUnavailable,
        Self::DbTimeout,
        Self::Internal,
        Self::ConfigError,
    ];
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
