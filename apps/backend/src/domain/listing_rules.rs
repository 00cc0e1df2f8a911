//! Listing invariants and status rules.

use crate::entities::listings::{ListingKind, ListingStatus};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// The fields every listing must keep consistent, after a patch is applied.
#[derive(Debug, Clone, Copy)]
pub struct ListingShape<'a> {
    pub kind: ListingKind,
    pub title: &'a str,
    pub price: i64,
    pub reservation_fee: i64,
    pub total_count: i32,
    pub available_count: i32,
}

pub fn validate(shape: &ListingShape<'_>) -> Result<(), DomainError> {
    if shape.title.trim().is_empty() {
        return Err(DomainError::validation_other("Title must not be empty"));
    }
    if shape.price <= 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidPrice,
            "Price must be greater than zero",
        ));
    }
    if shape.reservation_fee < 0 || shape.reservation_fee > shape.price {
        return Err(DomainError::validation(
            ValidationKind::InvalidPrice,
            "Reservation fee must be between zero and the price",
        ));
    }
    if shape.total_count < 1 {
        return Err(DomainError::validation(
            ValidationKind::InvalidCount,
            "Total count must be at least 1",
        ));
    }
    if shape.kind == ListingKind::Individual && shape.total_count != 1 {
        return Err(DomainError::validation(
            ValidationKind::InvalidCount,
            "An individual listing has exactly one pet",
        ));
    }
    if shape.available_count < 0 || shape.available_count > shape.total_count {
        return Err(DomainError::validation(
            ValidationKind::InvalidCount,
            "Available count must be between zero and the total count",
        ));
    }
    Ok(())
}

pub fn ensure_publishable(status: ListingStatus) -> Result<(), DomainError> {
    match status {
        ListingStatus::Draft => Ok(()),
        other => Err(DomainError::conflict(
            ConflictKind::InvalidTransition,
            format!("Only draft listings can be published (listing is {other:?})"),
        )),
    }
}

pub fn ensure_archivable(status: ListingStatus) -> Result<(), DomainError> {
    match status {
        ListingStatus::Draft | ListingStatus::Active => Ok(()),
        other => Err(DomainError::conflict(
            ConflictKind::InvalidTransition,
            format!("Only draft or active listings can be archived (listing is {other:?})"),
        )),
    }
}

/// Details are editable until the listing is sold or archived.
pub fn ensure_editable(status: ListingStatus) -> Result<(), DomainError> {
    match status {
        ListingStatus::Sold | ListingStatus::Archived => Err(DomainError::conflict(
            ConflictKind::InvalidTransition,
            format!("A {status:?} listing can no longer be edited"),
        )),
        _ => Ok(()),
    }
}

/// Availability and status after one unit is reserved. Only an active
/// listing with a unit left can be reserved.
pub fn after_reservation(
    available_count: i32,
    status: ListingStatus,
) -> Result<(i32, ListingStatus), DomainError> {
    if status != ListingStatus::Active {
        return Err(DomainError::conflict(
            ConflictKind::ListingUnavailable,
            format!("A {status:?} listing cannot be reserved"),
        ));
    }
    if available_count <= 0 {
        return Err(DomainError::conflict(
            ConflictKind::ListingUnavailable,
            "No units left on this listing",
        ));
    }
    let remaining = available_count - 1;
    Ok((remaining, status_for_availability(status, remaining)))
}

/// Units already claimed by applications cannot be offered again.
pub fn ensure_within_capacity(
    total_count: i32,
    available_count: i32,
    claimed: u64,
) -> Result<(), DomainError> {
    let free = i64::from(total_count) - i64::try_from(claimed).unwrap_or(i64::MAX);
    if i64::from(available_count) > free {
        return Err(DomainError::validation(
            ValidationKind::InvalidCount,
            format!(
                "Available count {available_count} exceeds the {} unit(s) not yet claimed",
                free.max(0)
            ),
        ));
    }
    Ok(())
}

/// `active` and `reserved` follow availability; other statuses are kept.
pub fn status_for_availability(status: ListingStatus, available_count: i32) -> ListingStatus {
    match status {
        ListingStatus::Active if available_count == 0 => ListingStatus::Reserved,
        ListingStatus::Reserved if available_count > 0 => ListingStatus::Active,
        other => other,
    }
}

/// Status after a handover completes; `None` leaves it unchanged.
pub fn after_completion(available_count: i32, other_holding: u64) -> Option<ListingStatus> {
    (available_count == 0 && other_holding == 0).then_some(ListingStatus::Sold)
}
