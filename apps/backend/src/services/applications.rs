//! Adoption applications: submission, lifecycle transitions and reads.

use sea_orm::ConnectionTrait;
use tracing::info;

use crate::adapters::applications_sea::{ApplicationCreate, EventCreate};
use crate::domain::application_lifecycle::{self, Action, TransitionContext};
use crate::domain::listing_rules;
use crate::entities::application_events::ActorRole;
use crate::entities::applications::ApplicationStatus;
use crate::entities::listings::{ListingStatus, PetSex};
use crate::entities::notifications::NotificationKind;
use crate::entities::users::UserRole;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind};
use crate::repos::applications::{self, Application, ApplicationEvent};
use crate::repos::listings::{self, Listing};
use crate::repos::users::User;
use crate::services::notifications::{application_link, notify};
use crate::services::payments::close_checkouts;

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub listing_id: i64,
    pub message: String,
    pub household: Option<String>,
    pub has_other_pets: bool,
    pub preferred_sex: Option<PetSex>,
}

/// Who performs a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Option<i64>,
    pub role: ActorRole,
}

impl Actor {
    pub const SYSTEM: Actor = Actor {
        id: None,
        role: ActorRole::System,
    };
}

/// The caller's role on this particular application.
pub fn actor_for(user: &User, application: &Application, listing: &Listing) -> Result<Actor, DomainError> {
    let role = if user.id == application.seeker_id {
        ActorRole::Seeker
    } else if user.id == listing.breeder_id {
        ActorRole::Breeder
    } else if user.role == UserRole::Admin {
        ActorRole::Admin
    } else {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            "You are not a party to this application",
        ));
    };
    Ok(Actor {
        id: Some(user.id),
        role,
    })
}

pub async fn submit<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker: &User,
    input: NewApplication,
) -> Result<Application, DomainError> {
    if seeker.role == UserRole::Admin {
        return Err(DomainError::forbidden(
            ForbiddenKind::InsufficientRole,
            "Admins cannot apply for listings",
        ));
    }
    let message = input.message.trim().to_string();
    if message.is_empty() {
        return Err(DomainError::validation_other("Message must not be empty"));
    }

    let listing = listings::require(conn, input.listing_id).await?;
    if listing.breeder_id == seeker.id {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            "Breeders cannot apply to their own listings",
        ));
    }
    if listing.status != ListingStatus::Active || listing.available_count <= 0 {
        return Err(DomainError::conflict(
            ConflictKind::ListingUnavailable,
            "This listing is not accepting applications",
        ));
    }
    if let Some(open) = applications::find_open(conn, seeker.id, listing.id).await? {
        return Err(DomainError::conflict(
            ConflictKind::DuplicateApplication,
            format!("You already have an open application ({}) on this listing", open.id),
        ));
    }

    let application = applications::create(
        conn,
        ApplicationCreate {
            listing_id: listing.id,
            seeker_id: seeker.id,
            message,
            household: input.household,
            has_other_pets: input.has_other_pets,
            preferred_sex: input.preferred_sex,
        },
    )
    .await?;

    applications::insert_event(
        conn,
        EventCreate {
            application_id: application.id,
            from_status: None,
            to_status: ApplicationStatus::Submitted,
            actor_id: Some(seeker.id),
            actor_role: ActorRole::Seeker,
            note: None,
        },
    )
    .await?;

    notify(
        conn,
        listing.breeder_id,
        NotificationKind::ApplicationSubmitted,
        "New application",
        format!("You received a new application for \"{}\"", listing.title),
        application_link(application.id),
    )
    .await?;

    info!(
        application_id = application.id,
        listing_id = listing.id,
        seeker_id = seeker.id,
        "Application submitted"
    );
    Ok(application)
}

/// Load an application the caller is a party to, with its listing.
pub async fn load_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    id: i64,
) -> Result<(Application, Listing, Actor), DomainError> {
    let application = applications::require(conn, id).await?;
    let listing = listings::require(conn, application.listing_id).await?;
    let actor = actor_for(user, &application, &listing)?;
    Ok((application, listing, actor))
}

pub async fn get<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    id: i64,
) -> Result<Application, DomainError> {
    Ok(load_for(conn, user, id).await?.0)
}

pub async fn events<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    id: i64,
) -> Result<Vec<ApplicationEvent>, DomainError> {
    load_for(conn, user, id).await?;
    applications::list_events(conn, id).await
}

pub async fn list_mine<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seeker_id: i64,
) -> Result<Vec<Application>, DomainError> {
    applications::list_by_seeker(conn, seeker_id).await
}

pub async fn list_for_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    status: Option<ApplicationStatus>,
) -> Result<Vec<Application>, DomainError> {
    applications::list_for_breeder(conn, breeder_id, status).await
}

/// A user-requested transition (`review`, `approve`, `withdraw`, ...).
pub async fn act<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    id: i64,
    action: Action,
    expected_version: Option<i32>,
    note: Option<String>,
) -> Result<Application, DomainError> {
    if !action.is_user_action() {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            format!("'{action}' is performed by the payment system"),
        ));
    }
    let (application, listing, actor) = load_for(conn, user, id).await?;
    apply_transition(conn, application, listing, action, actor, expected_version, note).await
}

/// Validate and persist one transition with its side effects on the
/// listing, open checkouts and the counterpart's inbox.
pub async fn apply_transition<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application: Application,
    listing: Listing,
    action: Action,
    actor: Actor,
    expected_version: Option<i32>,
    note: Option<String>,
) -> Result<Application, DomainError> {
    let from = application.status;
    let to = application_lifecycle::transition(
        from,
        action,
        actor.role,
        TransitionContext {
            reservation_fee: listing.reservation_fee,
        },
    )?;

    // Computed before any write so an unavailable listing leaves nothing behind
    let reservation = if to == ApplicationStatus::Reserved {
        Some(listing_rules::after_reservation(listing.available_count, listing.status)?)
    } else {
        None
    };

    let version = expected_version.unwrap_or(application.lock_version);
    let updated = applications::set_status(
        conn,
        application.id,
        version,
        to,
        application_lifecycle::is_decision(to),
    )
    .await?;

    applications::insert_event(
        conn,
        EventCreate {
            application_id: updated.id,
            from_status: Some(from),
            to_status: to,
            actor_id: actor.id,
            actor_role: actor.role,
            note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        },
    )
    .await?;

    if matches!(to, ApplicationStatus::Withdrawn | ApplicationStatus::Rejected) {
        close_checkouts(conn, updated.id).await?;
    }

    if let Some((available, status)) = reservation {
        listings::set_availability(conn, &listing, available, status).await?;
    } else if to == ApplicationStatus::Completed {
        let holding = applications::count_holding(conn, listing.id, updated.id).await?;
        if let Some(status) = listing_rules::after_completion(listing.available_count, holding) {
            listings::set_status(conn, &listing, status).await?;
            info!(listing_id = listing.id, "Listing sold out");
        }
    }

    let to_str = application_lifecycle::status_str(to);
    let recipients = match actor.role {
        ActorRole::Seeker => vec![listing.breeder_id],
        ActorRole::Breeder => vec![updated.seeker_id],
        ActorRole::Admin => vec![updated.seeker_id, listing.breeder_id],
        // Payment outcomes notify on their own
        ActorRole::System => Vec::new(),
    };
    for user_id in recipients {
        notify(
            conn,
            user_id,
            NotificationKind::ApplicationStatusChanged,
            "Application updated",
            format!("Application for \"{}\" is now {to_str}", listing.title),
            application_link(updated.id),
        )
        .await?;
    }

    info!(
        application_id = updated.id,
        from = application_lifecycle::status_str(from),
        to = to_str,
        actor_role = ?actor.role,
        "Application transition"
    );
    Ok(updated)
}
