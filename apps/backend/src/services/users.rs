//! Login ("ensure user"), profiles and role upgrades.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::adapters::users_sea::{CredentialsCreate, ProfileUpdate, UserCreate};
use crate::config::admin_allowlist::normalize_email;
use crate::entities::listings::ListingStatus;
use crate::entities::users::UserRole;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::logging::pii::Redacted;
use crate::repos::listings::{self, Listing};
use crate::repos::users::{self, User};

/// Login payload after the route has parsed it.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub name: Option<String>,
    pub google_sub: String,
    /// Asked to sign up as a breeder
    pub as_breeder: bool,
    /// E-mail matched the admin allowlist
    pub is_admin: bool,
}

/// Public breeder page: no contact or payout data.
#[derive(Debug, Clone, Serialize)]
pub struct BreederProfile {
    pub id: i64,
    pub username: Option<String>,
    pub kennel_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
    pub listings: Vec<Listing>,
}

/// Shows the first 4 characters only.
fn redact_google_sub(google_sub: &str) -> String {
    match google_sub.char_indices().nth(4) {
        Some((idx, _)) => format!("{}***", &google_sub[..idx]),
        None => "*".repeat(google_sub.chars().count()),
    }
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidEmail,
            "A valid e-mail address is required",
        ))
    }
}

/// Derives a username from the provided name or the e-mail local-part.
fn derive_username(name: Option<&str>, email: &str) -> Option<String> {
    if let Some(clean) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return Some(clean.to_string());
    }
    email
        .split_once('@')
        .map(|(local, _)| local)
        .filter(|local| !local.is_empty())
        .map(str::to_string)
}

fn initial_role(input: &LoginInput) -> UserRole {
    if input.is_admin {
        UserRole::Admin
    } else if input.as_breeder {
        UserRole::Breeder
    } else {
        UserRole::Seeker
    }
}

/// Find or create the user behind a Google login. Idempotent per e-mail.
///
/// An existing e-mail linked to another `google_sub` is a conflict. Admin
/// allowlist matches are promoted on every login.
pub async fn ensure_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    input: LoginInput,
) -> Result<User, DomainError> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    let google_sub = input.google_sub.trim().to_string();
    if google_sub.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidGoogleSub,
            "google_sub must not be empty",
        ));
    }

    match users::find_credentials_by_email(conn, &email).await? {
        Some(credentials) => {
            if let Some(existing) = credentials.google_sub.as_deref() {
                if existing != google_sub {
                    warn!(
                        user_id = credentials.user_id,
                        email = %Redacted(&email),
                        incoming_google_sub = %redact_google_sub(&google_sub),
                        existing_google_sub = %redact_google_sub(existing),
                        "Google sub mismatch detected"
                    );
                    return Err(DomainError::conflict(
                        ConflictKind::GoogleSubMismatch,
                        "This email is already linked to a different Google account",
                    ));
                }
            }

            let link = credentials.google_sub.is_none().then(|| google_sub.clone());
            if link.is_some() {
                info!(
                    user_id = credentials.user_id,
                    google_sub = %redact_google_sub(&google_sub),
                    "Linking google_sub to existing credentials"
                );
            }
            users::record_login(conn, credentials.id, link).await?;

            let mut user = users::find_user_by_id(conn, credentials.user_id)
                .await?
                .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "User not found"))?;

            if input.is_admin && user.role != UserRole::Admin {
                info!(user_id = user.id, "Promoting allowlisted user to admin");
                user = users::set_role(conn, user.id, UserRole::Admin).await?;
            }

            debug!(user_id = user.id, email = %Redacted(&email), "Repeat login");
            Ok(user)
        }
        None => {
            let role = initial_role(&input);
            let username = derive_username(input.name.as_deref(), &email);
            let user = users::create_user(conn, UserCreate::new(google_sub.clone(), username, role)).await?;
            let credentials = users::create_credentials(
                conn,
                CredentialsCreate::new(user.id, email.clone()).with_google_sub(google_sub.clone()),
            )
            .await?;
            users::record_login(conn, credentials.id, None).await?;

            info!(
                user_id = user.id,
                role = ?role,
                email = %Redacted(&email),
                google_sub = %redact_google_sub(&google_sub),
                "First user creation"
            );
            Ok(user)
        }
    }
}

pub async fn email_of<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<String, DomainError> {
    users::find_credentials_by_user_id(conn, user_id)
        .await?
        .map(|c| c.email)
        .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "User has no credentials"))
}

fn clean(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(|inner| {
        inner
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Apply a profile patch. Kennel and payout fields are breeder-only.
pub async fn update_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    patch: ProfileUpdate,
) -> Result<User, DomainError> {
    let patch = ProfileUpdate {
        username: clean(patch.username),
        bio: clean(patch.bio),
        location: clean(patch.location),
        phone: clean(patch.phone),
        kennel_name: clean(patch.kennel_name),
        payout_recipient_code: clean(patch.payout_recipient_code),
    };

    let breeder_fields = patch.kennel_name.is_some() || patch.payout_recipient_code.is_some();
    if breeder_fields && user.role != UserRole::Breeder {
        return Err(DomainError::validation(
            ValidationKind::InvalidRole,
            "kennel_name and payout_recipient_code are only available to breeders",
        ));
    }
    if patch.is_empty() {
        return Ok(user.clone());
    }

    users::update_profile(conn, user.id, patch).await
}

/// Seeker → breeder. Already a breeder is a no-op.
pub async fn become_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
) -> Result<User, DomainError> {
    match user.role {
        UserRole::Breeder => Ok(user.clone()),
        UserRole::Seeker => {
            info!(user_id = user.id, "Seeker upgraded to breeder");
            users::set_role(conn, user.id, UserRole::Breeder).await
        }
        UserRole::Admin => Err(DomainError::validation(
            ValidationKind::InvalidRole,
            "Admins cannot become breeders",
        )),
    }
}

pub async fn breeder_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<BreederProfile, DomainError> {
    let not_found = || DomainError::not_found(NotFoundKind::User, format!("Breeder {breeder_id} not found"));
    let breeder = users::find_user_by_id(conn, breeder_id)
        .await?
        .filter(User::is_breeder)
        .ok_or_else(not_found)?;

    let listings = listings::list_by_breeder(conn, breeder.id)
        .await?
        .into_iter()
        .filter(|l| matches!(l.status, ListingStatus::Active | ListingStatus::Reserved))
        .collect();

    Ok(BreederProfile {
        id: breeder.id,
        username: breeder.username,
        kennel_name: breeder.kennel_name,
        bio: breeder.bio,
        location: breeder.location,
        member_since: breeder.created_at,
        listings,
    })
}
