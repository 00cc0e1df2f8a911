//! DTOs for users_sea adapter.

use crate::entities::users::UserRole;

#[derive(Debug, Clone)]
pub struct UserCreate {
    pub sub: String,
    pub username: Option<String>,
    pub role: UserRole,
}

impl UserCreate {
    pub fn new(sub: impl Into<String>, username: Option<String>, role: UserRole) -> Self {
        Self {
            sub: sub.into(),
            username,
            role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialsCreate {
    pub user_id: i64,
    pub email: String,
    pub google_sub: Option<String>,
}

impl CredentialsCreate {
    pub fn new(user_id: i64, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            google_sub: None,
        }
    }

    pub fn with_google_sub(mut self, google_sub: impl Into<String>) -> Self {
        self.google_sub = Some(google_sub.into());
        self
    }
}

/// Profile patch. Outer `None` leaves a column alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub kennel_name: Option<Option<String>>,
    pub payout_recipient_code: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.phone.is_none()
            && self.kennel_name.is_none()
            && self.payout_recipient_code.is_none()
    }
}
