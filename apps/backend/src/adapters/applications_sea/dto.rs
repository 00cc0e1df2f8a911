//! DTOs for applications_sea adapter.

use crate::entities::application_events::ActorRole;
use crate::entities::applications::ApplicationStatus;
use crate::entities::listings::PetSex;

#[derive(Debug, Clone)]
pub struct ApplicationCreate {
    pub listing_id: i64,
    pub seeker_id: i64,
    pub message: String,
    pub household: Option<String>,
    pub has_other_pets: bool,
    pub preferred_sex: Option<PetSex>,
}

#[derive(Debug, Clone)]
pub struct EventCreate {
    pub application_id: i64,
    pub from_status: Option<ApplicationStatus>,
    pub to_status: ApplicationStatus,
    pub actor_id: Option<i64>,
    pub actor_role: ActorRole,
    pub note: Option<String>,
}
