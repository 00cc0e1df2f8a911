//! Application lifecycle: the transition table and who may drive each edge.
//!
//! ```text
//! submitted -> pending -> approved -> reserved -> contract_signed -> paid -> completed
//!      \__________\___________\______ rejected | withdrawn
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::application_events::ActorRole;
use crate::entities::applications::ApplicationStatus;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Review,
    Approve,
    Reject,
    Withdraw,
    /// Seeker-side reservation of a listing without a reservation fee
    Reserve,
    ReservationPaid,
    SignContract,
    FinalPaid,
    Complete,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Withdraw => "withdraw",
            Self::Reserve => "reserve",
            Self::ReservationPaid => "reservation_paid",
            Self::SignContract => "sign_contract",
            Self::FinalPaid => "final_paid",
            Self::Complete => "complete",
        }
    }

    /// Actions a user may request over HTTP; payment-driven ones are not.
    pub const fn is_user_action(self) -> bool {
        !matches!(self, Self::ReservationPaid | Self::FinalPaid)
    }

    fn allowed_actors(self) -> &'static [ActorRole] {
        use ActorRole::*;
        match self {
            Self::Review | Self::Approve => &[Breeder],
            Self::Reject | Self::Complete => &[Breeder, Admin],
            Self::Withdraw | Self::Reserve | Self::SignContract => &[Seeker],
            Self::ReservationPaid | Self::FinalPaid => &[System],
        }
    }

    fn edges(self) -> (&'static [ApplicationStatus], ApplicationStatus) {
        use ApplicationStatus::*;
        match self {
            Self::Review => (&[Submitted], Pending),
            Self::Approve => (&[Submitted, Pending], Approved),
            Self::Reject => (&[Submitted, Pending, Approved], Rejected),
            Self::Withdraw => (&[Submitted, Pending, Approved], Withdrawn),
            Self::Reserve | Self::ReservationPaid => (&[Approved], Reserved),
            Self::SignContract => (&[Reserved], ContractSigned),
            Self::FinalPaid => (&[ContractSigned], Paid),
            Self::Complete => (&[Paid], Completed),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(Self::Review),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "withdraw" => Ok(Self::Withdraw),
            "reserve" => Ok(Self::Reserve),
            "sign_contract" => Ok(Self::SignContract),
            "complete" => Ok(Self::Complete),
            other => Err(DomainError::validation_other(format!(
                "Unknown application action '{other}'"
            ))),
        }
    }
}

/// Facts about the listing that gate some edges.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    pub reservation_fee: i64,
}

/// Target status for `action` from `from` by `actor`.
///
/// Actor is checked before the source status: a wrong actor is forbidden
/// even when the edge would also be invalid.
pub fn transition(
    from: ApplicationStatus,
    action: Action,
    actor: ActorRole,
    ctx: TransitionContext,
) -> Result<ApplicationStatus, DomainError> {
    if !action.allowed_actors().contains(&actor) {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            format!("{actor:?} may not {action} an application"),
        ));
    }

    let (sources, to) = action.edges();
    if !sources.contains(&from) {
        return Err(DomainError::conflict(
            ConflictKind::InvalidTransition,
            format!("Cannot {action} an application that is {}", status_str(from)),
        ));
    }

    match action {
        Action::Reserve if ctx.reservation_fee > 0 => Err(DomainError::validation(
            ValidationKind::PaymentNotAllowed,
            "This listing requires a reservation fee; pay it to reserve",
        )),
        Action::ReservationPaid if ctx.reservation_fee == 0 => Err(DomainError::validation(
            ValidationKind::PaymentNotAllowed,
            "This listing has no reservation fee",
        )),
        _ => Ok(to),
    }
}

/// Breeder decisions stamp `decided_at`.
pub fn is_decision(to: ApplicationStatus) -> bool {
    matches!(to, ApplicationStatus::Approved | ApplicationStatus::Rejected)
}

/// No further transitions possible.
pub fn is_terminal(status: ApplicationStatus) -> bool {
    matches!(
        status,
        ApplicationStatus::Completed | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
    )
}

pub fn status_str(status: ApplicationStatus) -> &'static str {
    use ApplicationStatus::*;
    match status {
        Submitted => "submitted",
        Pending => "pending",
        Approved => "approved",
        Reserved => "reserved",
        ContractSigned => "contract_signed",
        Paid => "paid",
        Completed => "completed",
        Rejected => "rejected",
        Withdrawn => "withdrawn",
    }
}
