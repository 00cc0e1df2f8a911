//! Dashboard aggregates computed from already-fetched rows.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::Serialize;

use crate::domain::money;
use crate::entities::applications::ApplicationStatus;
use crate::entities::listings::ListingStatus;
use crate::entities::payouts::PayoutStatus;
use crate::entities::transactions::TransactionStatus;
use crate::entities::users::UserRole;
use crate::repos::applications::Application;
use crate::repos::listings::Listing;
use crate::repos::payouts::Payout;
use crate::repos::transactions::Transaction;
use crate::repos::users::User;

/// Amounts in minor units, keyed by ISO currency.
pub type PerCurrency = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeekerDashboard {
    pub applications_by_status: HashMap<ApplicationStatus, u64>,
    pub open_applications: u64,
    pub total_paid: PerCurrency,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Revenue {
    pub gross: i64,
    pub commission: i64,
    pub net: i64,
    pub paid_out: i64,
    pub pending_payout: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreederDashboard {
    pub listings_by_status: HashMap<ListingStatus, u64>,
    pub units_available: i64,
    pub applications_awaiting_action: u64,
    pub revenue: BTreeMap<String, Revenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub users_by_role: HashMap<UserRole, u64>,
    pub listings_by_status: HashMap<ListingStatus, u64>,
    pub gross_merchandise_volume: PerCurrency,
    pub commission_earned: PerCurrency,
    pub pending_payouts: PerCurrency,
    pub failed_payments: u64,
}

fn count_by<T, K, F>(items: &[T], key: F) -> HashMap<K, u64>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

fn is_open(status: ApplicationStatus) -> bool {
    !matches!(
        status,
        ApplicationStatus::Completed | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
    )
}

fn successful(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Success)
}

pub fn seeker(applications: &[Application], transactions: &[Transaction]) -> SeekerDashboard {
    let mut total_paid = PerCurrency::new();
    for t in successful(transactions) {
        *total_paid.entry(t.currency.clone()).or_insert(0) += t.amount;
    }

    SeekerDashboard {
        applications_by_status: count_by(applications, |a| a.status),
        open_applications: applications.iter().filter(|a| is_open(a.status)).count() as u64,
        total_paid,
    }
}

/// Paid payouts report their own commission; money not yet paid out is
/// projected at `commission_bps`.
pub fn breeder(
    listings: &[Listing],
    applications: &[Application],
    transactions: &[Transaction],
    payouts: &[Payout],
    commission_bps: u32,
) -> BreederDashboard {
    let mut revenue: BTreeMap<String, Revenue> = BTreeMap::new();

    let mut pending_gross = PerCurrency::new();
    for t in successful(transactions) {
        revenue.entry(t.currency.clone()).or_default().gross += t.amount;
        let paid_out = t
            .payout_id
            .and_then(|id| payouts.iter().find(|p| p.id == id))
            .is_some_and(|p| p.status == PayoutStatus::Paid);
        if !paid_out {
            *pending_gross.entry(t.currency.clone()).or_insert(0) += t.amount;
        }
    }

    for p in payouts.iter().filter(|p| p.status == PayoutStatus::Paid) {
        let line = revenue.entry(p.currency.clone()).or_default();
        line.commission += p.commission_amount;
        line.paid_out += p.net_amount;
    }

    for (currency, gross) in pending_gross {
        let split = money::split(gross, commission_bps);
        let line = revenue.entry(currency).or_default();
        line.commission += split.commission;
        line.pending_payout += split.net;
    }

    for line in revenue.values_mut() {
        line.net = line.gross - line.commission;
    }

    BreederDashboard {
        listings_by_status: count_by(listings, |l| l.status),
        units_available: listings
            .iter()
            .filter(|l| l.is_public())
            .map(|l| i64::from(l.available_count))
            .sum(),
        applications_awaiting_action: applications
            .iter()
            .filter(|a| {
                matches!(
                    a.status,
                    ApplicationStatus::Submitted | ApplicationStatus::Pending
                )
            })
            .count() as u64,
        revenue,
    }
}

pub fn admin(
    users: &[User],
    listings: &[Listing],
    transactions: &[Transaction],
    payouts: &[Payout],
    commission_bps: u32,
) -> AdminDashboard {
    let mut gmv = PerCurrency::new();
    let mut unpaid = PerCurrency::new();
    for t in successful(transactions) {
        *gmv.entry(t.currency.clone()).or_insert(0) += t.amount;
        if t.payout_id.is_none() {
            *unpaid.entry(t.currency.clone()).or_insert(0) += t.amount;
        }
    }

    let mut commission_earned = PerCurrency::new();
    for p in payouts.iter().filter(|p| p.status == PayoutStatus::Paid) {
        *commission_earned.entry(p.currency.clone()).or_insert(0) += p.commission_amount;
    }

    let pending_payouts = unpaid
        .into_iter()
        .map(|(currency, gross)| (currency, money::split(gross, commission_bps).net))
        .collect();

    AdminDashboard {
        users_by_role: count_by(users, |u| u.role),
        listings_by_status: count_by(listings, |l| l.status),
        gross_merchandise_volume: gmv,
        commission_earned,
        pending_payouts,
        failed_payments: transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Failed)
            .count() as u64,
    }
}
