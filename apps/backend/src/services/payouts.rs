//! Breeder payouts: commission split, transfer, and release on failure.

use std::collections::BTreeMap;

use actix_web::HttpRequest;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::adapters::payouts_sea::PayoutCreate;
use crate::db::txn::with_txn;
use crate::domain::money;
use crate::entities::notifications::NotificationKind;
use crate::entities::payouts::PayoutStatus;
use crate::entities::users::UserRole;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::payments::{
    new_transfer_reference, GatewayError, TransferRequest, TransferResponse, TransferStatus,
};
use crate::repos::payouts::{self, Payout};
use crate::repos::transactions;
use crate::repos::users::{self, User};
use crate::services::notifications::notify;
use crate::state::app_state::AppState;

/// Balance owed to one breeder in one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutPreview {
    pub breeder_id: i64,
    pub kennel_name: Option<String>,
    pub currency: String,
    pub transaction_count: usize,
    pub gross: i64,
    pub commission: i64,
    pub net: i64,
    pub commission_bps: u32,
    /// Breeder has a payout recipient on file
    pub recipient_ready: bool,
}

/// Pending balances per breeder and currency.
pub async fn preview<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    commission_bps: u32,
) -> Result<Vec<PayoutPreview>, DomainError> {
    let mut groups: BTreeMap<(i64, String), (usize, i64)> = BTreeMap::new();
    for tx in transactions::list_unpaid_out(conn, None, None).await? {
        let entry = groups.entry((tx.breeder_id, tx.currency)).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += tx.amount;
    }

    let mut previews = Vec::with_capacity(groups.len());
    for ((breeder_id, currency), (count, gross)) in groups {
        let breeder = users::find_user_by_id(conn, breeder_id).await?;
        let split = money::split(gross, commission_bps);
        previews.push(PayoutPreview {
            breeder_id,
            kennel_name: breeder.as_ref().and_then(|b| b.kennel_name.clone()),
            currency,
            transaction_count: count,
            gross: split.gross,
            commission: split.commission,
            net: split.net,
            commission_bps,
            recipient_ready: breeder
                .as_ref()
                .is_some_and(|b| b.payout_recipient_code.is_some()),
        });
    }
    Ok(previews)
}

/// Payout row in `processing`, with the transfer it still needs.
struct Opened {
    payout: Payout,
    recipient_code: String,
}

async fn open_payout<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    admin_id: i64,
    breeder_id: i64,
    currency: &str,
    commission_bps: u32,
) -> Result<Opened, DomainError> {
    let breeder = users::find_user_by_id(conn, breeder_id)
        .await?
        .filter(|u| u.role == UserRole::Breeder)
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::User, format!("Breeder {breeder_id} not found"))
        })?;
    let recipient_code = breeder.payout_recipient_code.clone().ok_or_else(|| {
        DomainError::validation(
            ValidationKind::MissingPayoutRecipient,
            "Breeder has no payout recipient on file",
        )
    })?;

    let pending = transactions::list_unpaid_out(conn, Some(breeder_id), Some(currency)).await?;
    if pending.is_empty() {
        return Err(DomainError::conflict(
            ConflictKind::NothingToPayOut,
            format!("No unpaid {currency} balance for breeder {breeder_id}"),
        ));
    }

    let gross: i64 = pending.iter().map(|t| t.amount).sum();
    let split = money::split(gross, commission_bps);
    let payout = payouts::create(
        conn,
        PayoutCreate {
            breeder_id,
            currency: currency.to_string(),
            gross_amount: split.gross,
            commission_amount: split.commission,
            net_amount: split.net,
            commission_bps: commission_bps as i32,
            transfer_reference: new_transfer_reference(),
            created_by: Some(admin_id),
        },
    )
    .await?;

    let ids: Vec<i64> = pending.iter().map(|t| t.id).collect();
    let attached = transactions::attach_to_payout(conn, ids, payout.id).await?;
    if attached != pending.len() as u64 {
        return Err(DomainError::conflict(
            ConflictKind::OptimisticLock,
            "Balance changed while the payout was being created; retry",
        ));
    }

    Ok(Opened {
        payout,
        recipient_code,
    })
}

/// Pay out a breeder's balance in `currency`.
///
/// Gateway `success` and `pending` both count as accepted. A rejected or
/// failed transfer marks the payout failed and releases its transactions.
pub async fn create(
    req: Option<&HttpRequest>,
    state: &AppState,
    admin: &User,
    breeder_id: i64,
    currency: &str,
) -> Result<Payout, AppError> {
    let currency = currency.trim().to_ascii_uppercase();
    let admin_id = admin.id;
    let bps = state.payments.commission_bps;
    let cur = currency.clone();
    let opened = with_txn(req, state, move |txn| {
        Box::pin(async move { Ok(open_payout(txn, admin_id, breeder_id, &cur, bps).await?) })
    })
    .await?;

    let payout = opened.payout;
    let request = TransferRequest {
        reference: payout.transfer_reference.clone(),
        recipient_code: opened.recipient_code,
        amount: payout.net_amount,
        currency: payout.currency.clone(),
        reason: format!("PawHaven payout {}", payout.transfer_reference),
    };

    let result = match state.gateway.transfer(&request).await {
        Ok(response) => transfer_outcome(response),
        Err(e) => {
            warn!(reference = %request.reference, error = %e, "Gateway transfer failed");
            Err(e.to_string())
        }
    };

    record_transfer(req, state, payout, result).await
}

/// Settle a payout left `processing` from the gateway's record of its transfer.
///
/// A transfer the gateway never saw fails the payout and releases its
/// transactions. A gateway outage leaves it `processing` for another try.
pub async fn settle_processing(
    req: Option<&HttpRequest>,
    state: &AppState,
    admin: &User,
    payout_id: i64,
) -> Result<Payout, AppError> {
    let payout = with_txn(req, state, move |txn| {
        Box::pin(async move {
            let payout = payouts::require(txn, payout_id).await?;
            if payout.status != PayoutStatus::Processing {
                return Err(AppError::from(DomainError::conflict(
                    ConflictKind::InvalidTransition,
                    format!("Payout {payout_id} is not processing (status {:?})", payout.status),
                )));
            }
            Ok(payout)
        })
    })
    .await?;

    let result = match state.gateway.verify_transfer(&payout.transfer_reference).await {
        Ok(response) => transfer_outcome(response),
        Err(GatewayError::UnknownReference(_)) => Err("transfer not found at gateway".to_string()),
        Err(e) => {
            warn!(payout_id, reference = %payout.transfer_reference, error = %e, "Gateway transfer lookup failed");
            return Err(AppError::from(e));
        }
    };

    info!(payout_id, admin_id = admin.id, "Settling processing payout");
    record_transfer(req, state, payout, result).await
}

/// `Ok(transfer_code)` when the gateway accepted the transfer.
fn transfer_outcome(response: TransferResponse) -> Result<Option<String>, String> {
    match response.status {
        TransferStatus::Failed => Err(response.raw_status),
        TransferStatus::Success | TransferStatus::Pending => Ok(response.transfer_code),
    }
}

/// Mark the payout paid, or failed with its transactions released. If this
/// cannot be written the payout stays `processing` until settled again.
async fn record_transfer(
    req: Option<&HttpRequest>,
    state: &AppState,
    payout: Payout,
    result: Result<Option<String>, String>,
) -> Result<Payout, AppError> {
    let payout_id = payout.id;
    let net = payout.net_amount;
    let outcome = result.clone();
    let recorded = with_txn(req, state, move |txn| {
        Box::pin(async move {
            let current = payouts::require(txn, payout_id).await?;
            if current.status != PayoutStatus::Processing {
                return Ok(current);
            }
            let payout = match outcome {
                Ok(transfer_code) => {
                    let payout = payouts::mark_paid(txn, payout_id, transfer_code).await?;
                    notify(
                        txn,
                        payout.breeder_id,
                        NotificationKind::PayoutSent,
                        "Payout sent",
                        format!("{net} {} is on its way to your account", payout.currency),
                        None,
                    )
                    .await?;
                    payout
                }
                Err(reason) => {
                    let payout = payouts::mark_failed(txn, payout_id, reason.clone()).await?;
                    transactions::release_payout(txn, payout_id).await?;
                    notify(
                        txn,
                        payout.breeder_id,
                        NotificationKind::PayoutFailed,
                        "Payout failed",
                        format!("Your payout could not be sent: {reason}"),
                        None,
                    )
                    .await?;
                    payout
                }
            };
            Ok(payout)
        })
    })
    .await;

    let settled = match recorded {
        Ok(settled) => settled,
        Err(e) => {
            error!(
                payout_id,
                reference = %payout.transfer_reference,
                transfer = ?result,
                error = %e,
                "Transfer outcome not recorded; payout left processing"
            );
            return Err(e);
        }
    };

    match settled.status {
        PayoutStatus::Paid => info!(
            payout_id = settled.id,
            breeder_id = settled.breeder_id,
            gross = settled.gross_amount,
            commission = settled.commission_amount,
            net = settled.net_amount,
            "Payout sent"
        ),
        PayoutStatus::Failed => warn!(
            payout_id = settled.id,
            breeder_id = settled.breeder_id,
            reason = settled.failure_reason.as_deref().unwrap_or(""),
            "Payout failed"
        ),
        PayoutStatus::Processing => {}
    }
    Ok(settled)
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<Vec<Payout>, DomainError> {
    payouts::list_all(conn).await
}

pub async fn list_for_breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
) -> Result<Vec<Payout>, DomainError> {
    payouts::list_by_breeder(conn, breeder_id).await
}
