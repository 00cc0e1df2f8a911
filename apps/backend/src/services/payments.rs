//! Gateway payments: checkout initiation, verification and bounded polling.
//!
//! Gateway calls never run inside a database transaction. Each step that
//! writes opens its own `with_txn`.

use actix_web::HttpRequest;
use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::adapters::transactions_sea::{TransactionCreate, TransactionOutcome};
use crate::db::txn::with_txn;
use crate::domain::application_lifecycle::Action;
use crate::domain::listing_rules;
use crate::entities::application_events::ActorRole;
use crate::entities::applications::ApplicationStatus;
use crate::entities::notifications::NotificationKind;
use crate::entities::transactions::{TransactionKind, TransactionStatus};
use crate::entities::users::UserRole;
use crate::error::AppError;
use crate::errors::domain::{DomainError, ForbiddenKind, ValidationKind};
use crate::logging::pii::Redacted;
use crate::logging::security;
use crate::payments::{
    new_payment_reference, GatewayPaymentStatus, InitializeRequest, VerifyResponse,
};
use crate::repos::applications;
use crate::repos::listings;
use crate::repos::transactions::{self, Transaction};
use crate::repos::users::User;
use crate::services::applications::{actor_for, apply_transition, Actor};
use crate::services::notifications::{application_link, notify};
use crate::services::users::email_of;
use crate::state::app_state::AppState;

/// Failure reason stored when the gateway reports a different amount or currency.
pub const AMOUNT_MISMATCH: &str = "amount_mismatch";
/// Checkouts abandoned when their application is withdrawn or rejected.
pub const APPLICATION_CLOSED: &str = "application_closed";
/// A reservation fee arrived after the listing stopped taking reservations.
pub const LISTING_UNAVAILABLE: &str = "listing_unavailable";

/// A pending transaction that still needs a checkout URL.
#[derive(Debug)]
struct Checkout {
    transaction: Transaction,
    email: String,
    listing_id: i64,
}

enum Prepared {
    Ready(Transaction),
    NeedsCheckout(Checkout),
}

fn kind_str(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::ReservationFee => "reservation_fee",
        TransactionKind::FinalPayment => "final_payment",
    }
}

fn not_allowed(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::PaymentNotAllowed, detail)
}

/// An abandoned checkout whose application closed can still be paid at the
/// gateway, so it is verified like a pending one.
fn is_closed_checkout(tx: &Transaction) -> bool {
    tx.status == TransactionStatus::Abandoned
        && tx.failure_reason.as_deref() == Some(APPLICATION_CLOSED)
}

fn awaits_gateway(tx: &Transaction) -> bool {
    tx.status == TransactionStatus::Pending || is_closed_checkout(tx)
}

fn ensure_can_view(user: &User, transaction: &Transaction) -> Result<(), DomainError> {
    if user.id == transaction.payer_id || user.id == transaction.breeder_id || user.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            "You are not a party to this payment",
        ))
    }
}

async fn prepare<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    payer: &User,
    application_id: i64,
    kind: TransactionKind,
) -> Result<Prepared, DomainError> {
    let application = applications::require(conn, application_id).await?;
    let listing = listings::require(conn, application.listing_id).await?;
    if actor_for(payer, &application, &listing)?.role != ActorRole::Seeker {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotAParty,
            "Only the applicant can pay for an application",
        ));
    }

    let amount = match kind {
        TransactionKind::ReservationFee => {
            if application.status != ApplicationStatus::Approved {
                return Err(not_allowed("The reservation fee is due once the application is approved"));
            }
            if listing.reservation_fee == 0 {
                return Err(not_allowed("This listing has no reservation fee; reserve it directly"));
            }
            listing_rules::after_reservation(listing.available_count, listing.status)?;
            listing.reservation_fee
        }
        TransactionKind::FinalPayment => {
            if application.status != ApplicationStatus::ContractSigned {
                return Err(not_allowed("The final payment is due once the contract is signed"));
            }
            if listing.final_amount() <= 0 {
                return Err(not_allowed("Nothing left to pay on this listing"));
            }
            listing.final_amount()
        }
    };

    let existing = transactions::find_pending(conn, application.id, kind).await?;
    let transaction = match existing {
        Some(tx) if tx.amount == amount && tx.currency == listing.currency => {
            if tx.authorization_url.is_some() {
                return Ok(Prepared::Ready(tx));
            }
            tx
        }
        stale => {
            if let Some(tx) = stale {
                warn!(reference = %tx.reference, "Superseding pending transaction with a stale amount");
                transactions::settle(
                    conn,
                    tx.id,
                    TransactionOutcome {
                        status: TransactionStatus::Abandoned,
                        gateway_status: tx.gateway_status.clone(),
                        failure_reason: Some("superseded".to_string()),
                        paid_at: None,
                    },
                )
                .await?;
            }
            transactions::create(
                conn,
                TransactionCreate {
                    application_id: application.id,
                    payer_id: payer.id,
                    breeder_id: listing.breeder_id,
                    kind,
                    amount,
                    currency: listing.currency.clone(),
                    reference: new_payment_reference(),
                },
            )
            .await?
        }
    };

    Ok(Prepared::NeedsCheckout(Checkout {
        transaction,
        email: email_of(conn, payer.id).await?,
        listing_id: listing.id,
    }))
}

/// Start (or resume) a checkout for `kind` on the application.
pub async fn initiate(
    req: Option<&HttpRequest>,
    state: &AppState,
    payer: &User,
    application_id: i64,
    kind: TransactionKind,
) -> Result<Transaction, AppError> {
    let owned_payer = payer.clone();
    let prepared = with_txn(req, state, move |txn| {
        Box::pin(async move { Ok(prepare(txn, &owned_payer, application_id, kind).await?) })
    })
    .await?;

    let checkout = match prepared {
        Prepared::Ready(tx) => return Ok(tx),
        Prepared::NeedsCheckout(checkout) => checkout,
    };

    let tx = &checkout.transaction;
    let request = InitializeRequest {
        reference: tx.reference.clone(),
        email: checkout.email.clone(),
        amount: tx.amount,
        currency: tx.currency.clone(),
        callback_url: state.payments.callback_url.clone(),
        metadata: serde_json::json!({
            "application_id": tx.application_id,
            "listing_id": checkout.listing_id,
            "kind": kind_str(tx.kind),
        }),
    };
    let response = state.gateway.initialize(&request).await.map_err(|e| {
        warn!(reference = %tx.reference, email = %Redacted(&checkout.email), error = %e, "Gateway initialize failed");
        AppError::from(e)
    })?;

    let reference = tx.reference.clone();
    let transaction_id = tx.id;
    let url = response.authorization_url;
    let stored = with_txn(req, state, move |txn| {
        Box::pin(async move {
            transactions::set_authorization_url(txn, transaction_id, url).await?;
            Ok(transactions::require_by_reference(txn, &reference).await?)
        })
    })
    .await?;

    info!(
        reference = %stored.reference,
        application_id = stored.application_id,
        amount = stored.amount,
        gateway = state.gateway.name(),
        "Checkout initialized"
    );
    Ok(stored)
}

async fn load_visible(
    req: Option<&HttpRequest>,
    state: &AppState,
    user: &User,
    reference: &str,
) -> Result<Transaction, AppError> {
    let owned_user = user.clone();
    let reference = reference.to_string();
    with_txn(req, state, move |txn| {
        Box::pin(async move {
            let tx = transactions::require_by_reference(txn, &reference).await?;
            ensure_can_view(&owned_user, &tx)?;
            Ok(tx)
        })
    })
    .await
}

/// One gateway verification. Settled transactions are returned untouched.
pub async fn verify(
    req: Option<&HttpRequest>,
    state: &AppState,
    user: &User,
    reference: &str,
) -> Result<Transaction, AppError> {
    let current = load_visible(req, state, user, reference).await?;
    if !awaits_gateway(&current) {
        return Ok(current);
    }
    verify_once(req, state, reference).await
}

/// Verify until the gateway reports a terminal status or the attempt budget
/// runs out; returns the last known state either way.
pub async fn poll(
    req: Option<&HttpRequest>,
    state: &AppState,
    user: &User,
    reference: &str,
) -> Result<Transaction, AppError> {
    let mut current = load_visible(req, state, user, reference).await?;
    let max_attempts = state.payments.poll_max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if !awaits_gateway(&current) {
            break;
        }
        current = verify_once(req, state, reference).await?;
        if current.status.is_final() {
            break;
        }
        if attempt < max_attempts {
            tokio::time::sleep(state.payments.poll_interval).await;
        }
    }

    if !current.status.is_final() {
        info!(
            reference = %current.reference,
            attempts = current.verify_attempts,
            "Payment still pending after poll budget"
        );
    }
    Ok(current)
}

async fn verify_once(
    req: Option<&HttpRequest>,
    state: &AppState,
    reference: &str,
) -> Result<Transaction, AppError> {
    let response = state.gateway.verify(reference).await.map_err(|e| {
        warn!(reference, error = %e, "Gateway verify failed");
        AppError::from(e)
    })?;

    let reference = reference.to_string();
    with_txn(req, state, move |txn| {
        Box::pin(async move { Ok(apply_verification(txn, &reference, response).await?) })
    })
    .await
}

/// Apply a verify result. Settled rows come back unchanged; the only
/// second outcome is a closed checkout turning `refund_due`.
pub async fn apply_verification<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reference: &str,
    response: VerifyResponse,
) -> Result<Transaction, DomainError> {
    let tx = transactions::require_by_reference(conn, reference).await?;
    if !awaits_gateway(&tx) {
        return Ok(tx);
    }
    transactions::record_verify_attempt(conn, tx.id, &response.raw_status).await?;

    let gateway_status = Some(response.raw_status.clone());
    match response.status {
        GatewayPaymentStatus::Pending => {}
        GatewayPaymentStatus::Success => {
            settle_success(conn, &tx, &response, gateway_status).await?;
        }
        GatewayPaymentStatus::Failed | GatewayPaymentStatus::Abandoned
            if tx.status == TransactionStatus::Pending =>
        {
            let status = if response.status == GatewayPaymentStatus::Abandoned {
                TransactionStatus::Abandoned
            } else {
                TransactionStatus::Failed
            };
            let reason = response
                .gateway_response
                .clone()
                .unwrap_or_else(|| response.raw_status.clone());
            let outcome = TransactionOutcome {
                status,
                gateway_status,
                failure_reason: Some(reason.clone()),
                paid_at: None,
            };
            if transactions::settle(conn, tx.id, outcome).await? {
                notify_failure(conn, &tx, &reason).await?;
                info!(reference, status = ?status, "Payment did not complete");
            }
        }
        // A closed checkout that was not paid stays abandoned
        GatewayPaymentStatus::Failed | GatewayPaymentStatus::Abandoned => {}
    }

    Ok(transactions::require_by_reference(conn, reference).await?)
}

async fn settle_success<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx: &Transaction,
    response: &VerifyResponse,
    gateway_status: Option<String>,
) -> Result<(), DomainError> {
    let reference = tx.reference.as_str();
    let paid_at = Some(response.paid_at.unwrap_or_else(OffsetDateTime::now_utc));

    if let Some(reason) = refund_reason(conn, tx).await? {
        let outcome = TransactionOutcome {
            status: TransactionStatus::RefundDue,
            gateway_status,
            failure_reason: Some(reason.to_string()),
            paid_at,
        };
        if transactions::settle_from(conn, tx.id, tx.status, outcome).await? {
            warn!(
                reference,
                application_id = tx.application_id,
                amount = response.amount,
                reason,
                "Payment received but cannot be applied; refund due"
            );
            notify_refund_due(conn, tx).await?;
        }
        return Ok(());
    }

    if response.amount != tx.amount || !response.currency.eq_ignore_ascii_case(&tx.currency) {
        security::payment_amount_mismatch(reference, tx.amount, response.amount);
        let outcome = TransactionOutcome {
            status: TransactionStatus::Failed,
            gateway_status,
            failure_reason: Some(AMOUNT_MISMATCH.to_string()),
            paid_at: None,
        };
        if transactions::settle(conn, tx.id, outcome).await? {
            notify_failure(conn, tx, "The payment amount did not match").await?;
        }
        return Ok(());
    }

    let outcome = TransactionOutcome {
        status: TransactionStatus::Success,
        gateway_status,
        failure_reason: None,
        paid_at,
    };
    if transactions::settle(conn, tx.id, outcome).await? {
        advance_application(conn, tx).await?;
        notify_success(conn, tx).await?;
        info!(reference, amount = tx.amount, "Payment succeeded");
    }
    Ok(())
}

/// Why money that arrived can no longer buy what it was for.
async fn refund_reason<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx: &Transaction,
) -> Result<Option<&'static str>, DomainError> {
    if is_closed_checkout(tx) {
        return Ok(Some(APPLICATION_CLOSED));
    }
    let application = applications::require(conn, tx.application_id).await?;
    if matches!(
        application.status,
        ApplicationStatus::Withdrawn | ApplicationStatus::Rejected
    ) {
        return Ok(Some(APPLICATION_CLOSED));
    }
    if tx.kind == TransactionKind::ReservationFee && application.status == ApplicationStatus::Approved {
        let listing = listings::require(conn, application.listing_id).await?;
        if listing_rules::after_reservation(listing.available_count, listing.status).is_err() {
            return Ok(Some(LISTING_UNAVAILABLE));
        }
    }
    Ok(None)
}

/// `approved → reserved` or `contract_signed → paid`. Skipped with a warning
/// when the application has moved on.
async fn advance_application<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx: &Transaction,
) -> Result<(), DomainError> {
    let application = applications::require(conn, tx.application_id).await?;
    let listing = listings::require(conn, application.listing_id).await?;

    let (action, expected) = match tx.kind {
        TransactionKind::ReservationFee => (Action::ReservationPaid, ApplicationStatus::Approved),
        TransactionKind::FinalPayment => (Action::FinalPaid, ApplicationStatus::ContractSigned),
    };
    if application.status != expected {
        warn!(
            reference = %tx.reference,
            application_id = application.id,
            status = ?application.status,
            "Payment settled but application is no longer awaiting it"
        );
        return Ok(());
    }

    apply_transition(
        conn,
        application,
        listing,
        action,
        Actor::SYSTEM,
        None,
        Some(format!("Payment {}", tx.reference)),
    )
    .await?;
    Ok(())
}

/// Abandon the application's open checkouts once it is withdrawn or rejected.
pub async fn close_checkouts<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    application_id: i64,
) -> Result<(), DomainError> {
    let abandoned = transactions::abandon_pending(conn, application_id, APPLICATION_CLOSED).await?;
    if abandoned > 0 {
        info!(application_id, abandoned, "Open checkouts abandoned with their application");
    }
    Ok(())
}

async fn notify_success<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx: &Transaction,
) -> Result<(), DomainError> {
    let what = match tx.kind {
        TransactionKind::ReservationFee => "reservation fee",
        TransactionKind::FinalPayment => "final payment",
    };
    let amount = format!("{} {}", tx.amount, tx.currency);
    notify(
        conn,
        tx.payer_id,
        NotificationKind::PaymentSucceeded,
        "Payment received",
        format!("Your {what} of {amount} was received"),
        application_link(tx.application_id),
    )
    .await?;
    notify(
        conn,
        tx.breeder_id,
        NotificationKind::PaymentSucceeded,
        "Payment received",
        format!("An adopter paid the {what} of {amount}"),
        application_link(tx.application_id),
    )
    .await
}

async fn notify_refund_due<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx: &Transaction,
) -> Result<(), DomainError> {
    notify(
        conn,
        tx.payer_id,
        NotificationKind::PaymentFailed,
        "Payment will be refunded",
        format!(
            "Your payment {} of {} {} arrived after the application closed and will be refunded",
            tx.reference, tx.amount, tx.currency
        ),
        application_link(tx.application_id),
    )
    .await
}

async fn notify_failure<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tx: &Transaction,
    reason: &str,
) -> Result<(), DomainError> {
    notify(
        conn,
        tx.payer_id,
        NotificationKind::PaymentFailed,
        "Payment failed",
        format!("Your payment {} did not go through: {reason}", tx.reference),
        application_link(tx.application_id),
    )
    .await
}

/// Seekers see what they paid, breeders what they received, admins all.
pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
) -> Result<Vec<Transaction>, DomainError> {
    match user.role {
        UserRole::Admin => transactions::list_all(conn).await,
        UserRole::Breeder => transactions::list_by_breeder(conn, user.id).await,
        UserRole::Seeker => transactions::list_by_payer(conn, user.id).await,
    }
}

pub async fn get<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    reference: &str,
) -> Result<Transaction, DomainError> {
    let tx = transactions::require_by_reference(conn, reference).await?;
    ensure_can_view(user, &tx)?;
    Ok(tx)
}
