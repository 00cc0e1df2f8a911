//! In-process gateway for tests and local development.
//!
//! Checkouts stay pending until settled through the control methods, so a
//! test decides when (and how) the "customer" pays.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use ulid::Ulid;

use super::{
    GatewayError, GatewayPaymentStatus, InitializeRequest, InitializeResponse, PaymentGateway,
    TransferRequest, TransferResponse, TransferStatus, VerifyResponse,
};

#[derive(Debug, Clone)]
struct Checkout {
    amount: i64,
    currency: String,
    status: GatewayPaymentStatus,
    /// Verifications that still report pending before `status` shows
    pending_checks: u32,
    /// Overrides the amount reported on verify
    reported_amount: Option<i64>,
    verify_calls: u32,
}

#[derive(Default)]
pub struct InMemoryGateway {
    checkouts: DashMap<String, Checkout>,
    transfers: Mutex<Vec<TransferRequest>>,
    transfer_outcomes: DashMap<String, TransferResponse>,
    failing_transfers: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final outcome of a checkout, visible on the next verify.
    pub fn settle(&self, reference: &str, status: GatewayPaymentStatus) {
        self.settle_after(reference, status, 0);
    }

    /// Report pending for `pending_checks` verifications, then `status`.
    pub fn settle_after(&self, reference: &str, status: GatewayPaymentStatus, pending_checks: u32) {
        if let Some(mut checkout) = self.checkouts.get_mut(reference) {
            checkout.status = status;
            checkout.pending_checks = pending_checks;
        }
    }

    /// Make verify report a different amount than the one initialized.
    pub fn report_amount(&self, reference: &str, amount: i64) {
        if let Some(mut checkout) = self.checkouts.get_mut(reference) {
            checkout.reported_amount = Some(amount);
        }
    }

    /// Subsequent transfers come back `failed` with `reason`; `None` restores success.
    pub fn fail_transfers(&self, reason: Option<&str>) {
        if let Ok(mut failing) = self.failing_transfers.lock() {
            *failing = reason.map(str::to_string);
        }
    }

    /// Every call returns a transport error while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn verify_calls(&self, reference: &str) -> u32 {
        self.checkouts
            .get(reference)
            .map(|c| c.verify_calls)
            .unwrap_or(0)
    }

    pub fn initialized_count(&self) -> usize {
        self.checkouts.len()
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(GatewayError::Transport("in-memory gateway offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn initialize(
        &self,
        request: &InitializeRequest,
    ) -> Result<InitializeResponse, GatewayError> {
        self.check_available()?;
        if request.amount <= 0 {
            return Err(GatewayError::Rejected {
                status: 400,
                message: "Invalid amount".to_string(),
            });
        }

        self.checkouts
            .entry(request.reference.clone())
            .or_insert_with(|| Checkout {
                amount: request.amount,
                currency: request.currency.clone(),
                status: GatewayPaymentStatus::Pending,
                pending_checks: 0,
                reported_amount: None,
                verify_calls: 0,
            });

        Ok(InitializeResponse {
            authorization_url: format!("https://checkout.pawhaven.test/{}", request.reference),
            access_code: Some(Ulid::new().to_string().to_lowercase()),
            reference: request.reference.clone(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifyResponse, GatewayError> {
        self.check_available()?;
        let mut checkout = self
            .checkouts
            .get_mut(reference)
            .ok_or_else(|| GatewayError::UnknownReference(reference.to_string()))?;

        checkout.verify_calls += 1;
        let status = if checkout.pending_checks > 0 {
            checkout.pending_checks -= 1;
            GatewayPaymentStatus::Pending
        } else {
            checkout.status
        };

        let raw_status = match status {
            GatewayPaymentStatus::Success => "success",
            GatewayPaymentStatus::Failed => "failed",
            GatewayPaymentStatus::Abandoned => "abandoned",
            GatewayPaymentStatus::Pending => "ongoing",
        };

        Ok(VerifyResponse {
            reference: reference.to_string(),
            status,
            raw_status: raw_status.to_string(),
            amount: checkout.reported_amount.unwrap_or(checkout.amount),
            currency: checkout.currency.clone(),
            paid_at: (status == GatewayPaymentStatus::Success).then(OffsetDateTime::now_utc),
            gateway_response: Some(raw_status.to_string()),
        })
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse, GatewayError> {
        self.check_available()?;
        if let Ok(mut transfers) = self.transfers.lock() {
            transfers.push(request.clone());
        }

        let failing = self
            .failing_transfers
            .lock()
            .ok()
            .and_then(|f| f.clone());

        let response = match failing {
            Some(reason) => TransferResponse {
                transfer_code: None,
                status: TransferStatus::Failed,
                raw_status: reason,
            },
            None => TransferResponse {
                transfer_code: Some(format!("TRF_{}", Ulid::new().to_string().to_lowercase())),
                status: TransferStatus::Success,
                raw_status: "success".to_string(),
            },
        };
        self.transfer_outcomes
            .insert(request.reference.clone(), response.clone());
        Ok(response)
    }

    async fn verify_transfer(&self, reference: &str) -> Result<TransferResponse, GatewayError> {
        self.check_available()?;
        self.transfer_outcomes
            .get(reference)
            .map(|r| r.clone())
            .ok_or_else(|| GatewayError::UnknownReference(reference.to_string()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
