//! Payment gateway boundary.
//!
//! Services talk to a `PaymentGateway`; production uses the HTTP gateway
//! (Paystack-compatible API), tests and local runs use the in-memory one.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use ulid::Ulid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway unreachable: {0}")]
    Transport(String),
    #[error("payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected payment gateway response: {0}")]
    Decode(String),
    #[error("payment gateway does not know reference {0}")]
    UnknownReference(String),
}

/// Checkout initialization.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub reference: String,
    pub email: String,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResponse {
    pub authorization_url: String,
    #[serde(default)]
    pub access_code: Option<String>,
    pub reference: String,
}

/// Payment state as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    Success,
    Failed,
    Abandoned,
    /// Anything not yet final (`ongoing`, `processing`, `queued`, ...)
    Pending,
}

impl GatewayPaymentStatus {
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "failed" | "reversed" => Self::Failed,
            "abandoned" => Self::Abandoned,
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone)]
pub struct VerifyResponse {
    pub reference: String,
    pub status: GatewayPaymentStatus,
    pub raw_status: String,
    pub amount: i64,
    pub currency: String,
    pub paid_at: Option<OffsetDateTime>,
    pub gateway_response: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub reference: String,
    pub recipient_code: String,
    pub amount: i64,
    pub currency: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    /// Accepted, settlement not yet confirmed
    Pending,
    Failed,
}

impl TransferStatus {
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "failed" | "reversed" | "abandoned" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransferResponse {
    pub transfer_code: Option<String>,
    pub status: TransferStatus,
    pub raw_status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: &InitializeRequest)
        -> Result<InitializeResponse, GatewayError>;

    async fn verify(&self, reference: &str) -> Result<VerifyResponse, GatewayError>;

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse, GatewayError>;

    /// Current state of a transfer by its reference.
    async fn verify_transfer(&self, reference: &str) -> Result<TransferResponse, GatewayError>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// `PH-` + ULID, shared with the gateway as the transaction reference.
pub fn new_payment_reference() -> String {
    format!("PH-{}", Ulid::new())
}

/// `PO-` + ULID, used as the transfer reference of a payout.
pub fn new_transfer_reference() -> String {
    format!("PO-{}", Ulid::new())
}
