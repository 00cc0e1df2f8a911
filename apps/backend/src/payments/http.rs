//! Paystack-compatible HTTP gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{
    GatewayError, GatewayPaymentStatus, InitializeRequest, InitializeResponse, PaymentGateway,
    TransferRequest, TransferResponse, TransferStatus, VerifyResponse,
};
use crate::logging::pii::Redacted;

/// Every response is wrapped as `{status, message, data}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    amount: i64,
    currency: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    paid_at: Option<OffsetDateTime>,
    #[serde(default)]
    gateway_response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransferData {
    status: String,
    #[serde(default)]
    transfer_code: Option<String>,
}

pub struct HttpGateway {
    base_url: String,
    secret_key: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(env) => env,
            Err(e) if status.is_success() => return Err(GatewayError::Decode(e.to_string())),
            Err(_) => {
                warn!(status = status.as_u16(), body = %Redacted(&body), "Gateway error response");
                return Err(GatewayError::Rejected {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("error").to_string(),
                });
            }
        };

        if !status.is_success() || !envelope.status {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: envelope.message,
            });
        }

        envelope
            .data
            .ok_or_else(|| GatewayError::Decode("response has no data".to_string()))
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn initialize(
        &self,
        request: &InitializeRequest,
    ) -> Result<InitializeResponse, GatewayError> {
        debug!(reference = %request.reference, amount = request.amount, "Gateway initialize");
        self.send(
            self.request(Method::POST, "/transaction/initialize")
                .json(request),
        )
        .await
    }

    async fn verify(&self, reference: &str) -> Result<VerifyResponse, GatewayError> {
        let path = format!("/transaction/verify/{reference}");
        let data: VerifyData = match self.send(self.request(Method::GET, &path)).await {
            Err(GatewayError::Rejected { status: 404, .. }) => {
                return Err(GatewayError::UnknownReference(reference.to_string()))
            }
            other => other?,
        };

        Ok(VerifyResponse {
            status: GatewayPaymentStatus::from_gateway(&data.status),
            raw_status: data.status,
            reference: data.reference,
            amount: data.amount,
            currency: data.currency,
            paid_at: data.paid_at,
            gateway_response: data.gateway_response,
        })
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse, GatewayError> {
        let body = serde_json::json!({
            "source": "balance",
            "amount": request.amount,
            "currency": request.currency,
            "recipient": request.recipient_code,
            "reference": request.reference,
            "reason": request.reason,
        });
        let data: TransferData = self
            .send(self.request(Method::POST, "/transfer").json(&body))
            .await?;

        Ok(TransferResponse {
            status: TransferStatus::from_gateway(&data.status),
            raw_status: data.status,
            transfer_code: data.transfer_code,
        })
    }

    async fn verify_transfer(&self, reference: &str) -> Result<TransferResponse, GatewayError> {
        let path = format!("/transfer/verify/{reference}");
        let data: TransferData = match self.send(self.request(Method::GET, &path)).await {
            Err(GatewayError::Rejected { status: 404, .. }) => {
                return Err(GatewayError::UnknownReference(reference.to_string()))
            }
            other => other?,
        };

        Ok(TransferResponse {
            status: TransferStatus::from_gateway(&data.status),
            raw_status: data.status,
            transfer_code: data.transfer_code,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
