//! Order backend client over HTTP.

use crate::domain::order::{OrderConfirmation, OrderFailure, OrderRequest};
use crate::domain::ports::OrderGateway;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use tracing::{debug, error, instrument};

pub const PROCESS_PAYMENT_PATH: &str = "/api/process-payment";

/// Posts orders to `{base_url}/api/process-payment`.
///
/// A single attempt per call. There is no retry or backoff; the caller decides
/// whether to try again, with a new idempotency key.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{PROCESS_PAYMENT_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[instrument(skip(self, order), fields(idempotency_key = %order.idempotency_key, amount = order.amount_money.amount))]
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(order)
            .send()
            .await
            .map_err(|e| CheckoutError::Submission(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Submission(e.to_string()))?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "order backend returned non-success status"
            );
            let message = serde_json::from_str::<OrderFailure>(&body)
                .ok()
                .and_then(|failure| failure.message)
                .unwrap_or_else(|| "Payment processing failed".to_string());
            return Err(CheckoutError::Submission(message));
        }

        let confirmation: OrderConfirmation = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "failed to parse order backend response");
            CheckoutError::Submission(format!("unreadable backend response: {e}"))
        })?;
        debug!(order_id = ?confirmation.order_id, "order accepted");
        Ok(confirmation)
    }
}
