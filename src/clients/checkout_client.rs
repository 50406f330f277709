use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::checkout_actor::{AttemptAction, CheckoutError};
use crate::domain::{AttemptCreate, AttemptStatus, CheckoutRequest, GatewayCallback, PaymentAttempt};
use crate::services::SecureCheckoutGateway;

const DEFAULT_FAILURE: &str = "Payment failed without a specific message";

/// Client for hosted-page checkout attempts.
#[derive(Clone)]
pub struct CheckoutClient {
    inner: ResourceClient<PaymentAttempt>,
    gateway: Arc<dyn SecureCheckoutGateway>,
    host_url: String,
    currency: String,
}

impl CheckoutClient {
    pub fn new(
        inner: ResourceClient<PaymentAttempt>,
        gateway: Arc<dyn SecureCheckoutGateway>,
        host_url: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            gateway,
            host_url: host_url.into(),
            currency: currency.into(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Opens a pending attempt and a gateway session the customer is sent to.
    #[instrument(skip(self))]
    pub async fn initiate(&self, request: CheckoutRequest) -> Result<PaymentAttempt, CheckoutError> {
        info!("Processing checkout request");
        let id = self
            .inner
            .create(AttemptCreate {
                order_id: request.order_id,
                amount: request.amount,
                currency: self.currency.clone(),
            })
            .await?;
        let attempt = self.get_attempt(id.clone()).await?;

        match self.gateway.open_session(&attempt, &self.return_url(&id)) {
            Ok(session) => {
                let attempt = self.inner.perform_action(id, AttemptAction::AttachSession(session)).await?;
                info!(attempt_id = %attempt.id, "Secure environment ready");
                Ok(attempt)
            }
            Err(message) => {
                error!(attempt_id = %id, error = %message, "Secure environment unavailable");
                self.inner
                    .perform_action(id, AttemptAction::MarkFailed { error: message.clone() })
                    .await?;
                Err(CheckoutError::SecureEnvironmentFailure(message))
            }
        }
    }

    pub fn return_url(&self, attempt_id: &str) -> String {
        format!(
            "{}/checkout/callback/{attempt_id}/",
            self.host_url.trim_end_matches('/')
        )
    }

    #[instrument(skip(self))]
    pub async fn handle_callback(&self, id: String, callback: GatewayCallback) -> Result<PaymentAttempt, CheckoutError> {
        debug!("Sending request");
        let action = if callback.succeeded {
            AttemptAction::MarkSucceeded {
                external_id: callback.external_id,
            }
        } else {
            AttemptAction::MarkFailed {
                error: callback
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE.to_string()),
            }
        };
        let attempt = self.inner.perform_action(id, action).await?;
        info!(attempt_id = %attempt.id, status = ?attempt.status, "Gateway callback recorded");
        Ok(attempt)
    }

    /// Only successful attempts have a success page.
    #[instrument(skip(self))]
    pub async fn success_view(&self, id: String) -> Result<PaymentAttempt, CheckoutError> {
        let attempt = self.get_attempt(id.clone()).await?;
        if attempt.status != AttemptStatus::Success {
            return Err(CheckoutError::NotFound(format!("successful payment attempt '{id}'")));
        }
        Ok(attempt)
    }

    #[instrument(skip(self))]
    pub async fn failed_view(&self, id: String) -> Result<PaymentAttempt, CheckoutError> {
        self.get_attempt(id).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: String) -> Result<PaymentAttempt, CheckoutError> {
        debug!("Sending request");
        self.inner.perform_action(id, AttemptAction::Cancel).await
    }
}

crate::impl_client_methods!(CheckoutClient, inner => PaymentAttempt, CheckoutError, attempt);
