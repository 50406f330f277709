use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::PaymentMethodClient;
use crate::domain::{PaymentMethod, PaymentRequest, PaymentTransaction, TransactionCreate, TransactionStatus};
use crate::events::{DomainEvent, EventBus};
use crate::payment_actor::{PaymentError, TransactionAction, TransactionChange};
use crate::services::CardGateway;

/// Client for card payments.
///
/// A transaction is created pending, charged through the gateway and then
/// completed or failed. Approved charges can store the card for later.
#[derive(Clone)]
pub struct PaymentClient {
    inner: ResourceClient<PaymentTransaction>,
    methods: PaymentMethodClient,
    gateway: Arc<dyn CardGateway>,
    events: EventBus,
}

impl PaymentClient {
    pub fn new(
        inner: ResourceClient<PaymentTransaction>,
        methods: PaymentMethodClient,
        gateway: Arc<dyn CardGateway>,
        events: EventBus,
    ) -> Self {
        Self {
            inner,
            methods,
            gateway,
            events,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id, amount = request.amount))]
    pub async fn initiate(&self, request: PaymentRequest) -> Result<PaymentTransaction, PaymentError> {
        info!("Processing payment request");
        request.card.validate().map_err(PaymentError::ValidationError)?;

        let id = self
            .inner
            .create(TransactionCreate {
                user_id: request.user_id.clone(),
                amount: request.amount,
                currency: request.currency,
            })
            .await?;
        let transaction = self.get_transaction(id.clone()).await?;

        let outcome = self.gateway.charge(&transaction, &request.card, request.save_method);
        let response = json!({
            "approved": outcome.approved,
            "reference": outcome.reference,
            "message": outcome.message,
        });

        if !outcome.approved {
            let change = self
                .inner
                .perform_action(
                    id,
                    TransactionAction::Fail {
                        gateway_id: Some(outcome.reference),
                        response,
                    },
                )
                .await?;
            self.publish(&change);
            return Err(PaymentError::GatewayDeclined(outcome.message));
        }

        let change = self
            .inner
            .perform_action(
                id,
                TransactionAction::Complete {
                    gateway_id: outcome.reference,
                    response,
                },
            )
            .await?;
        self.publish(&change);

        if let Some(token) = outcome.token {
            // A failed save does not undo the charge.
            match self.methods.save_token(&request.user_id, &token).await {
                Ok(Some(method)) => info!(method_id = %method.id, "Card saved for later"),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Could not save card"),
            }
        }
        Ok(change.transaction)
    }

    /// Asks the gateway to confirm the stored reference.
    #[instrument(skip(self))]
    pub async fn confirm(&self, id: String) -> Result<PaymentTransaction, PaymentError> {
        let transaction = self.get_transaction(id.clone()).await?;
        let Some(reference) = transaction.gateway_id.clone() else {
            return Err(PaymentError::InvalidTransition(format!(
                "transaction {id} has no gateway reference to confirm"
            )));
        };
        match self.gateway.confirm(&reference) {
            Ok(response) => {
                let change = self
                    .inner
                    .perform_action(
                        id,
                        TransactionAction::Complete {
                            gateway_id: reference,
                            response,
                        },
                    )
                    .await?;
                self.publish(&change);
                Ok(change.transaction)
            }
            Err(message) => {
                error!(error = %message, "Gateway confirmation failed");
                let change = self
                    .inner
                    .perform_action(
                        id,
                        TransactionAction::Fail {
                            gateway_id: None,
                            response: json!({ "error": message }),
                        },
                    )
                    .await?;
                self.publish(&change);
                Err(PaymentError::GatewayDeclined(message))
            }
        }
    }

    /// Records a status pushed by the gateway.
    #[instrument(skip(self, response))]
    pub async fn handle_callback(
        &self,
        id: String,
        status: &str,
        response: serde_json::Value,
    ) -> Result<PaymentTransaction, PaymentError> {
        debug!("Sending request");
        self.get_transaction(id.clone()).await?;
        let status: TransactionStatus = serde_json::from_value(json!(status.trim().to_uppercase()))
            .map_err(|_| PaymentError::ValidationError(format!("Unknown payment status '{status}'")))?;
        let change = self
            .inner
            .perform_action(id, TransactionAction::RecordCallback { status, response })
            .await?;
        self.publish(&change);
        Ok(change.transaction)
    }

    #[instrument(skip(self))]
    pub async fn refund(&self, id: String) -> Result<PaymentTransaction, PaymentError> {
        debug!("Sending request");
        let change = self.inner.perform_action(id, TransactionAction::Refund).await?;
        self.publish(&change);
        Ok(change.transaction)
    }

    pub async fn saved_methods(&self, user_id: &str) -> Result<Vec<PaymentMethod>, PaymentError> {
        self.methods.saved(user_id).await
    }

    pub async fn delete_saved_method(&self, user_id: &str, method_id: String) -> Result<(), PaymentError> {
        self.methods.remove(user_id, method_id).await
    }

    fn publish(&self, change: &TransactionChange) {
        if !change.status_changed() {
            return;
        }
        info!(
            transaction_id = %change.transaction.id,
            from = %change.previous,
            to = %change.transaction.status,
            "Payment status changed"
        );
        self.events.publish(DomainEvent::PaymentStatusChanged {
            transaction_id: change.transaction.id.clone(),
            from: change.previous,
            to: change.transaction.status,
        });
    }
}

crate::impl_client_methods!(PaymentClient, inner => PaymentTransaction, PaymentError, transaction);
