use crate::actor_framework::Entity;
use crate::domain::{AttemptCreate, AttemptStatus, PaymentAttempt};
use super::{AttemptAction, CheckoutError};
use chrono::Utc;

impl Entity for PaymentAttempt {
    type Id = String;
    type CreateParams = AttemptCreate;
    type Patch = ();
    type Action = AttemptAction;
    type ActionResult = PaymentAttempt;
    type Error = CheckoutError;

    const KIND: &'static str = "payment attempt";

    fn id(&self) -> &String {
        &self.id
    }

    /// Every attempt starts out pending.
    fn from_create_params(id: String, params: AttemptCreate) -> Result<Self, CheckoutError> {
        if !params.amount.is_finite() || params.amount <= 0.0 {
            return Err(CheckoutError::ValidationError(
                "Amount must be greater than zero".into(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            order_id: params.order_id,
            amount: params.amount,
            currency: params.currency,
            status: AttemptStatus::Pending,
            external_id: None,
            secure_environment_url: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), CheckoutError> {
        Ok(())
    }

    /// Gateway callbacks may arrive in any order, so success and failure are
    /// accepted from every state. Only cancellation is restricted to pending attempts.
    fn handle_action(&mut self, action: AttemptAction) -> Result<PaymentAttempt, CheckoutError> {
        match action {
            AttemptAction::AttachSession(session) => {
                self.external_id = Some(session.external_id);
                self.secure_environment_url = Some(session.redirect_url);
            }
            AttemptAction::MarkSucceeded { external_id } => {
                self.status = AttemptStatus::Success;
                self.error_message = None;
                if external_id.is_some() {
                    self.external_id = external_id;
                }
            }
            AttemptAction::MarkFailed { error } => {
                self.status = AttemptStatus::Failed;
                self.error_message = Some(error);
            }
            AttemptAction::Cancel => {
                if self.status != AttemptStatus::Pending {
                    return Err(CheckoutError::InvalidTransition(format!(
                        "attempt {} is {:?} and can no longer be cancelled",
                        self.id, self.status
                    )));
                }
                self.status = AttemptStatus::Cancelled;
            }
        }
        self.updated_at = Utc::now();
        Ok(self.clone())
    }
}
