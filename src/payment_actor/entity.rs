use std::collections::HashMap;

use crate::actor_framework::{Change, Entity};
use crate::domain::{
    PaymentMethod, PaymentMethodCreate, PaymentTransaction, TransactionCreate, TransactionStatus,
};
use super::{PaymentError, PaymentMethodAction, TransactionAction, TransactionChange};
use chrono::Utc;

impl Entity for PaymentTransaction {
    type Id = String;
    type CreateParams = TransactionCreate;
    type Patch = ();
    type Action = TransactionAction;
    type ActionResult = TransactionChange;
    type Error = PaymentError;

    const KIND: &'static str = "transaction";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: TransactionCreate) -> Result<Self, PaymentError> {
        if !params.amount.is_finite() || params.amount <= 0.0 {
            return Err(PaymentError::ValidationError(
                "Payment amount must be positive".into(),
            ));
        }
        if params.user_id.trim().is_empty() {
            return Err(PaymentError::ValidationError("user_id is required".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            user_id: params.user_id,
            amount: params.amount,
            currency: params.currency.to_uppercase(),
            status: TransactionStatus::Pending,
            gateway_id: None,
            gateway_response: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), PaymentError> {
        Ok(())
    }

    fn handle_action(&mut self, action: TransactionAction) -> Result<TransactionChange, PaymentError> {
        let previous = self.status;
        match action {
            TransactionAction::Complete { gateway_id, response } => {
                self.status = TransactionStatus::Completed;
                self.gateway_id = Some(gateway_id);
                self.gateway_response = response;
            }
            TransactionAction::Fail { gateway_id, response } => {
                self.status = TransactionStatus::Failed;
                if gateway_id.is_some() {
                    self.gateway_id = gateway_id;
                }
                self.gateway_response = response;
            }
            TransactionAction::RecordCallback { status, response } => {
                self.status = status;
                self.gateway_response = response;
            }
            TransactionAction::Refund => {
                if self.status != TransactionStatus::Completed {
                    return Err(PaymentError::InvalidTransition(format!(
                        "only completed transactions can be refunded, {} is {}",
                        self.id, self.status
                    )));
                }
                self.status = TransactionStatus::Refunded;
            }
        }
        self.updated_at = Utc::now();
        Ok(TransactionChange {
            transaction: self.clone(),
            previous,
        })
    }
}

impl Entity for PaymentMethod {
    type Id = String;
    type CreateParams = PaymentMethodCreate;
    type Patch = ();
    type Action = PaymentMethodAction;
    type ActionResult = PaymentMethod;
    type Error = PaymentError;

    const KIND: &'static str = "payment method";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: PaymentMethodCreate) -> Result<Self, PaymentError> {
        if params.token.trim().is_empty() {
            return Err(PaymentError::ValidationError("token is required".into()));
        }
        if !(1..=12).contains(&params.expiry_month) {
            return Err(PaymentError::ValidationError(format!(
                "Invalid expiry month {}",
                params.expiry_month
            )));
        }
        if !(2000..=2099).contains(&params.expiry_year) {
            return Err(PaymentError::ValidationError(format!(
                "Invalid expiry year {}",
                params.expiry_year
            )));
        }
        if params.last_four.len() != 4 || !params.last_four.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::ValidationError(
                "last_four must be four digits".into(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            user_id: params.user_id,
            token: params.token,
            brand: params.brand,
            last_four: params.last_four,
            expiry_month: params.expiry_month,
            expiry_year: params.expiry_year,
            consent_given: params.consent_given,
            is_default: params.is_default,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), PaymentError> {
        Ok(())
    }

    fn handle_action(&mut self, action: PaymentMethodAction) -> Result<PaymentMethod, PaymentError> {
        match action {
            PaymentMethodAction::SetDefault => {
                self.is_default = true;
                self.updated_at = Utc::now();
            }
        }
        Ok(self.clone())
    }

    fn check_conflict(&self, other: &Self) -> Result<(), PaymentError> {
        if self.token == other.token {
            return Err(PaymentError::AlreadyExists(format!(
                "token already stored as {}",
                other.id
            )));
        }
        Ok(())
    }

    /// Keeps exactly one default per user whenever the user has any method.
    fn reconcile(store: &mut HashMap<String, Self>, changed: &Self, change: Change) {
        match change {
            Change::Created | Change::Updated if changed.is_default => {
                for method in store.values_mut() {
                    if method.user_id == changed.user_id && method.id != changed.id {
                        method.is_default = false;
                    }
                }
            }
            Change::Created => {
                let has_default = store
                    .values()
                    .any(|m| m.user_id == changed.user_id && m.is_default);
                if !has_default {
                    if let Some(method) = store.get_mut(&changed.id) {
                        method.is_default = true;
                    }
                }
            }
            Change::Deleted if changed.is_default => {
                let successor = store
                    .values_mut()
                    .filter(|m| m.user_id == changed.user_id)
                    .min_by(|a, b| a.brand.cmp(&b.brand).then(a.created_at.cmp(&b.created_at)));
                if let Some(method) = successor {
                    method.is_default = true;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transaction() -> PaymentTransaction {
        PaymentTransaction::from_create_params(
            "tx-1".into(),
            TransactionCreate {
                user_id: "user_1".into(),
                amount: 49.9,
                currency: "usd".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new_transactions_are_pending() {
        let tx = transaction();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.currency, "USD");
    }

    #[test]
    fn test_non_positive_amounts_are_rejected() {
        let err = PaymentTransaction::from_create_params(
            "tx-1".into(),
            TransactionCreate {
                user_id: "user_1".into(),
                amount: -3.0,
                currency: "USD".into(),
            },
        );
        assert!(matches!(err, Err(PaymentError::ValidationError(_))));
    }

    #[test]
    fn test_status_change_is_reported() {
        let mut tx = transaction();
        let change = tx
            .handle_action(TransactionAction::Complete {
                gateway_id: "mock_success_1".into(),
                response: json!({"status": true}),
            })
            .unwrap();
        assert!(change.status_changed());
        assert_eq!(change.previous, TransactionStatus::Pending);
        assert_eq!(change.transaction.gateway_id.as_deref(), Some("mock_success_1"));
    }

    #[test]
    fn test_refund_requires_completed() {
        let mut tx = transaction();
        assert!(matches!(
            tx.handle_action(TransactionAction::Refund),
            Err(PaymentError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_expiry_bounds() {
        let params = |month, year| PaymentMethodCreate {
            user_id: "user_1".into(),
            token: "tok".into(),
            brand: "Visa".into(),
            last_four: "4242".into(),
            expiry_month: month,
            expiry_year: year,
            consent_given: true,
            is_default: false,
        };
        assert!(PaymentMethod::from_create_params("pm_1".into(), params(12, 2030)).is_ok());
        assert!(PaymentMethod::from_create_params("pm_1".into(), params(13, 2030)).is_err());
        assert!(PaymentMethod::from_create_params("pm_1".into(), params(1, 1999)).is_err());
    }
}
