use crate::domain::{PaymentTransaction, TransactionStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionAction {
    /// The gateway approved the charge.
    Complete {
        gateway_id: String,
        response: serde_json::Value,
    },
    /// The gateway declined the charge or a confirmation failed.
    Fail {
        gateway_id: Option<String>,
        response: serde_json::Value,
    },
    /// Status pushed by the gateway's webhook, applied as-is.
    RecordCallback {
        status: TransactionStatus,
        response: serde_json::Value,
    },
    Refund,
}

/// The transaction after the action, plus the status it had before.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionChange {
    pub transaction: PaymentTransaction,
    pub previous: TransactionStatus,
}

impl TransactionChange {
    pub fn status_changed(&self) -> bool {
        self.previous != self.transaction.status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethodAction {
    SetDefault,
}
