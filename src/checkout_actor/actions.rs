use crate::domain::SecureSession;

/// State changes of a payment attempt. Each answers with the updated attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptAction {
    /// Records the gateway session the customer is redirected to.
    AttachSession(SecureSession),
    MarkSucceeded { external_id: Option<String> },
    MarkFailed { error: String },
    Cancel,
}
