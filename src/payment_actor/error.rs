use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Payment validation error: {0}")]
    ValidationError(String),
    #[error("Payment gateway failure: {0}")]
    GatewayDeclined(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Payment method already registered: {0}")]
    AlreadyExists(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(PaymentError);
