use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Payment attempt not found: {0}")]
    NotFound(String),
    #[error("Checkout validation error: {0}")]
    ValidationError(String),
    #[error("Could not open the secure payment environment: {0}")]
    SecureEnvironmentFailure(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(CheckoutError);
