use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired password reset link")]
    InvalidResetLink,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Mail delivery failed: {0}")]
    MailError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(UserError);
