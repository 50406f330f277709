use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedbackError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Order {0} was already rated or skipped")]
    AlreadyRated(String),
    #[error("Score {score} is outside the allowed range {min}-{max}")]
    InvalidScore { score: u8, min: u8, max: u8 },
    #[error("Feedback validation error: {0}")]
    ValidationError(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(FeedbackError);
