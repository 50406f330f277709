use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChatError {
    #[error("Chat session not found: {0}")]
    NotFound(String),
    #[error("Chat session {0} is closed")]
    SessionClosed(String),
    #[error("User already has an open chat session: {0}")]
    SessionExists(String),
    #[error("Chat validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(ChatError);
