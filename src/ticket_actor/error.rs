use thiserror::Error;

/// Errors that can occur during ticket operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TicketError {
    #[error("Ticket not found: {0}")]
    NotFound(String),
    #[error("Ticket validation error: {0}")]
    ValidationError(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Duplicate ticket number: {0}")]
    DuplicateNumber(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(TicketError);
