use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackingError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already registered: {0}")]
    AlreadyExists(String),
    #[error("Tracking validation error: {0}")]
    ValidationError(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("You are not allowed to see this order")]
    Forbidden,
    #[error("The order has no courier assigned yet")]
    NoCourierAssigned,
    #[error("The courier can only be contacted while the order is in transit")]
    NotInTransit,
    #[error("The courier has no contact information available")]
    ContactUnavailable,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(TrackingError);
