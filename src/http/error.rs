use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::catalog_actor::CatalogError;
use crate::chat_actor::ChatError;
use crate::checkout_actor::CheckoutError;
use crate::feedback_actor::FeedbackError;
use crate::payment_actor::PaymentError;
use crate::ticket_actor::TicketError;
use crate::tracking_actor::TrackingError;
use crate::user_actor::UserError;

/// An error rendered as `{"error": message}` with a matching status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn internal(message: String) -> Self {
        error!(%message, "Request failed inside the system");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            UserError::AlreadyExists(_) => Self::new(StatusCode::CONFLICT, message),
            UserError::ValidationError(_) | UserError::InvalidResetLink => Self::bad_request(message),
            UserError::InvalidCredentials => Self::unauthorized(message),
            UserError::HashingError(_)
            | UserError::MailError(_)
            | UserError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            CatalogError::AlreadyExists(_) => Self::new(StatusCode::CONFLICT, message),
            CatalogError::InsufficientStock { .. }
            | CatalogError::InvalidQuantity(_)
            | CatalogError::ValidationError(_)
            | CatalogError::CraftingFailed(_) => Self::bad_request(message),
            CatalogError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let message = err.to_string();
        match err {
            CheckoutError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            CheckoutError::ValidationError(_) | CheckoutError::InvalidTransition(_) => {
                Self::bad_request(message)
            }
            CheckoutError::SecureEnvironmentFailure(_) => Self::new(StatusCode::BAD_GATEWAY, message),
            CheckoutError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err {
            PaymentError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            PaymentError::AlreadyExists(_) => Self::new(StatusCode::CONFLICT, message),
            PaymentError::ValidationError(_)
            | PaymentError::GatewayDeclined(_)
            | PaymentError::InvalidTransition(_) => Self::bad_request(message),
            PaymentError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        let message = err.to_string();
        match err {
            FeedbackError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            FeedbackError::AlreadyRated(_) => Self::new(StatusCode::CONFLICT, message),
            FeedbackError::InvalidScore { .. }
            | FeedbackError::ValidationError(_)
            | FeedbackError::InvalidTransition(_) => Self::bad_request(message),
            FeedbackError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        let message = err.to_string();
        match err {
            TicketError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            TicketError::DuplicateNumber(_) => Self::new(StatusCode::CONFLICT, message),
            TicketError::ValidationError(_) | TicketError::InvalidStatus(_) => {
                Self::bad_request(message)
            }
            TicketError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        let message = err.to_string();
        match err {
            TrackingError::Forbidden => Self::new(StatusCode::FORBIDDEN, message),
            TrackingError::NotFound(_)
            | TrackingError::NoCourierAssigned
            | TrackingError::ContactUnavailable => Self::new(StatusCode::NOT_FOUND, message),
            TrackingError::AlreadyExists(_) => Self::new(StatusCode::CONFLICT, message),
            TrackingError::ValidationError(_)
            | TrackingError::InvalidTransition(_)
            | TrackingError::NotInTransit => Self::bad_request(message),
            TrackingError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let message = err.to_string();
        match err {
            ChatError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            ChatError::SessionExists(_) => Self::new(StatusCode::CONFLICT, message),
            ChatError::SessionClosed(_) | ChatError::ValidationError(_) => Self::bad_request(message),
            ChatError::ActorCommunicationError(_) => Self::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(TrackingError::Forbidden).status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(TrackingError::NotInTransit).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(FeedbackError::AlreadyRated("o".into())).status,
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::from(UserError::InvalidCredentials).status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(CatalogError::NotFound("product 'p'".into())).status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(ChatError::ActorCommunicationError("channel closed".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
