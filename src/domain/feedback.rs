use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingStatus {
    Pending,
    Rated,
    Skipped,
}

/// A customer order as seen by the feedback app: it is delivered, then rated or skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOrder {
    pub id: String,
    pub customer_id: String,
    pub delivery_status: DeliveryStatus,
    pub rating_status: RatingStatus,
    pub stars: Option<u8>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryOrderCreate {
    pub customer_id: String,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
}

/// One rating per order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRating {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DeliveryRatingCreate {
    pub order_id: String,
    pub customer_id: String,
    pub score: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub customer_id: String,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderComment {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderCommentCreate {
    pub order_id: String,
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub user_id: String,
    pub message: String,
}

/// Bounds applied when an order is rated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    pub min_stars: u8,
    pub max_stars: u8,
    pub allow_empty_comments: bool,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            min_stars: 1,
            max_stars: 5,
            allow_empty_comments: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Rated,
    Skipped,
    Error,
}

/// Uniform answer of the rate and skip operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingOutcome {
    pub success: bool,
    pub message: String,
    pub order_id: String,
    pub rating_status: OutcomeStatus,
}

/// Backs the rating confirmation view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub order_id: String,
    pub was_rated: bool,
    pub rating_status: RatingStatus,
    pub rating: Option<DeliveryRating>,
}
