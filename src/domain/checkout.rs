use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

/// One attempt at paying through the hosted secure environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentAttempt {
    pub id: String,
    pub order_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub status: AttemptStatus,
    pub external_id: Option<String>,
    pub secure_environment_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AttemptCreate {
    pub order_id: Option<String>,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: f64,
}

/// Outcome reported by the gateway when it redirects back.
#[derive(Debug, Clone, Default)]
pub struct GatewayCallback {
    pub succeeded: bool,
    pub external_id: Option<String>,
    pub error: Option<String>,
}

/// A session opened in the gateway's secure environment.
#[derive(Debug, Clone, PartialEq)]
pub struct SecureSession {
    pub external_id: String,
    pub redirect_url: String,
}
