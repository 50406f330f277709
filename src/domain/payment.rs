use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// A card payment and the gateway's answer to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub gateway_id: Option<String>,
    pub gateway_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TransactionCreate {
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
}

/// Raw card data as posted by the client. Never stored.
#[derive(Clone, Deserialize)]
pub struct CardDetails {
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvc: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("last_four", &self.last_four())
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    pub fn digits(&self) -> String {
        self.card_number.chars().filter(|c| !c.is_whitespace()).collect()
    }

    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.digits().chars().collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        let digits = self.digits();
        if !(13..=16).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err("Card number must have between 13 and 16 digits".into());
        }
        let month_ok = self.expiry_month.len() == 2
            && self
                .expiry_month
                .parse::<u8>()
                .map(|m| (1..=12).contains(&m))
                .unwrap_or(false);
        if !month_ok {
            return Err("Expiry month must be two digits between 01 and 12".into());
        }
        if self.expiry_year.len() != 4 || !self.expiry_year.chars().all(|c| c.is_ascii_digit()) {
            return Err("Expiry year must have four digits".into());
        }
        if !(3..=4).contains(&self.cvc.len()) || !self.cvc.chars().all(|c| c.is_ascii_digit()) {
            return Err("CVC must have three or four digits".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub user_id: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(flatten)]
    pub card: CardDetails,
    #[serde(default)]
    pub save_method: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Tokenized card returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardToken {
    pub token: String,
    pub brand: String,
    pub last_four: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
}

impl CardToken {
    pub fn expiration(&self) -> String {
        format!("{:02}/{}", self.expiry_month, self.expiry_year)
    }
}

/// What the gateway said about a charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeOutcome {
    pub approved: bool,
    pub reference: String,
    pub message: String,
    pub token: Option<CardToken>,
}

/// A tokenized card a user agreed to keep on file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethod {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub brand: String,
    pub last_four: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub consent_given: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodCreate {
    #[serde(default)]
    pub user_id: String,
    pub token: String,
    pub brand: String,
    pub last_four: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    #[serde(default)]
    pub consent_given: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl PaymentMethodCreate {
    pub fn from_token(user_id: &str, token: &CardToken) -> Self {
        Self {
            user_id: user_id.to_string(),
            token: token.token.clone(),
            brand: token.brand.clone(),
            last_four: token.last_four.clone(),
            expiry_month: token.expiry_month,
            expiry_year: token.expiry_year,
            consent_given: true,
            is_default: false,
        }
    }
}
