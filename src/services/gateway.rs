use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{CardDetails, CardToken, ChargeOutcome, PaymentAttempt, PaymentTransaction, SecureSession};

/// Hosted payment page provider used by checkout.
pub trait SecureCheckoutGateway: Send + Sync {
    fn open_session(&self, attempt: &PaymentAttempt, return_url: &str) -> Result<SecureSession, String>;
}

/// Builds redirect URLs for a hosted page without talking to anything.
#[derive(Debug, Clone)]
pub struct SimulatedCheckoutGateway {
    base_url: String,
}

impl SimulatedCheckoutGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for SimulatedCheckoutGateway {
    fn default() -> Self {
        Self::new("https://secure-payment-gateway.com/pay")
    }
}

impl SecureCheckoutGateway for SimulatedCheckoutGateway {
    fn open_session(&self, attempt: &PaymentAttempt, return_url: &str) -> Result<SecureSession, String> {
        let external_id = format!("pgw_{}", Uuid::new_v4().simple());
        let redirect_url = format!(
            "{}?session_id={}&amount={:.2}&currency={}&return_url={}",
            self.base_url, external_id, attempt.amount, attempt.currency, return_url
        );
        info!(attempt_id = %attempt.id, external_id = %external_id, "Opened secure session");
        Ok(SecureSession {
            external_id,
            redirect_url,
        })
    }
}

/// Card processor used by the payments app.
pub trait CardGateway: Send + Sync {
    fn charge(&self, transaction: &PaymentTransaction, card: &CardDetails, save_method: bool) -> ChargeOutcome;

    fn tokenize(&self, card: &CardDetails) -> CardToken;

    /// Confirms a previous charge by its gateway reference.
    fn confirm(&self, reference: &str) -> Result<serde_json::Value, String>;
}

/// Deterministic processor: cards starting with 4111 are declined.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCardGateway;

impl MockCardGateway {
    const DECLINED_PREFIX: &'static str = "4111";
}

impl CardGateway for MockCardGateway {
    fn charge(&self, transaction: &PaymentTransaction, card: &CardDetails, save_method: bool) -> ChargeOutcome {
        if card.digits().starts_with(Self::DECLINED_PREFIX) {
            warn!(transaction_id = %transaction.id, last_four = %card.last_four(), "Card declined");
            return ChargeOutcome {
                approved: false,
                reference: format!("mock_fail_{}", Uuid::new_v4().simple()),
                message: "Card declined by issuer".to_string(),
                token: None,
            };
        }
        ChargeOutcome {
            approved: true,
            reference: format!("mock_success_{}", Uuid::new_v4().simple()),
            message: "Payment approved".to_string(),
            token: save_method.then(|| self.tokenize(card)),
        }
    }

    fn tokenize(&self, card: &CardDetails) -> CardToken {
        let digits = card.digits();
        let brand = match digits.chars().next() {
            Some('4') => "Visa",
            Some('5') => "Mastercard",
            _ => "Unknown",
        };
        CardToken {
            token: format!("mock_token_{}", Uuid::new_v4().simple()),
            brand: brand.to_string(),
            last_four: card.last_four(),
            expiry_month: card.expiry_month.parse().unwrap_or(1),
            expiry_year: card.expiry_year.parse().unwrap_or(2000),
        }
    }

    fn confirm(&self, reference: &str) -> Result<serde_json::Value, String> {
        if reference.contains("fail") {
            return Err(format!("Gateway rejected confirmation of '{reference}'"));
        }
        Ok(json!({ "reference": reference, "confirmed": true }))
    }
}
