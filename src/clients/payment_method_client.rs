use std::cmp::Reverse;

use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{CardToken, PaymentMethod, PaymentMethodCreate};
use crate::payment_actor::{PaymentError, PaymentMethodAction};

/// Client for stored cards. Every operation is scoped to the owning user.
#[derive(Clone)]
pub struct PaymentMethodClient {
    inner: ResourceClient<PaymentMethod>,
}

crate::impl_basic_client!(PaymentMethodClient, PaymentMethod, PaymentError, method);

impl PaymentMethodClient {
    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Stores a method. Answers `None` without consent, and the existing record
    /// when the user already stored this token, including one stored concurrently.
    #[instrument(skip(self), fields(user_id = %params.user_id))]
    pub async fn create(&self, params: PaymentMethodCreate) -> Result<Option<PaymentMethod>, PaymentError> {
        debug!("Sending request");
        if !params.consent_given {
            info!("Card not stored, no consent given");
            return Ok(None);
        }
        if let Some(existing) = self.stored(&params.user_id, &params.token).await? {
            return Ok(Some(existing));
        }
        let (user_id, token) = (params.user_id.clone(), params.token.clone());
        let id = match self.inner.create(params).await {
            Ok(id) => id,
            Err(PaymentError::AlreadyExists(reason)) => {
                return match self.stored(&user_id, &token).await? {
                    Some(existing) => {
                        debug!(method_id = %existing.id, "Token stored by a concurrent request");
                        Ok(Some(existing))
                    }
                    None => Err(PaymentError::AlreadyExists(reason)),
                };
            }
            Err(e) => return Err(e),
        };
        let method = self.get_method(id).await?;
        info!(method_id = %method.id, is_default = method.is_default, "Payment method stored");
        Ok(Some(method))
    }

    pub async fn save_token(&self, user_id: &str, token: &CardToken) -> Result<Option<PaymentMethod>, PaymentError> {
        self.create(PaymentMethodCreate::from_token(user_id, token)).await
    }

    /// Default first, then by brand.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: &str) -> Result<Vec<PaymentMethod>, PaymentError> {
        let mut methods = self.owned_by(user_id).await?;
        methods.sort_by(|a, b| {
            (!a.is_default, &a.brand, a.created_at).cmp(&(!b.is_default, &b.brand, b.created_at))
        });
        Ok(methods)
    }

    /// Default first, then newest.
    #[instrument(skip(self))]
    pub async fn saved(&self, user_id: &str) -> Result<Vec<PaymentMethod>, PaymentError> {
        let mut methods = self.owned_by(user_id).await?;
        methods.sort_by_key(|m| (!m.is_default, Reverse(m.created_at)));
        Ok(methods)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: &str, id: String) -> Result<(), PaymentError> {
        let method = self.owned(user_id, id).await?;
        self.inner.delete(method.id.clone()).await?;
        info!(method_id = %method.id, "Payment method deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_default(&self, user_id: &str, id: String) -> Result<PaymentMethod, PaymentError> {
        let method = self.owned(user_id, id).await?;
        self.inner.perform_action(method.id, PaymentMethodAction::SetDefault).await
    }

    /// Someone else's method is reported as missing.
    async fn owned(&self, user_id: &str, id: String) -> Result<PaymentMethod, PaymentError> {
        match self.find_method(id.clone()).await? {
            Some(method) if method.user_id == user_id => Ok(method),
            _ => Err(PaymentError::NotFound(format!("payment method '{id}'"))),
        }
    }

    async fn stored(&self, user_id: &str, token: &str) -> Result<Option<PaymentMethod>, PaymentError> {
        Ok(self
            .inner
            .list()
            .await?
            .into_iter()
            .find(|m| m.user_id == user_id && m.token == token))
    }

    async fn owned_by(&self, user_id: &str) -> Result<Vec<PaymentMethod>, PaymentError> {
        Ok(self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|m| m.user_id == user_id)
            .collect())
    }
}
