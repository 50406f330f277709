use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::clients::UserClient;
use crate::domain::{check_password_confirmation, User, UserProfile};
use crate::events::{DomainEvent, EventBus};
use crate::services::{decode_uid, encode_uid, Mail, Mailer, ResetTokens};
use crate::user_actor::UserError;

/// Password reset by emailed link.
#[derive(Clone)]
pub struct PasswordResetClient {
    users: UserClient,
    tokens: ResetTokens,
    mailer: Arc<dyn Mailer>,
    site_url: String,
    events: EventBus,
}

impl PasswordResetClient {
    pub fn new(
        users: UserClient,
        tokens: ResetTokens,
        mailer: Arc<dyn Mailer>,
        site_url: impl Into<String>,
        events: EventBus,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            site_url: site_url.into(),
            events,
        }
    }

    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> Result<(), UserError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!("Reset requested for an unknown email");
            return Err(UserError::ValidationError(
                "There is no account registered with this email".into(),
            ));
        };
        let link = self.reset_link(&user);
        self.mailer
            .send(Mail {
                to: user.email.clone(),
                subject: "Password reset".into(),
                body: format!(
                    "Hello {},\n\nFollow this link to choose a new password:\n{link}\n",
                    user.username
                ),
            })
            .map_err(UserError::MailError)?;

        info!(user_id = %user.id, "Password reset link sent");
        self.events.publish(DomainEvent::PasswordResetRequested { user_id: user.id });
        Ok(())
    }

    pub fn reset_link(&self, user: &User) -> String {
        format!(
            "{}/authentication/password-reset/confirm/{}/{}/",
            self.site_url.trim_end_matches('/'),
            encode_uid(&user.id),
            self.tokens.make_token(user)
        )
    }

    #[instrument(skip(self, token))]
    pub async fn validate_link(&self, uid: &str, token: &str) -> Result<bool, UserError> {
        Ok(self.resolve(uid, token).await?.is_some())
    }

    #[instrument(skip(self, token, new_password, confirm_password))]
    pub async fn confirm_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<UserProfile, UserError> {
        let user = self
            .resolve(uid, token)
            .await?
            .ok_or(UserError::InvalidResetLink)?;
        check_password_confirmation(new_password, confirm_password)
            .map_err(UserError::ValidationError)?;
        let user = self.users.set_password(user.id, new_password).await?;
        info!(user_id = %user.id, "Password reset completed");
        Ok(user.profile())
    }

    /// The user a link belongs to, if the link is still valid.
    async fn resolve(&self, uid: &str, token: &str) -> Result<Option<User>, UserError> {
        let Some(user_id) = decode_uid(uid) else {
            return Ok(None);
        };
        let user = self.users.find_user(user_id).await?;
        Ok(user.filter(|user| self.tokens.check_token(user, token)))
    }
}
