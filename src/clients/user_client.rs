use tracing::{debug, error, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{
    check_password_confirmation, check_password_policy, normalize_email, RegistrationForm, User,
    UserCreate, UserPatch, UserProfile,
};
use crate::events::{DomainEvent, EventBus};
use crate::services::PasswordHashing;
use crate::user_actor::UserError;

/// Client for account registration, login and password changes.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    hashing: PasswordHashing,
    events: EventBus,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>, hashing: PasswordHashing, events: EventBus) -> Self {
        Self {
            inner,
            hashing,
            events,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: RegistrationForm) -> Result<UserProfile, UserError> {
        info!("Processing registration");
        let email = normalize_email(&form.email).map_err(UserError::ValidationError)?;
        check_password_confirmation(&form.password, &form.password_confirm)
            .map_err(UserError::ValidationError)?;
        check_password_policy(&form.password).map_err(UserError::ValidationError)?;

        let password_hash = self.hash(form.password).await?;
        let id = self
            .inner
            .create(UserCreate {
                email,
                password_hash,
            })
            .await
            .inspect_err(|e| error!(error = %e, "Registration rejected"))?;
        let user = self.get_user(id).await?;

        info!(user_id = %user.id, "User registered");
        self.events.publish(DomainEvent::UserRegistered {
            user_id: user.id.clone(),
            email: user.email.clone(),
        });
        Ok(user.profile())
    }

    /// Wrong password and unknown email both answer `None`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let hashing = self.hashing.clone();
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hashing.verify(&password, &hash))
            .await
            .map_err(|e| UserError::HashingError(e.to_string()))?;
        Ok(verified.then_some(user))
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        let email = email.trim();
        Ok(self
            .inner
            .list()
            .await?
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email)))
    }

    /// Stores a new password after checking it against the policy.
    #[instrument(skip(self, password))]
    pub async fn set_password(&self, user_id: String, password: &str) -> Result<User, UserError> {
        debug!("Sending request");
        check_password_policy(password).map_err(UserError::ValidationError)?;
        let password_hash = self.hash(password.to_string()).await?;
        let user = self
            .inner
            .update(
                user_id,
                UserPatch {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user.id, "Password changed");
        Ok(user)
    }

    async fn hash(&self, password: String) -> Result<String, UserError> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hashing.hash(&password))
            .await
            .map_err(|e| UserError::HashingError(e.to_string()))?
    }
}

crate::impl_client_methods!(UserClient, inner => User, UserError, user);
