use crate::actor_framework::Entity;
use crate::domain::{username_for, User, UserCreate, UserPatch};
use super::UserError;
use chrono::Utc;

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    const KIND: &'static str = "user";

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// The username is derived from the local part of the email.
    fn from_create_params(id: String, params: UserCreate) -> Result<Self, UserError> {
        if params.password_hash.is_empty() {
            return Err(UserError::ValidationError("Password hash is required".into()));
        }
        Ok(Self {
            id,
            username: username_for(&params.email),
            email: params.email,
            password_hash: params.password_hash,
            date_joined: Utc::now(),
        })
    }

    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(email) = patch.email {
            self.username = username_for(&email);
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }

    fn check_conflict(&self, other: &Self) -> Result<(), UserError> {
        if self.email.eq_ignore_ascii_case(&other.email) {
            return Err(UserError::AlreadyExists(self.email.clone()));
        }
        Ok(())
    }
}
