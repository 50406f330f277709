use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const EMAIL_MAX_LEN: usize = 254;
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok()
});

/// Represents a registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Payload for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: String,
    pub password_hash: String,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Public representation of a user, never carrying the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            date_joined: self.date_joined,
        }
    }
}

/// Trims and lower-cases an email address, rejecting anything malformed.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err("Email is required".into());
    }
    if email.len() > EMAIL_MAX_LEN {
        return Err(format!("Email must be at most {EMAIL_MAX_LEN} characters"));
    }
    let valid = EMAIL_PATTERN
        .as_ref()
        .map(|pattern| pattern.is_match(&email))
        .unwrap_or(false);
    if !valid {
        return Err(format!("Invalid email address: {}", raw.trim()));
    }
    Ok(email)
}

/// The part of the address before `@`.
pub fn username_for(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

pub fn check_password_policy(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".into());
    }
    Ok(())
}

pub fn check_password_confirmation(password: &str, confirm: &str) -> Result<(), String> {
    if password != confirm {
        return Err("Passwords do not match".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(
            normalize_email("  Ana.Perez@Example.COM ").unwrap(),
            "ana.perez@example.com"
        );
    }

    #[test]
    fn test_malformed_emails_are_rejected() {
        for raw in ["", "plainaddress", "a@b", "a@b.c", "@example.com", "x y@example.com"] {
            assert!(normalize_email(raw).is_err(), "{raw} should be rejected");
        }
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(normalize_email(&long).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(check_password_policy("Secret123").is_ok());
        assert!(check_password_policy("Sh0rt").is_err());
        assert!(check_password_policy("nouppercase1").is_err());
        assert!(check_password_policy("NoDigitsHere").is_err());
    }

    #[test]
    fn test_username_is_local_part() {
        assert_eq!(username_for("ana.perez@example.com"), "ana.perez");
    }
}
