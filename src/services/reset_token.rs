use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::domain::User;

/// Stateless password reset tokens.
///
/// A token is `{issued_at}-{signature}` where the signature covers the secret, the
/// user id and the current password hash, so changing the password invalidates it.
#[derive(Debug, Clone)]
pub struct ResetTokens {
    secret: String,
    timeout_secs: i64,
}

impl ResetTokens {
    pub fn new(secret: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            timeout_secs: i64::try_from(timeout_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn make_token(&self, user: &User) -> String {
        self.make_token_at(user, Utc::now().timestamp())
    }

    pub fn make_token_at(&self, user: &User, issued_at: i64) -> String {
        format!("{issued_at}-{}", self.signature(user, issued_at))
    }

    pub fn check_token(&self, user: &User, token: &str) -> bool {
        self.check_token_at(user, token, Utc::now().timestamp())
    }

    pub fn check_token_at(&self, user: &User, token: &str, now: i64) -> bool {
        let Some((issued, signature)) = token.split_once('-') else {
            return false;
        };
        let Ok(issued_at) = issued.parse::<i64>() else {
            return false;
        };
        if issued_at > now || now.saturating_sub(issued_at) > self.timeout_secs {
            return false;
        }
        constant_time_eq(
            signature.as_bytes(),
            self.signature(user, issued_at).as_bytes(),
        )
    }

    fn signature(&self, user: &User, issued_at: i64) -> String {
        let mut hasher = Sha256::new();
        for part in [
            self.secret.as_bytes(),
            user.id.as_bytes(),
            user.password_hash.as_bytes(),
            issued_at.to_string().as_bytes(),
        ] {
            hasher.update(part);
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Encodes a user id for use in a URL path segment.
pub fn encode_uid(user_id: &str) -> String {
    hex::encode(user_id)
}

pub fn decode_uid(uid: &str) -> Option<String> {
    hex::decode(uid).ok().and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(password_hash: &str) -> User {
        User {
            id: "user_1".into(),
            email: "ana@example.com".into(),
            username: "ana".into(),
            password_hash: password_hash.into(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = ResetTokens::new("s3cret", 3600);
        let ana = user("hash-a");
        let token = tokens.make_token_at(&ana, 1_000);
        assert!(tokens.check_token_at(&ana, &token, 1_500));
    }

    #[test]
    fn test_token_dies_with_password_change() {
        let tokens = ResetTokens::new("s3cret", 3600);
        let token = tokens.make_token_at(&user("hash-a"), 1_000);
        assert!(!tokens.check_token_at(&user("hash-b"), &token, 1_500));
    }

    #[test]
    fn test_token_expires() {
        let tokens = ResetTokens::new("s3cret", 3600);
        let ana = user("hash-a");
        let token = tokens.make_token_at(&ana, 1_000);
        assert!(tokens.check_token_at(&ana, &token, 4_600));
        assert!(!tokens.check_token_at(&ana, &token, 4_601));
    }

    #[test]
    fn test_malformed_tokens_fail() {
        let tokens = ResetTokens::new("s3cret", 3600);
        let ana = user("hash-a");
        for token in ["", "abc", "12-", "x-deadbeef", "1000-deadbeef"] {
            assert!(!tokens.check_token_at(&ana, token, 1_500), "{token}");
        }
    }

    #[test]
    fn test_uid_encoding() {
        assert_eq!(decode_uid(&encode_uid("user_42")).as_deref(), Some("user_42"));
        assert_eq!(decode_uid("zz"), None);
    }
}
