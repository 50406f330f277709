use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::user_actor::UserError;

/// Argon2id hashing with configurable cost.
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, UserError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| UserError::HashingError(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Returns a PHC string carrying algorithm, parameters and salt.
    pub fn hash(&self, raw: &str) -> Result<String, UserError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::HashingError(e.to_string()))
    }

    pub fn verify(&self, raw: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2().verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

#[cfg(test)]
pub fn fast_hashing() -> PasswordHashing {
    PasswordHashing::new(256, 1).expect("valid test params")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashing = fast_hashing();
        let hash = hashing.hash("Secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hashing.verify("Secret123", &hash));
        assert!(!hashing.verify("secret123", &hash));
        assert!(!hashing.verify("Secret123", "not-a-phc-string"));
    }

    #[test]
    fn test_salts_differ() {
        let hashing = fast_hashing();
        assert_ne!(hashing.hash("Secret123").unwrap(), hashing.hash("Secret123").unwrap());
    }
}
