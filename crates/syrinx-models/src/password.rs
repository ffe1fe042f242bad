use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::{ModelError, ModelResult};

/// Opaque one-way hashing for account passwords.
pub trait PasswordHasher: Send + Sync {
    fn generate_salt(&self) -> String;

    /// Hashes `value` with `salt` into a self-describing token.
    fn hash(&self, value: &str, salt: &str) -> ModelResult<String>;

    fn verify(&self, value: &str, token: &str) -> bool;
}

/// Argon2id with default parameters, producing PHC strings.
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2Hasher {
    fn generate_salt(&self) -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    fn hash(&self, value: &str, salt: &str) -> ModelResult<String> {
        let salt = SaltString::from_b64(salt).map_err(|e| ModelError::Password(e.to_string()))?;
        argon2::PasswordHasher::hash_password(&self.argon2, value.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ModelError::Password(e.to_string()))
    }

    fn verify(&self, value: &str, token: &str) -> bool {
        PasswordHash::new(token)
            .map(|parsed| self.argon2.verify_password(value.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    }
}
