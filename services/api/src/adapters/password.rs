//! services/api/src/adapters/password.rs
//!
//! Argon2 implementation of the `PasswordHasher` port.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use portal_core::ports::{PasswordHasher, PortError, PortResult};
use tracing::error;

#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                PortError::Unexpected("Failed to hash password".to_string())
            })
    }

    fn verify(&self, password: &str, hash: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            PortError::Unexpected("Authentication error".to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
