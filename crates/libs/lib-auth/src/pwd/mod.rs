//! # Password Hashing
//!
//! Password hashing and verification using Argon2.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the salt and cost parameters travel with the hash and verification needs
//! nothing but the stored string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::debug;

// region:    --- Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to hash password: {0}")]
    Hash(String),
}
// endregion: --- Error

/// Hash a password using the Argon2 algorithm with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Hash(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against an Argon2 hash.
///
/// Returns `false` both on mismatch and when `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("[PWD] Stored hash could not be parsed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
