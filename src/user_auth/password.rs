//! Password hashing and verification (argon2, PHC string format).
//!
//! A stored hash carries its own algorithm, parameters and salt, so
//! verification never needs anything but the hash string. Plaintext is never
//! logged.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),

    #[error("password hashing failed: {0}")]
    Hashing(password_hash::Error),
}

/// Hash a new password with a fresh random salt
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hashing)
}

/// Check `plaintext` against a stored PHC hash.
///
/// `Ok(false)` is a mismatch; `Err` means the stored hash itself is unusable.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::MalformedHash)?;
    if plaintext.is_empty() {
        return Ok(false);
    }

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e)),
    }
}
