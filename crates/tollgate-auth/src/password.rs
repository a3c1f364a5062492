//! Password hashing and verification (Argon2id, PHC string format)

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, SaltString};
use argon2::Argon2;

use crate::error::AuthError;

/// Checks a candidate password against a stored hash
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, AuthError>;
}

/// Argon2 implementation of [`PasswordVerifier`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl PasswordVerifier for Argon2Verifier {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, AuthError> {
        verify_password(candidate, stored_hash)
    }
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check that a stored hash is a well-formed PHC string
pub fn validate_hash(hash: &str) -> Result<(), AuthError> {
    PasswordHash::new(hash)
        .map(|_| ())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a PHC-formatted hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(argon2::PasswordVerifier::verify_password(
        &Argon2::default(),
        password.as_bytes(),
        &parsed,
    )
    .is_ok())
}
