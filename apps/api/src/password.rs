//! Password hashing with Argon2id.
//!
//! Hashing is deliberately slow, so both operations run on the blocking
//! thread pool instead of an async worker.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ApiError;

/// Hashes a password into a salted PHC string.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Hashing task failed: {}", e)))?
}

/// Checks `password` against a stored PHC string.
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| ApiError::internal(format!("Stored hash is malformed: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ApiError::internal(format!("Failed to verify password: {}", e))),
        }
    })
    .await
    .map_err(|e| ApiError::internal(format!("Verification task failed: {}", e)))?
}
