//! Argon2 password hashing.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::PortalError;

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("unreadable password hash: {e}");
            false
        }
    }
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_off_thread(password: String) -> Result<String, PortalError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PortalError::PasswordHash(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_off_thread(
    password: String,
    stored: String,
) -> Result<bool, PortalError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| PortalError::PasswordHash(e.to_string()))
}
