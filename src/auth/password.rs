//! Password rules and bcrypt hashing.
//!
//! Hashing and verification run on the blocking pool.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Substrings that make a password too easy to guess (compared lowercase)
pub const WEAK_PASSWORD_FRAGMENTS: [&str; 2] = ["password", "123456"];

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least 6 characters long")]
    TooShort,

    #[error("Please, think of a more secure password")]
    Weak,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Check length and the weak-password denylist
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.trim().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    let lowered = password.to_lowercase();
    if WEAK_PASSWORD_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment)) {
        return Err(PasswordError::Weak);
    }
    Ok(())
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Compare a candidate against a stored hash. A malformed hash never matches.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            Ok(false)
        }
    }
}
