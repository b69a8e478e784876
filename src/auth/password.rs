/// Password hashing and verification
///
/// bcrypt with a configurable cost. Every hash carries its own random salt,
/// so hashing the same password twice yields different digests.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt only reads the first 72 bytes of its input
const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password with the given bcrypt cost.
///
/// # Errors
/// Returns an internal error if bcrypt rejects the cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a candidate password against a stored digest.
///
/// A mismatch is `Ok(false)`. Only an unreadable digest is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Spend roughly the time of a real verification when the account does not
/// exist, so login latency does not reveal which emails are registered.
pub fn burn_verification_time(password: &str, cost: u32) {
    let _ = hash(password, cost);
}

/// Registration policy: 8 to 72 bytes.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
