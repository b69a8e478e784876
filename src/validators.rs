/// Input validators for registration data
/// - Length limits on every field
/// - Email format check
/// - Control characters rejected in names
/// - Currency codes normalised to upper-case ISO-4217 style

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 3;
const MAX_NAME_LENGTH: usize = 256;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref CURRENCY_REGEX: Regex = Regex::new(r"^[A-Za-z]{3}$").unwrap();
}

/// Validates an email address and returns it trimmed.
/// Case is preserved: stored emails are compared case-sensitively.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    // Local part is limited to 64 octets
    if let Some(at_pos) = trimmed.find('@') {
        if at_pos > 64 {
            return Err(ValidationError::SuspiciousContent("email"));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates a display name and returns it trimmed.
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name"));
    }

    Ok(trimmed.to_string())
}

/// Validates a three-letter currency code and returns it upper-cased.
pub fn is_valid_currency(currency: &str) -> Result<String, ValidationError> {
    let trimmed = currency.trim();

    if !CURRENCY_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("currency"));
    }

    Ok(trimmed.to_ascii_uppercase())
}
