//! Validation utilities module
//!
//! Contains common validation functions for request input validation.
//! Includes both standalone validation functions and custom validators
//! compatible with the `validator` crate.

use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// Regex Patterns (compiled once and cached)
// ============================================================================

/// Returns a compiled email regex pattern
fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        // Stricter email pattern:
        // - Local part cannot start/end with dot
        // - No consecutive dots
        // - Requires at least one dot in domain (TLD)
        Regex::new(
            r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-](?:[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]*[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-])?@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
        ).expect("Invalid email regex pattern")
    })
}

/// Returns a compiled Israeli phone number regex pattern.
///
/// Accepts local (`0` prefix) or international (`+972` prefix) mobile and
/// landline numbers, with optional `-` or space separators.
fn israeli_phone_regex() -> &'static Regex {
    static ISRAELI_PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    ISRAELI_PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\+972|0)(?:[23489]|5[0-9]|7[2-9])\d{7}$")
            .expect("Invalid Israeli phone regex pattern")
    })
}

// ============================================================================
// Email Validation
// ============================================================================

/// Validates an email address format.
///
/// # Example
///
/// ```
/// use cabin_reservation_backend::utils::validation::validate_email;
///
/// assert!(validate_email("user@example.com"));
/// assert!(!validate_email("invalid-email"));
/// ```
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > 254 {
        return false;
    }

    if !email.contains('@') {
        return false;
    }

    if let Some(at_pos) = email.find('@') {
        let local_part = &email[..at_pos];
        if local_part.is_empty() || local_part.len() > 64 {
            return false;
        }
        if local_part.starts_with('.') || local_part.ends_with('.') {
            return false;
        }
        if local_part.contains("..") {
            return false;
        }
    }

    email_regex().is_match(email)
}

// ============================================================================
// Phone Validation
// ============================================================================

/// Validates an Israeli phone number format.
///
/// Accepts formats:
/// - Mobile: `05X-XXXXXXX` (05, 050-059 ranges)
/// - Landline: `0X-XXXXXXX` (area codes 2/3/4/8/9)
/// - With `+972` country code (replaces leading 0)
///
/// Dashes and spaces are stripped before matching.
///
/// # Example
///
/// ```
/// use cabin_reservation_backend::utils::validation::validate_phone;
///
/// assert!(validate_phone("052-1234567"));
/// assert!(validate_phone("+972521234567"));
/// assert!(!validate_phone("123"));
/// ```
pub fn validate_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return false;
    }

    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.is_empty() {
        return false;
    }

    israeli_phone_regex().is_match(&cleaned)
}

/// Normalizes an Israeli phone number to a standard `0`-prefixed local form.
///
/// Removes separators and converts a `+972` country code to a leading `0`.
/// Returns `None` if the result doesn't validate.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if let Some(rest) = cleaned.strip_prefix("+972") {
        format!("0{rest}")
    } else {
        cleaned
    };

    if validate_phone(&normalized) {
        Some(normalized)
    } else {
        None
    }
}

// ============================================================================
// Custom Validators for validator crate
// ============================================================================

/// Custom validator for email addresses.
///
/// Use with `#[validate(custom(function = "validate_email_custom"))]`
pub fn validate_email_custom(email: &str) -> Result<(), validator::ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_email");
        error.message = Some("Invalid email address format".into());
        Err(error)
    }
}

/// Custom validator for Israeli phone numbers.
///
/// Use with `#[validate(custom(function = "validate_phone_custom"))]`
pub fn validate_phone_custom(phone: &str) -> Result<(), validator::ValidationError> {
    if validate_phone(phone) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_phone");
        error.message = Some("Invalid Israeli phone number format".into());
        Err(error)
    }
}

/// Custom validator for non-empty strings (after trimming).
///
/// Use with `#[validate(custom(function = "validate_not_empty"))]`
pub fn validate_not_empty(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut error = validator::ValidationError::new("empty_value");
        error.message = Some("Value cannot be empty or whitespace only".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Custom validator for optional email addresses.
///
/// Use with `#[validate(custom(function = "validate_optional_email"))]`
pub fn validate_optional_email(email: &Option<String>) -> Result<(), validator::ValidationError> {
    match email {
        Some(e) if !e.is_empty() => validate_email_custom(e),
        _ => Ok(()),
    }
}

/// Custom validator for optional phone numbers.
///
/// Use with `#[validate(custom(function = "validate_optional_phone"))]`
pub fn validate_optional_phone(phone: &Option<String>) -> Result<(), validator::ValidationError> {
    match phone {
        Some(p) if !p.is_empty() => validate_phone_custom(p),
        _ => Ok(()),
    }
}

// ============================================================================
// Additional Utility Validators
// ============================================================================

/// Validates that a string contains only alphanumeric characters and underscores.
///
/// Useful for short codes, identifiers, etc.
pub fn validate_alphanumeric_underscore(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Custom validator for alphanumeric + underscore strings.
///
/// Use with `#[validate(custom(function = "validate_alphanumeric_underscore_custom"))]`
pub fn validate_alphanumeric_underscore_custom(
    value: &str,
) -> Result<(), validator::ValidationError> {
    if validate_alphanumeric_underscore(value) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_format");
        error.message =
            Some("Value must contain only alphanumeric characters and underscores".into());
        Err(error)
    }
}

/// Validates that a string is within a length range.
pub fn validate_length_range(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

// ============================================================================
// Tests
// ============================================================================
