// ============================
// crates/gatekey-lib/src/validation.rs
// ============================
//! Input validation for identifiers and password material.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AuthError;

// Common validation constants
pub const MIN_IDENTIFIER_LENGTH: usize = 3;
pub const MAX_IDENTIFIER_LENGTH: usize = 64;
pub const MAX_PASSWORD_LENGTH: usize = 128;

// Identifiers double as storage keys, so the charset stays filesystem-safe.
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// Validate an identifier, returning it on success
pub fn validate_identifier(identifier: &str) -> Result<&str, AuthError> {
    if identifier.len() < MIN_IDENTIFIER_LENGTH || identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "identifier must be between {MIN_IDENTIFIER_LENGTH} and {MAX_IDENTIFIER_LENGTH} characters"
        )));
    }
    if !IDENTIFIER_REGEX.is_match(identifier) {
        return Err(AuthError::InvalidInput(
            "identifier may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }
    Ok(identifier)
}

/// Bounds-check raw password input before it reaches the hasher.
///
/// Complexity policy lives in `credential::password`; this only rejects
/// empty and oversized input.
pub fn validate_password_input(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password must not be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
