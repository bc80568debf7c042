//! Registration input validation.
//!
//! All checks run to completion so callers get every field error at once.

use validator::ValidateEmail;

use crate::error::{CoreError, FieldError};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 64;
pub const PASSWORD_MIN_LENGTH: usize = 6;
/// Upper bound keeps argon2 input size sane.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validate a username: length bounds and `[A-Za-z0-9_.-]` only.
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
        return Err(format!(
            "Username must be between {USERNAME_MIN_LENGTH} and {USERNAME_MAX_LENGTH} characters"
        ));
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(format!("Username contains invalid character '{c}'"));
    }
    Ok(())
}

/// Validate that a password meets minimum strength requirements.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LENGTH} characters long"
        ));
    }
    if len > PASSWORD_MAX_LENGTH {
        return Err(format!(
            "Password must be at most {PASSWORD_MAX_LENGTH} characters long"
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.validate_email() {
        Ok(())
    } else {
        Err("Email address is not valid".to_string())
    }
}

/// Validate all registration fields, collecting one [`FieldError`] per bad field.
pub fn validate_registration(username: &str, password: &str, email: &str) -> Result<(), CoreError> {
    let checks = [
        ("username", validate_username(username)),
        ("password", validate_password_strength(password)),
        ("email", validate_email(email)),
    ];

    let fields: Vec<FieldError> = checks
        .into_iter()
        .filter_map(|(field, result)| result.err().map(|msg| FieldError::new(field, msg)))
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidInput {
            message: "Registration request failed validation".to_string(),
            fields,
        })
    }
}
