//! Account rules: registration checks, password rules, and reset links.
//!
//! Messages are shown verbatim on the register, login and reset forms.

use crate::error::CoreError;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Profile image assigned to users who never uploaded one.
pub const DEFAULT_PROFILE_IMAGE: &str = "/img/profile-placeholder.svg";

pub const MSG_MISSING_FIELDS: &str = "Please fill in all fields.";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password should be at least 6 characters long.";
pub const MSG_EMAIL_TAKEN: &str = "An account with that email already exists.";
pub const MSG_MISSING_CREDENTIALS: &str = "Please enter your email and password.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const MSG_INVALID_RESET_TOKEN: &str = "This password reset link is invalid or has expired.";

/// Canonical form of an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration form input.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Check a registration form. Uniqueness of the email is checked by the
/// caller against the database.
pub fn validate_registration(form: &Registration<'_>) -> Result<(), CoreError> {
    let fields = [form.username, form.email, form.password, form.confirm_password];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(CoreError::validation(MSG_MISSING_FIELDS));
    }
    validate_new_password(form.password, form.confirm_password)
}

/// Check a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm_password: &str) -> Result<(), CoreError> {
    if password != confirm_password {
        return Err(CoreError::validation(MSG_PASSWORD_MISMATCH));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::validation(MSG_PASSWORD_TOO_SHORT));
    }
    Ok(())
}

/// Link emailed to a user who asked for a password reset.
pub fn reset_link(app_base_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        app_base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}
