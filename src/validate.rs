use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 40;

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 255 && EMAIL_RE.is_match(email)
}

pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= 255 && SLUG_RE.is_match(slug)
}

pub fn email(value: &str) -> Result<(), ApiError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(ApiError::validation("Invalid email"))
    }
}

pub fn slug(value: &str) -> Result<(), ApiError> {
    if is_valid_slug(value) {
        Ok(())
    } else {
        Err(ApiError::validation(
            "slug must be lowercase letters, digits and single hyphens",
        ))
    }
}

pub fn password(field: &str, value: &str) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < PASSWORD_MIN {
        return Err(ApiError::validation(format!(
            "{field} must be at least {PASSWORD_MIN} characters"
        )));
    }
    if len > PASSWORD_MAX {
        return Err(ApiError::validation(format!(
            "{field} must be at most {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

/// Length in characters, upper bound only.
pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn non_empty(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    max_len(field, value, max)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
