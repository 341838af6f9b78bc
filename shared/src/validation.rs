//! Input validation functions
//!
//! Shape checks applied at the HTTP boundary before a request reaches the
//! authentication service. Email syntax uses the `validator` crate.

use crate::types::{LoginRequest, SignUpRequest};
use secrecy::ExposeSecret;
use std::fmt;
use validator::ValidateEmail;

pub const EMAIL_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const NAME_MAX_LEN: usize = 50;

/// A failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(format!("Email must be at most {} characters", EMAIL_MAX_LEN));
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    if len > PASSWORD_MAX_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be blank".to_string());
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(format!("Name must be at most {} characters", NAME_MAX_LEN));
    }
    Ok(())
}

/// Validate a signup request, reporting the first failing field
pub fn validate_signup(req: &SignUpRequest) -> Result<(), ValidationError> {
    validate_email(&req.email).map_err(|m| ValidationError::new("email", m))?;
    validate_password(req.password.expose_secret())
        .map_err(|m| ValidationError::new("password", m))?;
    validate_name(&req.name).map_err(|m| ValidationError::new("name", m))?;
    Ok(())
}

/// Validate a login request
///
/// Only presence is checked here; password length rules apply at signup
/// and a short password simply fails verification.
pub fn validate_login(req: &LoginRequest) -> Result<(), ValidationError> {
    validate_email(&req.email).map_err(|m| ValidationError::new("email", m))?;
    if req.password.expose_secret().is_empty() {
        return Err(ValidationError::new("password", "Password cannot be empty"));
    }
    Ok(())
}
