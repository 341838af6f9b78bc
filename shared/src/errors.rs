//! Error types for the authentication service

use thiserror::Error;

/// Message used for every failed login, whichever half of the credential
/// was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Authentication error kinds
///
/// This is a closed set. The HTTP layer maps each kind to a status code;
/// token failures are collapsed to "not authenticated" before they reach
/// a caller that only needs a yes/no answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already exists: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    /// Password longer than the configured hash algorithm can take.
    #[error("Password must be at most {0} bytes")]
    PasswordTooLong(usize),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store or hashing infrastructure failure that is none of the above.
    #[error("Internal error: {0}")]
    Internal(String),
}
