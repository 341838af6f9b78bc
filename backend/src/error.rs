//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting domain errors to appropriate HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use user_auth_shared::{
    validation::ValidationError, AuthError, ErrorDetail, ErrorResponse,
    INVALID_CREDENTIALS_MESSAGE,
};

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateIdentifier(_) => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            AuthError::Malformed | AuthError::InvalidSignature => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AuthError::PasswordTooLong(_) => {
                ApiError::Validation(ValidationError::new("password", err.to_string()))
            }
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                ApiError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.to_string(),
                Some(err.field.clone()),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::DuplicateIdentifier("a@x.com".into()), StatusCode::CONFLICT)]
    #[case(AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::Malformed, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::InvalidSignature, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::NotFound("a@x.com".into()), StatusCode::NOT_FOUND)]
    #[case(AuthError::PasswordTooLong(72), StatusCode::BAD_REQUEST)]
    #[case(AuthError::Configuration("short secret".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AuthError::Internal("db down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_auth_error_status(#[case] err: AuthError, #[case] status: StatusCode) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), status);
    }

    #[test]
    fn test_validation_error_status() {
        let error = ApiError::Validation(ValidationError::new("email", "Invalid email format"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_password_too_long_names_field() {
        match ApiError::from(AuthError::PasswordTooLong(72)) {
            ApiError::Validation(err) => {
                assert_eq!(err.field, "password");
                assert_eq!(err.message, "Password must be at most 72 bytes");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_credentials_message() {
        match ApiError::from(AuthError::InvalidCredentials) {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "Invalid email or password"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
