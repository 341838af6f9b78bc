//! Authentication extractor
//!
//! Validates the bearer access token on protected routes using the
//! pre-computed JWT keys from AppState.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

/// Authenticated caller extracted from a bearer token
///
/// Account status is not re-checked here: a token stays usable until it
/// expires.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        // Check Bearer prefix
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

        let claims = app_state.jwt().authenticate(token).map_err(|e| {
            debug!(reason = %e, "Bearer token rejected");
            ApiError::Unauthorized(format!("Invalid token: {}", e))
        })?;

        Ok(AuthUser {
            email: claims.sub,
            expires_at: claims.exp,
        })
    }
}
