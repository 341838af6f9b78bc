//! Authentication routes
//!
//! Provides endpoints for signup, login and the caller's own profile.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use user_auth_shared::{
    validation::{validate_login, validate_signup},
    AuthResponse, LoginRequest, SignUpRequest, UserProfile,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/me", get(get_profile))
}

/// Register a new account
///
/// POST /api/auth/signup
async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    validate_signup(&req)?;
    let response = state.auth().sign_up(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    validate_login(&req)?;
    let response = state.auth().login(req).await?;
    Ok(Json(response))
}

/// Get current account profile (requires authentication)
///
/// GET /api/auth/me
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.auth().profile(&auth_user.email).await?;
    Ok(Json(profile))
}
