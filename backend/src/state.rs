//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys and the decoy hash are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::{JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::CredentialStore;
use crate::services::AuthService;
use std::sync::Arc;
use user_auth_shared::AuthError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Account storage
    pub store: Arc<dyn CredentialStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Authentication service wired to the same store and keys
    pub auth: AuthService,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails with `AuthError::Configuration` when the JWT secret is too
    /// short or the password parameters are invalid. Call once at startup.
    pub fn new(store: Arc<dyn CredentialStore>, config: AppConfig) -> Result<Self, AuthError> {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        )?;
        let passwords = PasswordService::new(&config.password)?;
        let auth = AuthService::new(store.clone(), jwt.clone(), passwords);

        Ok(Self {
            store,
            config: Arc::new(config),
            jwt,
            auth,
        })
    }

    /// Get a reference to the credential store
    #[inline]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Get a reference to the authentication service
    #[inline]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordConfig;
    use crate::repositories::InMemoryCredentialStore;

    fn test_config() -> AppConfig {
        AppConfig {
            password: PasswordConfig::fast(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_state_clone_is_cheap() {
        let state = AppState::new(Arc::new(InMemoryCredentialStore::new()), test_config()).unwrap();

        // Clone should be O(1) - just Arc increments
        let _cloned = state.clone();
    }

    #[test]
    fn test_jwt_service_is_precomputed() {
        let state = AppState::new(Arc::new(InMemoryCredentialStore::new()), test_config()).unwrap();

        let token = state.jwt().generate_access_token("a@x.com").unwrap();
        assert!(!token.is_empty());
        assert!(state.auth().jwt().validate(&token, "a@x.com"));
    }

    #[test]
    fn test_short_secret_is_configuration_error() {
        let mut config = test_config();
        config.jwt.secret = "too-short".to_string();

        let result = AppState::new(Arc::new(InMemoryCredentialStore::new()), config);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_oversized_refresh_expiry_fails_before_any_signup() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let mut config = test_config();
        config.jwt.refresh_token_expiry_secs = i64::MAX;

        let result = AppState::new(store.clone(), config);

        assert!(matches!(result, Err(AuthError::Configuration(_))));
        assert_eq!(store.len().await, 0);
    }
}
