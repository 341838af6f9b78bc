//! Authentication service: signup, login and account lookup
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - JWT service holds pre-computed keys
//!
//! Each call either fails before any token is issued or returns a full
//! token pair. Login failures are indistinguishable to the caller whether
//! the email is unknown or the password is wrong.

use crate::auth::{JwtService, PasswordService};
use crate::repositories::{AccountRecord, CredentialStore, NewAccount, StoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};
use user_auth_shared::{AuthError, AuthResponse, LoginRequest, SignUpRequest, UserProfile};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt: JwtService,
    passwords: PasswordService,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt: JwtService,
        passwords: PasswordService,
    ) -> Self {
        Self {
            store,
            jwt,
            passwords,
        }
    }

    /// Register a new account and issue its first token pair
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthResponse, AuthError> {
        let SignUpRequest {
            email,
            password,
            name,
        } = request;

        if self.store.exists_by_email(&email).await? {
            debug!(email = %email, "Signup rejected: email already registered");
            return Err(AuthError::DuplicateIdentifier(email));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = self.passwords.hash_async(password).await?;

        let account = match self
            .store
            .save(NewAccount::new(email.clone(), password_hash, name))
            .await
        {
            Ok(account) => account,
            // Lost a concurrent signup race for the same email
            Err(StoreError::UniqueViolation(constraint)) => {
                debug!(email = %email, constraint = %constraint, "Signup lost uniqueness race");
                return Err(AuthError::DuplicateIdentifier(email));
            }
            Err(e) => return Err(e.into()),
        };

        info!(account_id = %account.id, email = %account.email, "Account created");

        self.issue_tokens(&account)
    }

    /// Verify credentials and issue a token pair
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let LoginRequest { email, password } = request;

        let account = match self.store.find_by_email(&email).await? {
            Some(account) => account,
            None => {
                self.passwords.verify_decoy(password).await;
                debug!(email = %email, reason = "unknown_email", "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        // Verify password on blocking thread pool (CPU-intensive)
        let valid = self
            .passwords
            .verify_async(password, account.password_hash.clone())
            .await;

        if !valid {
            debug!(email = %email, reason = "password_mismatch", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            warn!(account_id = %account.id, "Login attempt on inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        info!(account_id = %account.id, "Login succeeded");

        self.issue_tokens(&account)
    }

    /// Look up an account by email
    pub async fn get_by_email(&self, email: &str) -> Result<AccountRecord, AuthError> {
        self.store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NotFound(email.to_string()))
    }

    /// Public profile for an account
    pub async fn profile(&self, email: &str) -> Result<UserProfile, AuthError> {
        Ok(self.get_by_email(email).await?.profile())
    }

    fn issue_tokens(&self, account: &AccountRecord) -> Result<AuthResponse, AuthError> {
        let access_token = self.jwt.generate_access_token(&account.email)?;
        let refresh_token = self.jwt.generate_refresh_token(&account.email)?;

        Ok(AuthResponse::bearer(
            access_token,
            refresh_token,
            self.jwt.access_token_expiry_secs(),
            account.email.clone(),
            account.name.clone(),
        ))
    }

    #[cfg(test)]
    pub(crate) fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordConfig;
    use crate::repositories::InMemoryCredentialStore;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use user_auth_shared::Role;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn jwt() -> JwtService {
        JwtService::new(SECRET, 900, 86400).unwrap()
    }

    fn service_with(store: Arc<dyn CredentialStore>) -> AuthService {
        AuthService::new(
            store,
            jwt(),
            PasswordService::new(&PasswordConfig::fast()).unwrap(),
        )
    }

    fn signup(email: &str, password: &str, name: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: SecretString::new(password.to_string()),
            name: name.to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: SecretString::new(password.to_string()),
        }
    }

    /// Store that reports every email as free, then refuses the insert,
    /// as when a concurrent signup commits first.
    #[derive(Default)]
    struct RacingStore {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl CredentialStore for RacingStore {
        async fn exists_by_email(&self, _email: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<AccountRecord>, StoreError> {
            Ok(None)
        }

        async fn save(&self, _account: NewAccount) -> Result<AccountRecord, StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::UniqueViolation("uq_accounts_email".to_string()))
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Store whose backend is down
    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn exists_by_email(&self, _email: &str) -> Result<bool, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<AccountRecord>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn save(&self, _account: NewAccount) -> Result<AccountRecord, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sign_up_issues_tokens() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service = service_with(store.clone());

        let response = service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();

        assert_eq!(response.email, "test@example.com");
        assert_eq!(response.name, "Test User");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 900);
        assert!(service.jwt().validate(&response.access_token, "test@example.com"));
        assert!(service.jwt().validate(&response.refresh_token, "test@example.com"));

        let stored = store.find_by_email("test@example.com").await.unwrap().unwrap();
        assert_eq!(stored.role, Role::User);
        assert!(stored.is_active);
        assert_ne!(stored.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_persists_nothing() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service = service_with(store.clone());

        service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();
        let result = service
            .sign_up(signup("test@example.com", "otherpassword", "Other"))
            .await;

        assert_eq!(
            result.unwrap_err(),
            AuthError::DuplicateIdentifier("test@example.com".to_string())
        );
        assert_eq!(store.len().await, 1);
        let stored = store.find_by_email("test@example.com").await.unwrap().unwrap();
        assert_eq!(stored.name, "Test User");
    }

    #[tokio::test]
    async fn test_sign_up_race_maps_to_duplicate() {
        let store = Arc::new(RacingStore::default());
        let service = service_with(store.clone());

        let result = service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await;

        assert_eq!(
            result.unwrap_err(),
            AuthError::DuplicateIdentifier("test@example.com".to_string())
        );
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_sign_ups_create_one_account() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service = service_with(store.clone());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .sign_up(signup("race@example.com", "password123", "Racer"))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_eq!(
                    e,
                    AuthError::DuplicateIdentifier("race@example.com".to_string())
                ),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));
        service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();

        let response = service
            .login(login("test@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(response.email, "test@example.com");
        assert_eq!(response.name, "Test User");
        assert!(service.jwt().validate(&response.access_token, "test@example.com"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));
        service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();

        let wrong_password = service
            .login(login("test@example.com", "wrongpassword"))
            .await
            .unwrap_err();
        let unknown_email = service
            .login(login("nobody@example.com", "password123"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_rejects_inactive_account() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service = service_with(store.clone());
        service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();
        store.set_active("test@example.com", false).await;

        let result = service.login(login("test@example.com", "password123")).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_tokens_outlive_deactivation() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service = service_with(store.clone());
        let response = service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();

        store.set_active("test@example.com", false).await;

        assert!(service.jwt().validate(&response.access_token, "test@example.com"));
    }

    #[tokio::test]
    async fn test_get_by_email() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));
        service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await
            .unwrap();

        let account = service.get_by_email("test@example.com").await.unwrap();
        assert_eq!(account.email, "test@example.com");
        assert_eq!(account.name, "Test User");

        let profile = service.profile("test@example.com").await.unwrap();
        assert_eq!(profile.id, account.id.to_string());
    }

    #[tokio::test]
    async fn test_get_by_email_not_found() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));

        let result = service.get_by_email("nonexistent@example.com").await;
        assert_eq!(
            result.unwrap_err(),
            AuthError::NotFound("nonexistent@example.com".to_string())
        );
        assert_eq!(
            AuthError::NotFound("nonexistent@example.com".to_string()).to_string(),
            "User not found: nonexistent@example.com"
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let service = service_with(Arc::new(BrokenStore));

        let result = service
            .sign_up(signup("test@example.com", "password123", "Test User"))
            .await;
        assert!(matches!(result, Err(AuthError::Internal(_))));

        let result = service.login(login("test@example.com", "password123")).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_scenario_signup_duplicate_and_logins() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));

        let created = service
            .sign_up(signup("a@x.com", "longpassword1", "A"))
            .await
            .unwrap();
        assert_eq!(created.email, "a@x.com");

        assert_eq!(
            service
                .sign_up(signup("a@x.com", "longpassword1", "A"))
                .await
                .unwrap_err(),
            AuthError::DuplicateIdentifier("a@x.com".to_string())
        );

        let logged_in = service.login(login("a@x.com", "longpassword1")).await.unwrap();
        assert_eq!(logged_in.email, created.email);
        assert_eq!(logged_in.name, created.name);

        let wrong = service.login(login("a@x.com", "wrong")).await.unwrap_err();
        let missing = service.login(login("nobody@x.com", "x")).await.unwrap_err();
        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(missing, AuthError::InvalidCredentials);
        assert_eq!(wrong.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_bcrypt_signup_refuses_overlong_password_before_saving() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let passwords = PasswordService::new(&PasswordConfig {
            algorithm: crate::auth::HashAlgorithm::Bcrypt,
            ..PasswordConfig::fast()
        })
        .unwrap();
        let service = AuthService::new(store.clone(), jwt(), passwords);
        let password = format!("{}REAL-SUFFIX", "a".repeat(72));

        let err = service
            .sign_up(signup("a@x.com", &password, "A"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::PasswordTooLong(72));
        assert_eq!(store.len().await, 0);
    }
}
