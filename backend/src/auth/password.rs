//! Password hashing using argon2 (bcrypt supported)
//!
//! Provides secure password hashing and verification.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. In async contexts use
//! the `*_async` variants, which run on the blocking thread pool.

use crate::config::PasswordConfig;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use user_auth_shared::AuthError;

const DECOY_PASSWORD: &str = "decoy-password-never-assigned";
const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;
/// bcrypt ignores input past this many bytes
const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Hash algorithm used for new hashes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Argon2id,
    Bcrypt,
}

/// Password hashing service
///
/// New hashes use the configured algorithm. Verification dispatches on the
/// stored hash's prefix, so argon2 and bcrypt hashes both keep verifying
/// after the setting changes.
#[derive(Clone)]
pub struct PasswordService {
    algorithm: HashAlgorithm,
    argon2: Argon2<'static>,
    bcrypt_cost: u32,
    /// Hash of a password no account has, for flattening login timing.
    decoy_hash: Arc<str>,
}

impl PasswordService {
    /// Build the service from configuration
    ///
    /// Computes one hash up front for the decoy, so construction costs
    /// about as much as a single `hash` call.
    pub fn new(config: &PasswordConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Configuration(format!("Invalid argon2 parameters: {}", e)))?;

        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&config.bcrypt_cost) {
            return Err(AuthError::Configuration(format!(
                "bcrypt cost must be between {} and {}",
                BCRYPT_MIN_COST, BCRYPT_MAX_COST
            )));
        }

        let mut service = Self {
            algorithm: config.algorithm,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            bcrypt_cost: config.bcrypt_cost,
            decoy_hash: Arc::from(""),
        };
        service.decoy_hash = Arc::from(service.hash(DECOY_PASSWORD)?);

        Ok(service)
    }

    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// Under bcrypt, passwords over [`BCRYPT_MAX_PASSWORD_BYTES`] are
    /// refused with `AuthError::PasswordTooLong` instead of truncated.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        match self.algorithm {
            HashAlgorithm::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = self
                    .argon2
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))?;
                Ok(hash.to_string())
            }
            HashAlgorithm::Bcrypt => {
                if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
                    return Err(AuthError::PasswordTooLong(BCRYPT_MAX_PASSWORD_BYTES));
                }
                bcrypt::hash(password, self.bcrypt_cost)
                    .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
            }
        }
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(&self, password: SecretString) -> Result<String, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(password.expose_secret()))
            .await
            .map_err(|e| AuthError::Internal(format!("Task join error: {}", e)))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `false` on mismatch and on any malformed or unrecognised
    /// hash; never errors.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if hash.starts_with("$argon2") {
            match PasswordHash::new(hash) {
                Ok(parsed) => self
                    .argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            }
        } else if is_bcrypt_hash(hash) {
            // Longer input would only be compared on its first 72 bytes
            password.len() <= BCRYPT_MAX_PASSWORD_BYTES
                && bcrypt::verify(password, hash).unwrap_or(false)
        } else {
            false
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(&self, password: SecretString, hash: String) -> bool {
        let service = self.clone();
        match tokio::task::spawn_blocking(move || service.verify(password.expose_secret(), &hash))
            .await
        {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Run a full verification against the decoy hash and discard the result
    ///
    /// Called when a login names an unknown email so that path costs the
    /// same as a wrong password.
    pub async fn verify_decoy(&self, password: SecretString) {
        let decoy = self.decoy_hash.to_string();
        let _ = self.verify_async(password, decoy).await;
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
