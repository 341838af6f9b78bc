//! JWT token generation and validation
//!
//! Provides access and refresh token management with pre-computed keys
//! for optimal performance. Tokens are HS256-signed and carry only the
//! subject, issue time and expiry; access and refresh tokens differ in
//! lifetime alone.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use user_auth_shared::AuthError;

/// Minimum secret length in bytes (the HS256 key size)
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 3600;

/// Token-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid JWT configuration: {0}")]
    Configuration(String),

    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => AuthError::Malformed,
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Expired => AuthError::InvalidCredentials,
            TokenError::Configuration(msg) => AuthError::Configuration(msg),
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    ///
    /// Rejects secrets shorter than [`MIN_SECRET_BYTES`].
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Configuration("JWT secret is empty".to_string()));
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(TokenError::Configuration(format!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                secret.len()
            )));
        }

        Ok(Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token lifetimes
#[derive(Debug, Clone, Copy)]
pub struct TokenExpiry {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// JWT service for token operations
///
/// Keys are wrapped in Arc for cheap cloning; the secret never changes
/// after construction.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiry: TokenExpiry,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(
        secret: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Result<Self, TokenError> {
        for (name, secs) in [
            ("access", access_token_expiry_secs),
            ("refresh", refresh_token_expiry_secs),
        ] {
            if secs <= 0 || secs > MAX_TOKEN_TTL_SECS {
                return Err(TokenError::Configuration(format!(
                    "{} token expiry must be between 1 and {} seconds, got {}",
                    name, MAX_TOKEN_TTL_SECS, secs
                )));
            }
        }

        Ok(Self::from_keys(
            JwtKeys::new(secret)?,
            TokenExpiry {
                access_token_expiry_secs,
                refresh_token_expiry_secs,
            },
        ))
    }

    fn from_keys(keys: JwtKeys, expiry: TokenExpiry) -> Self {
        // Expiry is a claim checked by callers, not by the decoder.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["sub".to_string(), "exp".to_string()]);

        Self {
            keys,
            expiry,
            validation: Arc::new(validation),
        }
    }

    /// Generate an access token for a subject
    #[inline]
    pub fn generate_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, ttl_from_secs(self.expiry.access_token_expiry_secs)?)
    }

    /// Generate a refresh token for a subject
    #[inline]
    pub fn generate_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, ttl_from_secs(self.expiry.refresh_token_expiry_secs)?)
    }

    /// Issue a token valid for `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Configuration("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify the signature and decode the claims
    ///
    /// Expired tokens parse successfully; use [`Self::is_expired`].
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }

    /// Whether the expiry lies strictly before the current time
    #[inline]
    pub fn is_expired(&self, claims: &Claims) -> bool {
        self.is_expired_at(claims, Utc::now())
    }

    #[inline]
    pub fn is_expired_at(&self, claims: &Claims, now: DateTime<Utc>) -> bool {
        claims.exp < now.timestamp()
    }

    /// Check a token belongs to `expected_subject` and is still live
    ///
    /// Every failure mode, including a malformed token, yields `false`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now())
    }

    pub fn validate_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.parse(token) {
            Ok(claims) => claims.sub == expected_subject && !self.is_expired_at(&claims, now),
            Err(_) => false,
        }
    }

    /// Parse a presented bearer token and reject it if expired
    pub fn authenticate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.parse(token)?;
        if self.is_expired(&claims) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.expiry.access_token_expiry_secs
    }
}

fn ttl_from_secs(secs: i64) -> Result<Duration, TokenError> {
    Duration::try_seconds(secs)
        .ok_or_else(|| TokenError::Configuration(format!("Token expiry out of range: {}s", secs)))
}
