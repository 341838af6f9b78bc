//! Authentication module
//!
//! Provides JWT-based authentication with argon2 password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenError, MAX_TOKEN_TTL_SECS, MIN_SECRET_BYTES};
pub use middleware::AuthUser;
pub use password::{HashAlgorithm, PasswordService};
