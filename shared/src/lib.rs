//! User Auth Shared Library
//!
//! This crate contains the wire types, the account role model, the
//! authentication error taxonomy and input validation used by the backend
//! and by any client that talks to it.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::Role;
pub use types::*;
