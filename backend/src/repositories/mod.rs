//! Database repositories
//!
//! Provides the credential store interface and its implementations.

pub mod account;
pub mod memory;

pub use account::{AccountRecord, CredentialStore, NewAccount, PgCredentialStore, StoreError};
pub use memory::InMemoryCredentialStore;
