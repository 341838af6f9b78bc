//! In-memory credential store
//!
//! Used by tests and local runs without PostgreSQL. The uniqueness check
//! and the insert happen under one write lock.

use super::account::{AccountRecord, CredentialStore, NewAccount, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryCredentialStore {
    /// Number of stored accounts
    pub(crate) async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Set the active flag on an existing account
    pub(crate) async fn set_active(&self, email: &str, is_active: bool) -> bool {
        match self.accounts.write().await.get_mut(email) {
            Some(account) => {
                account.is_active = is_active;
                account.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.read().await.contains_key(email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn save(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(StoreError::UniqueViolation("uq_accounts_email".to_string()));
        }

        let now = Utc::now();
        let record = AccountRecord {
            id: Uuid::new_v4(),
            email: account.email,
            password_hash: account.password_hash,
            name: account.name,
            role: account.role,
            is_active: account.is_active,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(record.email.clone(), record.clone());

        Ok(record)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
