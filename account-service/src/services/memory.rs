//! In-process account store, insertion ordered.

use crate::models::{Account, Balance, NewAccount};
use crate::services::store::{AccountStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Account store backed by a `Vec`, used for local runs and tests.
///
/// Mirrors the Postgres schema constraints: account numbers are unique.
/// Writes can be made to fail on demand with [`MemoryStore::fail_writes`].
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<Vec<Account>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write return `StoreError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    async fn modify<F>(&self, id: Uuid, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Account),
    {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        // Missing rows are acknowledged without effect, like an UPDATE matching nothing.
        if let Some(account) = accounts.iter_mut().find(|a| a.id == id) {
            apply(account);
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.read().await.clone())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn fetch_by_phone(&self, phone_number: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .find(|a| a.phone_number == phone_number)
            .cloned())
    }

    #[instrument(skip(self, account), fields(account_number = %account.account_number))]
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;

        if accounts
            .iter()
            .any(|a| a.account_number == account.account_number)
        {
            return Err(StoreError::Conflict(format!(
                "account number '{}' already exists",
                account.account_number
            )));
        }

        let created = Account {
            id: Uuid::new_v4(),
            name: account.name,
            mothers_name: account.mothers_name,
            email: account.email,
            phone_number: account.phone_number,
            account_number: account.account_number,
            balance: account.balance,
            secret_hash: account.secret_hash,
            created_utc: Utc::now(),
        };
        accounts.push(created.clone());
        debug!(account_id = %created.id, "Account stored");

        Ok(created)
    }

    async fn update_phone(&self, id: Uuid, phone_number: &str) -> Result<(), StoreError> {
        let phone_number = phone_number.to_string();
        self.modify(id, move |a| a.phone_number = phone_number).await
    }

    async fn update_balance(&self, id: Uuid, balance: Balance) -> Result<(), StoreError> {
        self.modify(id, move |a| a.balance = balance).await
    }

    async fn update_secret(&self, id: Uuid, secret_hash: &str) -> Result<(), StoreError> {
        let secret_hash = secret_hash.to_string();
        self.modify(id, move |a| a.secret_hash = secret_hash).await
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_writable()?;
        self.accounts.write().await.retain(|a| a.id != id);
        Ok(())
    }
}
