//! Persistence contract for account records.

use crate::models::{Account, Balance, NewAccount};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed storage of accounts. Every call reads or writes the current
/// record; implementations keep no cross-call caches and each write is
/// atomic for a single record only.
///
/// `fetch_all` must return accounts in a stable store order, which is the
/// order lookups by account number and name searches scan in.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Account>, StoreError>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn fetch_by_phone(&self, phone_number: &str) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn update_phone(&self, id: Uuid, phone_number: &str) -> Result<(), StoreError>;

    async fn update_balance(&self, id: Uuid, balance: Balance) -> Result<(), StoreError>;

    async fn update_secret(&self, id: Uuid, secret_hash: &str) -> Result<(), StoreError>;

    async fn remove(&self, id: Uuid) -> Result<(), StoreError>;
}
