//! Caller-facing account operations.
//!
//! Results carry only [`AccountView`]s and every ledger error collapses to
//! the single [`Failure`] signal, so callers cannot tell a missing account
//! from a failed write. The cause is logged and counted before collapsing.

use crate::models::{AccountView, Balance};
use crate::services::credentials::Pin;
use crate::services::ledger::{LedgerEngine, LedgerError, OpenAccount};
use crate::services::metrics::ERRORS_TOTAL;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation failed")]
pub struct Failure;

fn collapse<T>(operation: &'static str, result: Result<T, LedgerError>) -> Result<T, Failure> {
    result.map_err(|e| {
        ERRORS_TOTAL.with_label_values(&[e.error_type()]).inc();
        match &e {
            LedgerError::Store(_) | LedgerError::Credential(_) => {
                error!(operation, error = %e, "Account operation failed")
            }
            _ => warn!(operation, error = %e, "Account operation rejected"),
        }
        Failure
    })
}

#[derive(Clone)]
pub struct AccountFacade {
    ledger: Arc<LedgerEngine>,
}

impl AccountFacade {
    pub fn new(ledger: Arc<LedgerEngine>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &LedgerEngine {
        &self.ledger
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountView>, Failure> {
        collapse("list_accounts", self.ledger.list_accounts().await)
    }

    pub async fn count_accounts(&self) -> Result<usize, Failure> {
        collapse("count_accounts", self.ledger.count_accounts().await)
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Option<AccountView>, Failure> {
        collapse("get_account", self.ledger.get_account(id).await)
    }

    pub async fn find_account_id_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Uuid>, Failure> {
        collapse(
            "find_account_id_by_number",
            self.ledger.find_account_id_by_number(account_number).await,
        )
    }

    pub async fn search_accounts(&self, key: &str) -> Result<Vec<AccountView>, Failure> {
        collapse("search_accounts", self.ledger.search_accounts(key).await)
    }

    pub fn sort_accounts(items: Vec<AccountView>, field: &str, order: &str) -> Vec<AccountView> {
        LedgerEngine::sort_accounts(items, field, order)
    }

    pub async fn is_phone_registered(&self, phone_number: &str) -> Result<bool, Failure> {
        collapse(
            "is_phone_registered",
            self.ledger.is_phone_registered(phone_number).await,
        )
    }

    pub async fn check_balance(&self, id: Uuid) -> Result<Option<Balance>, Failure> {
        collapse("check_balance", self.ledger.check_balance(id).await)
    }

    pub async fn adjust_balance(
        &self,
        id: Uuid,
        direction: &str,
        amount: Decimal,
    ) -> Result<Balance, Failure> {
        collapse(
            "adjust_balance",
            self.ledger.adjust_balance(id, direction, amount).await,
        )
    }

    pub async fn transfer(
        &self,
        source_id: Uuid,
        destination_account_number: &str,
        amount: Decimal,
    ) -> Result<(), Failure> {
        collapse(
            "transfer",
            self.ledger
                .transfer(source_id, destination_account_number, amount)
                .await,
        )
    }

    pub async fn is_secret_wrong(&self, id: Uuid, pin: &Pin) -> Result<bool, Failure> {
        collapse("is_secret_wrong", self.ledger.is_secret_wrong(id, pin).await)
    }

    pub async fn change_secret(&self, id: Uuid, pin: &Pin) -> Result<(), Failure> {
        collapse("change_secret", self.ledger.change_secret(id, pin).await)
    }

    pub async fn create_account(&self, input: OpenAccount) -> Result<AccountView, Failure> {
        collapse("create_account", self.ledger.create_account(input).await)
    }

    pub async fn update_phone_number(&self, id: Uuid, phone_number: &str) -> Result<(), Failure> {
        collapse(
            "update_phone_number",
            self.ledger.update_phone_number(id, phone_number).await,
        )
    }

    pub async fn delete_account(&self, id: Uuid) -> Result<(), Failure> {
        collapse("delete_account", self.ledger.delete_account(id).await)
    }
}
