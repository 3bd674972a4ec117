//! Ledger engine: account lookups, balance mutation and transfers.
//!
//! Every operation re-reads the current record from the store. Updates are
//! last-write-wins and a transfer's legs are independent single-record
//! writes; nothing here locks or wraps calls in a transaction.

use crate::models::{
    Account, AccountView, Balance, BalanceError, BalanceOverflow, Direction, InsufficientFunds,
    NewAccount, SortField, SortOrder,
};
use crate::services::account_number::{AccountNumberGenerator, RandomAccountNumber};
use crate::services::credentials::{CredentialError, CredentialVerifier, Pin, PinHash};
use crate::services::metrics::{ACCOUNTS_CREATED, BALANCE_ADJUSTMENTS_TOTAL, TRANSFERS_TOTAL};
use crate::services::store::{AccountStore, StoreError};
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),

    #[error(transparent)]
    Overflow(#[from] BalanceOverflow),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl LedgerError {
    /// Label used for the error counter.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Store(_) => "store",
            Self::InsufficientFunds(_) => "insufficient_funds",
            Self::Overflow(_) => "overflow",
            Self::Credential(_) => "credential",
        }
    }

    fn account_not_found(id: Uuid) -> Self {
        Self::NotFound(format!("account {}", id))
    }
}

impl From<BalanceError> for LedgerError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InsufficientFunds(e) => Self::InsufficientFunds(e),
            BalanceError::Overflow(e) => Self::Overflow(e),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(msg) => AppError::NotFound(anyhow::anyhow!(msg)),
            LedgerError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            LedgerError::Store(StoreError::Conflict(msg)) => {
                AppError::Conflict(anyhow::anyhow!(msg))
            }
            LedgerError::Store(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            LedgerError::InsufficientFunds(e) => AppError::Unprocessable(anyhow::Error::new(e)),
            LedgerError::Overflow(e) => AppError::Unprocessable(anyhow::Error::new(e)),
            LedgerError::Credential(e) => AppError::InternalError(anyhow::Error::new(e)),
        }
    }
}

/// Decimal places an amount may carry. Matches the scale of the
/// `accounts.balance` column so both stores hold the same value.
pub const MAX_AMOUNT_SCALE: u32 = 4;

/// Product switches for behavior the ledger does not enforce by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// Reject debits that would take a balance below zero.
    pub enforce_sufficient_funds: bool,
    /// Debit the source account on transfer (otherwise only the
    /// destination is credited).
    pub debit_source_on_transfer: bool,
}

/// Input for opening an account.
#[derive(Debug, Clone)]
pub struct OpenAccount {
    pub name: String,
    pub mothers_name: String,
    pub email: String,
    pub phone_number: String,
    pub pin: Pin,
}

pub struct LedgerEngine {
    store: Arc<dyn AccountStore>,
    credentials: Arc<dyn CredentialVerifier>,
    account_numbers: Arc<dyn AccountNumberGenerator>,
    policy: LedgerPolicy,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn AccountStore>, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            store,
            credentials,
            account_numbers: Arc::new(RandomAccountNumber),
            policy: LedgerPolicy::default(),
        }
    }

    pub fn with_account_numbers(mut self, generator: Arc<dyn AccountNumberGenerator>) -> Self {
        self.account_numbers = generator;
        self
    }

    pub fn with_policy(mut self, policy: LedgerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    async fn require_account(&self, id: Uuid) -> Result<Account, LedgerError> {
        self.store
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_accounts(&self) -> Result<Vec<AccountView>, LedgerError> {
        let accounts = self.store.fetch_all().await?;
        Ok(accounts.iter().map(AccountView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn count_accounts(&self) -> Result<usize, LedgerError> {
        Ok(self.store.fetch_all().await?.len())
    }

    /// `Ok(None)` when no account has this id.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn get_account(&self, id: Uuid) -> Result<Option<AccountView>, LedgerError> {
        let account = self.store.fetch_by_id(id).await?;
        Ok(account.as_ref().map(AccountView::from))
    }

    /// First account, in store order, whose account number contains
    /// `account_number`. A partial number (prefix, suffix or any inner
    /// run of digits) resolves as long as it occurs in some account.
    #[instrument(skip(self))]
    pub async fn find_account_id_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Uuid>, LedgerError> {
        let accounts = self.store.fetch_all().await?;
        Ok(accounts
            .iter()
            .find(|a| a.account_number.contains(account_number))
            .map(|a| a.id))
    }

    /// Every account whose name contains `key`, in store order.
    #[instrument(skip(self))]
    pub async fn search_accounts(&self, key: &str) -> Result<Vec<AccountView>, LedgerError> {
        let accounts = self.store.fetch_all().await?;
        Ok(accounts
            .iter()
            .filter(|a| a.name.contains(key))
            .map(AccountView::from)
            .collect())
    }

    /// Sort by a named field. Unknown orders sort ascending; an unknown
    /// field leaves the input untouched. Ties keep their input order.
    pub fn sort_accounts(
        items: Vec<AccountView>,
        field: &str,
        order: &str,
    ) -> Vec<AccountView> {
        match SortField::parse(field) {
            Some(field) => Self::sort_accounts_by(items, field, SortOrder::parse(order)),
            None => {
                debug!(field, "Unknown sort field, keeping input order");
                items
            }
        }
    }

    pub fn sort_accounts_by(
        mut items: Vec<AccountView>,
        field: SortField,
        order: SortOrder,
    ) -> Vec<AccountView> {
        // `sort_by` is stable; reversing the comparator (not the output)
        // keeps ties in input order for descending sorts too.
        match order {
            SortOrder::Asc => items.sort_by(|a, b| field.compare(a, b)),
            SortOrder::Desc => items.sort_by(|a, b| field.compare(a, b).reverse()),
        }
        items
    }

    #[instrument(skip(self))]
    pub async fn is_phone_registered(&self, phone_number: &str) -> Result<bool, LedgerError> {
        Ok(self.store.fetch_by_phone(phone_number).await?.is_some())
    }

    // -------------------------------------------------------------------------
    // Balances
    // -------------------------------------------------------------------------

    /// `Ok(None)` when no account has this id.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn check_balance(&self, id: Uuid) -> Result<Option<Balance>, LedgerError> {
        let account = self.store.fetch_by_id(id).await?;
        Ok(account.map(|a| a.balance))
    }

    /// Adjust by a direction label ("debit"/"transfer" or "credit"/"top up").
    pub async fn adjust_balance(
        &self,
        id: Uuid,
        direction: &str,
        amount: Decimal,
    ) -> Result<Balance, LedgerError> {
        let direction = Direction::parse(direction).ok_or_else(|| {
            LedgerError::Validation(format!("unrecognized direction '{}'", direction))
        })?;
        self.apply(id, direction, amount).await
    }

    pub async fn credit_balance(&self, id: Uuid, amount: Decimal) -> Result<Balance, LedgerError> {
        self.apply(id, Direction::Credit, amount).await
    }

    pub async fn debit_balance(&self, id: Uuid, amount: Decimal) -> Result<Balance, LedgerError> {
        self.apply(id, Direction::Debit, amount).await
    }

    /// Read, compute and persist the new balance. Debits are only floored
    /// at zero when the policy enforces sufficient funds.
    #[instrument(skip(self), fields(account_id = %id, direction = %direction, amount = %amount))]
    pub async fn apply(
        &self,
        id: Uuid,
        direction: Direction,
        amount: Decimal,
    ) -> Result<Balance, LedgerError> {
        let result = self.apply_inner(id, direction, amount).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        BALANCE_ADJUSTMENTS_TOTAL
            .with_label_values(&[direction.as_str(), status])
            .inc();

        result
    }

    async fn apply_inner(
        &self,
        id: Uuid,
        direction: Direction,
        amount: Decimal,
    ) -> Result<Balance, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "amount must not be negative, got {}",
                amount
            )));
        }
        if amount.scale() > MAX_AMOUNT_SCALE {
            return Err(LedgerError::Validation(format!(
                "amount {} has more than {} decimal places",
                amount, MAX_AMOUNT_SCALE
            )));
        }

        let account = self.require_account(id).await?;

        let balance = match direction {
            Direction::Credit => account.balance.credit(amount)?,
            Direction::Debit if self.policy.enforce_sufficient_funds => {
                account.balance.checked_debit(amount)?
            }
            Direction::Debit => account.balance.debit(amount)?,
        };

        if balance.is_negative() {
            warn!(balance = %balance, "Balance is negative after debit");
        }

        self.store.update_balance(id, balance).await?;

        debug!(previous = %account.balance, balance = %balance, "Balance updated");

        Ok(balance)
    }

    // -------------------------------------------------------------------------
    // Transfers
    // -------------------------------------------------------------------------

    /// Move `amount` to the account whose number contains
    /// `destination_account_number`.
    ///
    /// Unless [`LedgerPolicy::debit_source_on_transfer`] is set only the
    /// destination is credited and the source balance is left unchanged.
    /// With the switch on, the source is debited first and re-credited if
    /// the destination credit fails.
    #[instrument(skip(self), fields(source_id = %source_id, amount = %amount))]
    pub async fn transfer(
        &self,
        source_id: Uuid,
        destination_account_number: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let result = self
            .transfer_inner(source_id, destination_account_number, amount)
            .await;

        match &result {
            Ok(()) => {
                TRANSFERS_TOTAL.with_label_values(&["ok"]).inc();
                info!("Transfer completed");
            }
            Err(_) => TRANSFERS_TOTAL.with_label_values(&["error"]).inc(),
        }

        result
    }

    async fn transfer_inner(
        &self,
        source_id: Uuid,
        destination_account_number: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let destination_id = self
            .find_account_id_by_number(destination_account_number)
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "destination account number '{}'",
                    destination_account_number
                ))
            })?;

        if !self.policy.debit_source_on_transfer {
            self.apply(destination_id, Direction::Credit, amount).await?;
            return Ok(());
        }

        self.apply(source_id, Direction::Debit, amount).await?;

        if let Err(e) = self.apply(destination_id, Direction::Credit, amount).await {
            warn!(
                destination_id = %destination_id,
                error = %e,
                "Destination credit failed, restoring source"
            );
            if let Err(restore) = self.apply(source_id, Direction::Credit, amount).await {
                error!(error = %restore, "Failed to restore source balance");
            }
            return Err(e);
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------

    /// `true` when `pin` does not match the stored hash. A missing account
    /// is reported as `NotFound`, not as a wrong PIN.
    #[instrument(skip(self, pin), fields(account_id = %id))]
    pub async fn is_secret_wrong(&self, id: Uuid, pin: &Pin) -> Result<bool, LedgerError> {
        let account = self.require_account(id).await?;
        let matched = self
            .credentials
            .verify(pin, &PinHash::new(account.secret_hash))?;
        Ok(!matched)
    }

    #[instrument(skip(self, pin), fields(account_id = %id))]
    pub async fn change_secret(&self, id: Uuid, pin: &Pin) -> Result<(), LedgerError> {
        self.require_account(id).await?;

        let hash = self.credentials.hash(pin)?;
        self.store.update_secret(id, hash.as_str()).await?;

        info!("PIN changed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Hash the PIN, draw an account number and persist with a zero balance.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_account(&self, input: OpenAccount) -> Result<AccountView, LedgerError> {
        let result = self.create_account_inner(input).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        ACCOUNTS_CREATED.with_label_values(&[status]).inc();

        result
    }

    async fn create_account_inner(&self, input: OpenAccount) -> Result<AccountView, LedgerError> {
        if input.name.trim().is_empty() {
            return Err(LedgerError::Validation("name must not be empty".to_string()));
        }

        let secret_hash = self.credentials.hash(&input.pin)?;
        let account_number = self.account_numbers.generate();

        let account = self
            .store
            .insert(NewAccount {
                name: input.name,
                mothers_name: input.mothers_name,
                email: input.email,
                phone_number: input.phone_number,
                secret_hash: secret_hash.into_string(),
                account_number,
                balance: Balance::ZERO,
            })
            .await?;

        info!(
            account_id = %account.id,
            account_number = %account.account_number,
            "Account created"
        );

        Ok(account.view())
    }

    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn update_phone_number(&self, id: Uuid, phone_number: &str) -> Result<(), LedgerError> {
        self.require_account(id).await?;
        self.store.update_phone(id, phone_number).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn delete_account(&self, id: Uuid) -> Result<(), LedgerError> {
        self.require_account(id).await?;
        self.store.remove(id).await?;
        info!("Account deleted");
        Ok(())
    }
}
