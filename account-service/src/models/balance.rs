//! Balance value type in the smallest currency unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned by [`Balance::checked_debit`] when the debit would go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient funds: balance {balance}, debit {amount}")]
pub struct InsufficientFunds {
    pub balance: Decimal,
    pub amount: Decimal,
}

/// The result of a credit or debit does not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("balance overflow: {balance} {op} {amount}")]
pub struct BalanceOverflow {
    pub balance: Decimal,
    pub op: &'static str,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
    #[error(transparent)]
    Overflow(#[from] BalanceOverflow),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Balance(Decimal);

impl Balance {
    pub const ZERO: Balance = Balance(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn credit(self, amount: Decimal) -> Result<Self, BalanceOverflow> {
        self.0
            .checked_add(amount)
            .map(Self)
            .ok_or(BalanceOverflow {
                balance: self.0,
                op: "+",
                amount,
            })
    }

    /// Subtract without a floor; the result may be negative.
    pub fn debit(self, amount: Decimal) -> Result<Self, BalanceOverflow> {
        self.0
            .checked_sub(amount)
            .map(Self)
            .ok_or(BalanceOverflow {
                balance: self.0,
                op: "-",
                amount,
            })
    }

    pub fn checked_debit(self, amount: Decimal) -> Result<Self, BalanceError> {
        let next = self.debit(amount)?;
        if next.is_negative() {
            return Err(InsufficientFunds {
                balance: self.0,
                amount,
            }
            .into());
        }
        Ok(next)
    }
}

impl From<Decimal> for Balance {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
