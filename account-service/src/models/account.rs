//! Account record and its public projection.

use super::Balance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Direction of a balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Parse a direction label. Accepts the teller labels "transfer"
    /// (debit) and "top up" (credit) alongside the plain names.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "debit" | "transfer" => Some(Self::Debit),
            "credit" | "top up" => Some(Self::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted account. `secret_hash` never leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub mothers_name: String,
    pub email: String,
    pub phone_number: String,
    pub account_number: String,
    pub balance: Balance,
    pub secret_hash: String,
    pub created_utc: DateTime<Utc>,
}

impl Account {
    /// Public projection of the record.
    pub fn view(&self) -> AccountView {
        AccountView::from(self)
    }
}

/// Account as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub account_number: String,
    pub balance: Balance,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            phone_number: account.phone_number.clone(),
            account_number: account.account_number.clone(),
            balance: account.balance,
        }
    }
}

/// Input for inserting a new account; the store assigns `id`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub mothers_name: String,
    pub email: String,
    pub phone_number: String,
    pub secret_hash: String,
    pub account_number: String,
    pub balance: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample() -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            mothers_name: "Carol".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: "081111".to_string(),
            account_number: "1234567890".to_string(),
            balance: Balance::new(Decimal::from(250)),
            secret_hash: "$argon2id$secret".to_string(),
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::parse("debit"), Some(Direction::Debit));
        assert_eq!(Direction::parse("transfer"), Some(Direction::Debit));
        assert_eq!(Direction::parse("credit"), Some(Direction::Credit));
        assert_eq!(Direction::parse("top up"), Some(Direction::Credit));
        assert_eq!(Direction::parse("withdraw"), None);
        assert_eq!(Direction::parse("Debit"), None);
    }

    #[test]
    fn test_view_omits_secret_hash() {
        let account = sample();
        let json = serde_json::to_value(account.view()).unwrap();

        assert_eq!(json["name"], "Alice");
        assert_eq!(json["accountNumber"], "1234567890");
        assert_eq!(json["phoneNumber"], "081111");
        assert!(json.get("secretHash").is_none());
        assert!(json.get("mothersName").is_none());
    }
}
