//! Field/order selection for sorting account views.

use super::AccountView;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than "desc" sorts ascending.
    pub fn parse(value: &str) -> Self {
        match value {
            "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Email,
    PhoneNumber,
    AccountNumber,
    Balance,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phoneNumber" | "phone_number" => Some(Self::PhoneNumber),
            "accountNumber" | "account_number" => Some(Self::AccountNumber),
            "balance" => Some(Self::Balance),
            _ => None,
        }
    }

    /// Strings compare lexicographically, balances numerically.
    pub fn compare(&self, a: &AccountView, b: &AccountView) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Email => a.email.cmp(&b.email),
            Self::PhoneNumber => a.phone_number.cmp(&b.phone_number),
            Self::AccountNumber => a.account_number.cmp(&b.account_number),
            Self::Balance => a.balance.cmp(&b.balance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defaults_to_asc() {
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse(""), SortOrder::Asc);
    }

    #[test]
    fn test_field_aliases() {
        assert_eq!(SortField::parse("accountNumber"), Some(SortField::AccountNumber));
        assert_eq!(SortField::parse("account_number"), Some(SortField::AccountNumber));
        assert_eq!(SortField::parse("phoneNumber"), Some(SortField::PhoneNumber));
        assert_eq!(SortField::parse("secretHash"), None);
    }
}
