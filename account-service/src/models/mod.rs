//! Domain models for account-service.

mod account;
mod balance;
mod sort;

pub use account::{Account, AccountView, Direction, NewAccount};
pub use balance::{Balance, BalanceError, BalanceOverflow, InsufficientFunds};
pub use sort::{SortField, SortOrder};
