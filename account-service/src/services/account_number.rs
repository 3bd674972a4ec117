//! Account number generation.

use rand::Rng;

/// Lowest generated account number (ten digits).
const ACCOUNT_NUMBER_MIN: u64 = 1_000_000_000;

/// Width of the draw range above the minimum.
const ACCOUNT_NUMBER_SPAN: u64 = 90_000_000_000;

/// Source of candidate account numbers.
///
/// Candidates are not checked against the store; the unique index on
/// `accounts.account_number` is the only collision guard.
pub trait AccountNumberGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform draw from `[1_000_000_000, 91_000_000_000)`, rendered in decimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAccountNumber;

impl AccountNumberGenerator for RandomAccountNumber {
    fn generate(&self) -> String {
        let number = rand::thread_rng()
            .gen_range(ACCOUNT_NUMBER_MIN..ACCOUNT_NUMBER_MIN + ACCOUNT_NUMBER_SPAN);
        number.to_string()
    }
}
