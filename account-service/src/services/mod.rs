//! Services for account-service.

pub mod account_number;
pub mod credentials;
pub mod database;
pub mod facade;
pub mod ledger;
pub mod memory;
pub mod metrics;
pub mod store;

pub use account_number::{AccountNumberGenerator, RandomAccountNumber};
pub use credentials::{Argon2Verifier, CredentialError, CredentialVerifier, Pin, PinHash};
pub use database::Database;
pub use facade::{AccountFacade, Failure};
pub use ledger::{LedgerEngine, LedgerError, LedgerPolicy, OpenAccount, MAX_AMOUNT_SCALE};
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{AccountStore, StoreError};
