//! Common test utilities for account-service integration tests.

#![allow(dead_code)]

use account_service::models::AccountView;
use account_service::services::{
    AccountNumberGenerator, AccountStore, Argon2Verifier, LedgerEngine, LedgerPolicy, MemoryStore,
    OpenAccount, Pin,
};
use argon2::Params;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,account_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Hands out queued account numbers, then falls back to a counter.
pub struct ScriptedNumbers {
    queue: Mutex<VecDeque<String>>,
    counter: Mutex<u64>,
}

impl ScriptedNumbers {
    pub fn new(numbers: &[&str]) -> Self {
        Self {
            queue: Mutex::new(numbers.iter().map(|n| n.to_string()).collect()),
            counter: Mutex::new(5_000_000_000),
        }
    }
}

impl AccountNumberGenerator for ScriptedNumbers {
    fn generate(&self) -> String {
        if let Some(number) = self.queue.lock().unwrap().pop_front() {
            return number;
        }
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        counter.to_string()
    }
}

/// Argon2id with minimal cost so tests stay fast.
pub fn cheap_verifier() -> Arc<Argon2Verifier> {
    Arc::new(Argon2Verifier::with_params(
        Params::new(8, 1, 1, None).expect("valid argon2 params"),
    ))
}

/// Ledger over the given store with scripted account numbers.
pub fn ledger_over(
    store: Arc<dyn AccountStore>,
    numbers: &[&str],
    policy: LedgerPolicy,
) -> LedgerEngine {
    init_tracing();
    LedgerEngine::new(store, cheap_verifier())
        .with_account_numbers(Arc::new(ScriptedNumbers::new(numbers)))
        .with_policy(policy)
}

/// Ledger over a fresh in-memory store with the default policy.
pub fn spawn_ledger(numbers: &[&str]) -> (Arc<LedgerEngine>, Arc<MemoryStore>) {
    spawn_ledger_with_policy(numbers, LedgerPolicy::default())
}

pub fn spawn_ledger_with_policy(
    numbers: &[&str],
    policy: LedgerPolicy,
) -> (Arc<LedgerEngine>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let ledger = ledger_over(store.clone(), numbers, policy);
    (Arc::new(ledger), store)
}

pub fn open_request(name: &str, phone_number: &str, pin: &str) -> OpenAccount {
    OpenAccount {
        name: name.to_string(),
        mothers_name: format!("Mother of {}", name),
        email: format!("{}@example.com", name.to_lowercase()),
        phone_number: phone_number.to_string(),
        pin: Pin::new(pin),
    }
}

/// Helper to create an account for testing.
pub async fn create_test_account(
    ledger: &LedgerEngine,
    name: &str,
    phone_number: &str,
    pin: &str,
) -> AccountView {
    ledger
        .create_account(open_request(name, phone_number, pin))
        .await
        .expect("Failed to create account")
}
