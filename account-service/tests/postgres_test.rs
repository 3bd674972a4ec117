//! Postgres store integration tests.
//!
//! Run with: TEST_DATABASE_URL=postgres://... cargo test -p account-service -- --ignored

mod common;

use account_service::config::{AccountConfig, DatabaseConfig};
use account_service::services::{AccountStore, Database, LedgerEngine, LedgerPolicy, Pin};
use account_service::startup::Application;
use common::{cheap_verifier, init_tracing, open_request};
use rust_decimal_macros::dec;
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

async fn connect() -> Arc<Database> {
    init_tracing();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to run Postgres tests");

    let db = Database::new(&database_url, 2, 1)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations().await.expect("Failed to run migrations");
    Arc::new(db)
}

fn ledger(db: Arc<Database>, policy: LedgerPolicy) -> LedgerEngine {
    LedgerEngine::new(db, cheap_verifier()).with_policy(policy)
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn create_transfer_and_delete() {
    let db = connect().await;
    let ledger = ledger(db.clone(), LedgerPolicy::default());

    let alice = ledger
        .create_account(open_request("Alice", "081111", "1234"))
        .await
        .unwrap();
    let bob = ledger
        .create_account(open_request("Bob", "082222", "5678"))
        .await
        .unwrap();

    ledger
        .transfer(alice.id, &bob.account_number, dec!(500))
        .await
        .unwrap();

    let bob_balance = ledger.check_balance(bob.id).await.unwrap().unwrap();
    assert_eq!(bob_balance.amount(), dec!(500));
    let alice_balance = ledger.check_balance(alice.id).await.unwrap().unwrap();
    assert_eq!(alice_balance.amount(), dec!(0));

    assert!(ledger
        .is_secret_wrong(alice.id, &Pin::new("0000"))
        .await
        .unwrap());
    assert!(!ledger
        .is_secret_wrong(alice.id, &Pin::new("1234"))
        .await
        .unwrap());

    ledger.delete_account(alice.id).await.unwrap();
    ledger.delete_account(bob.id).await.unwrap();
    assert_eq!(ledger.get_account(alice.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn balance_is_stored_as_numeric() {
    let db = connect().await;
    let ledger = ledger(db.clone(), LedgerPolicy::default());

    let alice = ledger
        .create_account(open_request("Alice", "081111", "1234"))
        .await
        .unwrap();

    ledger.credit_balance(alice.id, dec!(10.5)).await.unwrap();
    ledger.debit_balance(alice.id, dec!(20)).await.unwrap();

    let stored = db.fetch_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.balance.amount(), dec!(-9.5));

    ledger.delete_account(alice.id).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn column_holds_large_and_fine_balances_exactly() {
    let db = connect().await;
    let ledger = ledger(db.clone(), LedgerPolicy::default());

    let alice = ledger
        .create_account(open_request("Alice", "081111", "1234"))
        .await
        .unwrap();
    let bob = ledger
        .create_account(open_request("Bob", "082222", "5678"))
        .await
        .unwrap();

    // Past the 10^16 ceiling of a NUMERIC(20, 4) column.
    let large = dec!(100000000000000000000.5);
    ledger.credit_balance(alice.id, large).await.unwrap();
    ledger.credit_balance(bob.id, dec!(0.0001)).await.unwrap();

    let stored = db.fetch_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.balance.amount(), large);
    let stored = db.fetch_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(stored.balance.amount(), dec!(0.0001));

    ledger.delete_account(alice.id).await.unwrap();
    ledger.delete_account(bob.id).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn fetch_by_phone_and_missing_rows() {
    let db = connect().await;
    let ledger = ledger(db.clone(), LedgerPolicy::default());
    let phone = format!("08{}", &Uuid::new_v4().simple().to_string()[..10]);

    let alice = ledger
        .create_account(open_request("Alice", &phone, "1234"))
        .await
        .unwrap();

    assert!(ledger.is_phone_registered(&phone).await.unwrap());
    assert_eq!(db.fetch_by_id(Uuid::new_v4()).await.unwrap().map(|a| a.id), None);

    ledger.delete_account(alice.id).await.unwrap();
    assert!(!ledger.is_phone_registered(&phone).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn application_exposes_accounts_over_its_database() {
    connect().await;
    let config = AccountConfig {
        common: service_core::config::Config { port: 0 },
        service_name: "account-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: std::env::var("TEST_DATABASE_URL").unwrap(),
            max_connections: 2,
            min_connections: 1,
        },
        ledger: LedgerPolicy::default(),
    };

    let app = Application::build_without_migrations(config).await.unwrap();
    assert_ne!(app.http_port(), 0);

    let accounts = app.accounts();
    let before = accounts.count_accounts().await.unwrap();
    let alice = accounts
        .create_account(open_request("Alice", "081111", "1234"))
        .await
        .unwrap();
    assert_eq!(accounts.count_accounts().await.unwrap(), before + 1);

    accounts.delete_account(alice.id).await.unwrap();
}
