//! Postgres account store.

use crate::models::{Account, Balance, NewAccount};
use crate::services::metrics::STORE_OPERATION_DURATION;
use crate::services::store::{AccountStore, StoreError};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, name, mothers_name, email, phone_number, account_number, balance, secret_hash, created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "account-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for Database {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Account>, StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["fetch_all"])
            .start_timer();

        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_utc, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(accounts)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["fetch_by_id"])
            .start_timer();

        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn fetch_by_phone(&self, phone_number: &str) -> Result<Option<Account>, StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["fetch_by_phone"])
            .start_timer();

        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE phone_number = $1 ORDER BY created_utc, id LIMIT 1"
        ))
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(account)
    }

    #[instrument(skip(self, account), fields(account_number = %account.account_number))]
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["insert"])
            .start_timer();

        let created = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts (id, name, mothers_name, email, phone_number, account_number, balance, secret_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&account.name)
        .bind(&account.mothers_name)
        .bind(&account.email)
        .bind(&account.phone_number)
        .bind(&account.account_number)
        .bind(account.balance)
        .bind(&account.secret_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(format!(
                    "account number '{}' already exists",
                    account.account_number
                ))
            }
            _ => StoreError::Database(e),
        })?;

        timer.observe_duration();

        info!(account_id = %created.id, "Account row inserted");

        Ok(created)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn update_phone(&self, id: Uuid, phone_number: &str) -> Result<(), StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["update_phone"])
            .start_timer();

        sqlx::query("UPDATE accounts SET phone_number = $2 WHERE id = $1")
            .bind(id)
            .bind(phone_number)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %id, balance = %balance))]
    async fn update_balance(&self, id: Uuid, balance: Balance) -> Result<(), StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["update_balance"])
            .start_timer();

        sqlx::query("UPDATE accounts SET balance = $2 WHERE id = $1")
            .bind(id)
            .bind(balance)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, secret_hash), fields(account_id = %id))]
    async fn update_secret(&self, id: Uuid, secret_hash: &str) -> Result<(), StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["update_secret"])
            .start_timer();

        sqlx::query("UPDATE accounts SET secret_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(secret_hash)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let timer = STORE_OPERATION_DURATION
            .with_label_values(&["remove"])
            .start_timer();

        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();
        Ok(())
    }
}
