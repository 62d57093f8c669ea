//! # Database Handle
//!
//! One `SqlitePool` per process, handed out to repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path) ──► Database::new(config).await                    │
//! │                                │                                        │
//! │          ┌─────────────────────┼──────────────────────┐                 │
//! │          ▼                     ▼                      ▼                 │
//! │   db.products()          db.begin().await       db.activity()           │
//! │   (pool reads)           (BEGIN IMMEDIATE, one  (log viewer reads)      │
//! │                           per create / reversal)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every connection runs in WAL mode with foreign keys on. Sale writes take
//! the SQLite write lock when their transaction opens, so two registers
//! selling the last unit queue on the lock instead of failing on upgrade.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::activity_log::ActivityLogRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock_movement::StockMovementRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// How long a sale waits for another register's write lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// How long to wait for a free pooled connection.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed database, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory database for tests.
    ///
    /// Each connection to `:memory:` is a separate database, so the pool
    /// holds exactly one. A caller with an open transaction must run every
    /// query through that transaction.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared database handle. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let connect_options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations applied");
        Ok(())
    }

    /// Raw pool, for reads outside a transaction.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Starts a write transaction holding the SQLite write lock.
    ///
    /// Blocks up to `busy_timeout` while another writer holds the lock, then
    /// fails with [`DbError::Busy`]. Dropping the transaction without
    /// `commit()` rolls everything back.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Busy => DbError::Busy,
                DbError::PoolExhausted => DbError::PoolExhausted,
                other => DbError::TransactionFailed(other.to_string()),
            })
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn movements(&self) -> StockMovementRepository {
        StockMovementRepository::new(self.pool.clone())
    }

    pub fn activity(&self) -> ActivityLogRepository {
        ActivityLogRepository::new(self.pool.clone())
    }

    /// Closes the pool. Later queries fail.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_migrations_create_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name != '_sqlx_migrations' AND name NOT LIKE 'sqlite%'
             ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(
            tables,
            vec!["activity_logs", "products", "sale_items", "sales", "stock_movements"]
        );
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            sqlx::query(
                "INSERT INTO products (id, name, category, quantity, created_at, updated_at)
                 VALUES ('p-1', 'Clou', 'standard', 5, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
            )
            .execute(&mut *tx)
            .await
            .unwrap();
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/vendo-test.db")
            .max_connections(10)
            .busy_timeout(Duration::from_millis(250))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.run_migrations);
    }

    #[tokio::test]
    async fn test_second_writer_times_out_as_busy() {
        let path = std::env::temp_dir().join(format!("vendo-busy-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).busy_timeout(Duration::from_millis(100)))
            .await
            .unwrap();

        let holder = db.begin().await.unwrap();
        let err = db.begin().await.unwrap_err();
        assert!(matches!(err, DbError::Busy), "got {err:?}");

        drop(holder);
        assert!(db.begin().await.is_ok());

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
