//! # Database Pool Management
//!
//! One `SqlitePool` per process, shared by every SQLite repository.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreConfig::db_config() / DbConfig::in_memory()                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new ── WAL, foreign keys ON, schema bootstrap               │
//! │       │                                                                 │
//! │       ├── units()    ─┐                                                 │
//! │       ├── products() ─┤  each holds a clone of the same pool           │
//! │       ├── receipts() ─┤                                                 │
//! │       └── sales()    ─┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Transactions
//! Every multi-statement write reads before it writes (does the receipt
//! exist, is it closed, does the unit exist). A DEFERRED transaction would
//! take the write lock only at the first write, and SQLite refuses that
//! upgrade with `SQLITE_BUSY` instead of waiting when another connection
//! committed in between. [`begin_write`] opens `BEGIN IMMEDIATE` so the write
//! lock is taken up front, where the busy timeout applies.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{
    SqliteProductRepository, SqliteReceiptRepository, SqliteSalesRepository, SqliteUnitRepository,
};

/// How long a connection waits on another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings for the SQLite backend.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of pooled connections.
    /// Default: 5
    pub max_connections: u32,

    /// Time allowed to acquire a connection.
    pub connect_timeout: Duration,

    /// Idle connections are closed after this long; `None` keeps them.
    pub idle_timeout: Option<Duration>,
}

impl DbConfig {
    /// A file-backed database, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private in-memory database (tests).
    ///
    /// Exactly one connection that never idles out: the database lives and
    /// dies with it.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and bootstraps the schema.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Off by default in SQLite; the line item translations depend on it.
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Database pool created");

        let db = Database { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Bootstraps the schema. Safe to run repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn units(&self) -> SqliteUnitRepository {
        SqliteUnitRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> SqliteProductRepository {
        SqliteProductRepository::new(self.pool.clone())
    }

    pub fn receipts(&self) -> SqliteReceiptRepository {
        SqliteReceiptRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SqliteSalesRepository {
        SqliteSalesRepository::new(self.receipts())
    }
}

/// Starts a transaction that holds the write lock from its first statement.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_bootstrap_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('units', 'products', 'receipts', 'products_in_receipts')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, 4);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_file_database_reopens_with_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        sqlx::query("INSERT INTO units (id, name) VALUES ('u1', 'kg')")
            .execute(db.pool())
            .await
            .unwrap();
        db.pool().close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM units")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_begin_write_takes_write_lock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut tx = begin_write(db.pool()).await.unwrap();
        sqlx::query("INSERT INTO receipts (id, status) VALUES ('r1', 'open')")
            .execute(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }
}
