//! # Database Error Types
//!
//! Error types for SQLite operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classifies UNIQUE / FOREIGN KEY failures      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository (repository/*.rs) ← Knows which entity and field it wrote  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError::AlreadyExists / NotFound / Storage                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine only says *which constraint* fired. Turning that into
//! "Product with barcode<123> already exists." needs the row that was being
//! written, so the final translation happens in the repositories.

use tally_core::StoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Unique constraint violation.
    ///
    /// `column` is the `<table>.<column>` SQLite reports, e.g. `units.name`.
    #[error("UNIQUE constraint failed: {column}")]
    UniqueViolation { column: String },

    /// Foreign key constraint violation.
    ///
    /// SQLite does not say which key failed; callers know from context.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema bootstrap failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// True when a UNIQUE constraint on `column` (`table.column`) fired.
    pub fn is_unique_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { column: fired } if fired == column)
    }

    /// True for any FOREIGN KEY failure.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, DbError::ForeignKeyViolation { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database  → kind() UniqueViolation     → UniqueViolation
///                        → kind() ForeignKeyViolation → ForeignKeyViolation
///                        → other                      → QueryFailed
/// sqlx::Error::PoolTimedOut                           → PoolExhausted
/// sqlx::Error::PoolClosed                             → ConnectionFailed
/// Other                                               → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                match db_err.kind() {
                    // SQLite: "UNIQUE constraint failed: <table>.<column>"
                    sqlx::error::ErrorKind::UniqueViolation => {
                        let column = msg
                            .split("UNIQUE constraint failed: ")
                            .nth(1)
                            .unwrap_or("unknown")
                            .trim()
                            .to_string();
                        DbError::UniqueViolation { column }
                    }
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        DbError::ForeignKeyViolation {
                            message: msg.to_string(),
                        }
                    }
                    _ => DbError::QueryFailed(msg.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Anything the repositories did not translate is an engine failure.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "Untranslated database error");
        StoreError::Storage(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
