//! # Schema Bootstrap
//!
//! Creates the four tables the SQLite backend needs.
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  units ◄──── products ◄──── products_in_receipts ────► receipts        │
//! │  (name UNIQUE)  (barcode UNIQUE)  (price_cents snapshot)  (status)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The SQL lives in `migrations/sqlite/` at the workspace root and is
//! embedded at compile time; no runtime file access is needed.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded schema from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies the schema if it is not there yet.
///
/// Idempotent: applied scripts are recorded in `_sqlx_migrations` and skipped
/// on the next start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking database schema");

    MIGRATOR.run(pool).await?;

    info!("Database schema ready");
    Ok(())
}
