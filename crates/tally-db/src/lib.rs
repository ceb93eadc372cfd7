//! # tally-db: Storage Backends for Tally POS
//!
//! Two implementations of the tally-core repository contracts that behave
//! identically: a process-local one and a SQLite one built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP handler, seed binary, tests)                             │
//! │       │   Arc<dyn UnitRepository / ProductRepository / ...>           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Stores     │    │    memory     │    │  repository  │  │   │
//! │  │   │ (backend.rs)  │───►│  RwLock maps  │    │ (SQLite)     │  │   │
//! │  │   │               │    └───────────────┘    │              │  │   │
//! │  │   │ StoreConfig   │──────────────────────►  │ Database     │  │   │
//! │  │   │ (config.rs)   │                         │ (pool.rs)    │  │   │
//! │  │   └───────────────┘                         └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │      SQLite file (POS_DATABASE_PATH, default ./tally.db)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - Wires the four stores for the configured backend
//! - [`config`] - Environment-driven store configuration
//! - [`memory`] - In-memory repositories
//! - [`repository`] - SQLite repositories
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded schema
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{StoreConfig, Stores};
//!
//! let stores = Stores::open(&StoreConfig::from_env()?).await?;
//!
//! stores.units.create(&kg).await?;
//! let sales = stores.sales.read().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::Stores;
pub use config::{Backend, ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use memory::{
    MemoryProductRepository, MemoryReceiptRepository, MemorySalesRepository, MemoryUnitRepository,
};
pub use repository::{
    SqliteProductRepository, SqliteReceiptRepository, SqliteSalesRepository, SqliteUnitRepository,
};
