//! # SQLite Repositories
//!
//! Relational implementations of the tally-core repository contracts.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SQLite Backend                                       │
//! │                                                                         │
//! │  Caller holds Arc<dyn ProductRepository>                               │
//! │       │                                                                 │
//! │       │  products.create(&product)                                     │
//! │       ▼                                                                 │
//! │  SqliteProductRepository                                               │
//! │  ├── INSERT INTO products ...                                          │
//! │  │       │                                                              │
//! │  │       ├── FOREIGN KEY failed     → NotFound(Unit, id, unit_id)      │
//! │  │       └── UNIQUE products.barcode → AlreadyExists(Product, barcode) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The engine enforces the invariants; the repository only names them.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteUnitRepository`] - units
//! - [`SqliteProductRepository`] - products
//! - [`SqliteReceiptRepository`] - receipts and line items
//! - [`SqliteSalesRepository`] - aggregate over closed receipts

pub mod product;
pub mod receipt;
pub mod sales;
pub mod unit;

pub use product::SqliteProductRepository;
pub use receipt::SqliteReceiptRepository;
pub use sales::SqliteSalesRepository;
pub use unit::SqliteUnitRepository;
