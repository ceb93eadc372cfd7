//! # Repository Contracts
//!
//! The storage interface every backend implements. Callers hold
//! `Arc<dyn UnitRepository>` and friends and never learn which backend
//! answers.
//!
//! ## Dependency Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SalesRepository ──reads──► ReceiptRepository                          │
//! │                                   │ prices lines via                    │
//! │                                   ▼                                     │
//! │                             ProductRepository                           │
//! │                                   │ validates unit_id via              │
//! │                                   ▼                                     │
//! │                              UnitRepository                             │
//! │                                                                         │
//! │  Implementations (tally-db):                                           │
//! │  ├── memory::*   - maps behind one RwLock per store                    │
//! │  └── sqlite::*   - SQL tables, constraint errors translated            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! Every failure is a [`StoreError`](crate::StoreError) and is returned
//! unchanged to the caller. A failed mutating call leaves state untouched.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::money::Money;
use crate::types::{Product, Receipt, ReceiptStatus, Sales, Unit};

/// Storage for measurement units.
#[async_trait]
pub trait UnitRepository: Send + Sync {
    /// Inserts `unit`.
    ///
    /// Fails with `AlreadyExists(Unit, name, ..)` when the name is taken.
    async fn create(&self, unit: &Unit) -> StoreResult<()>;

    /// Fails with `NotFound(Unit, id, ..)`.
    async fn read(&self, id: &str) -> StoreResult<Unit>;

    /// All units, in insertion order.
    async fn read_all(&self) -> StoreResult<Vec<Unit>>;
}

/// Storage for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts `product`.
    ///
    /// Fails with `NotFound(Unit, id, ..)` when `unit_id` names no unit and
    /// `AlreadyExists(Product, barcode, ..)` when the barcode is taken.
    async fn create(&self, product: &Product) -> StoreResult<()>;

    /// Fails with `NotFound(Product, id, ..)`.
    async fn read(&self, id: &str) -> StoreResult<Product>;

    /// All products, in insertion order.
    async fn read_all(&self) -> StoreResult<Vec<Product>>;

    /// Overwrites the price. Last write wins.
    async fn update_price(&self, id: &str, price: Money) -> StoreResult<()>;
}

/// Storage for receipts and their line items.
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// Stores a freshly built receipt as-is.
    async fn create(&self, receipt: &Receipt) -> StoreResult<()>;

    /// Appends a line priced at the product's current price and returns the
    /// updated receipt, whose total is the sum of all its lines.
    ///
    /// Fails with `NotFound` for an unknown receipt or product.
    async fn add_product(
        &self,
        receipt_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Receipt>;

    /// Fails with `NotFound(Receipt, id, ..)`.
    async fn read(&self, id: &str) -> StoreResult<Receipt>;

    /// Overwrites the status. No transition is refused.
    async fn update_status(&self, id: &str, status: ReceiptStatus) -> StoreResult<()>;

    /// Removes an open receipt with all of its lines.
    ///
    /// Fails with `ClosedReceipt(Receipt, id, ..)` when the receipt is closed.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Count and revenue of closed receipts.
    async fn read_sales(&self) -> StoreResult<Sales>;
}

/// Sales statistics, derived from receipt state on every read.
#[async_trait]
pub trait SalesRepository: Send + Sync {
    async fn read(&self) -> StoreResult<Sales>;
}
