//! # Backend Selection
//!
//! Wires the four stores for one backend. Callers hold a [`Stores`] and only
//! ever see the tally-core traits, so swapping the backend changes nothing
//! above this module.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreConfig { backend, .. }                                           │
//! │       │                                                                 │
//! │       ├── Memory ──► MemoryUnit ◄── MemoryProduct ◄── MemoryReceipt    │
//! │       │                                                  ▲              │
//! │       │                                      MemorySales ┘              │
//! │       │                                                                 │
//! │       └── Sqlite ──► Database::new (pool + schema)                     │
//! │                        └── one pool clone per repository               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::{Backend, StoreConfig};
use crate::error::DbResult;
use crate::memory::{
    MemoryProductRepository, MemoryReceiptRepository, MemorySalesRepository, MemoryUnitRepository,
};
use crate::pool::Database;
use tally_core::{ProductRepository, ReceiptRepository, SalesRepository, UnitRepository};

/// The four stores, backed by the same storage.
#[derive(Clone)]
pub struct Stores {
    pub units: Arc<dyn UnitRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub receipts: Arc<dyn ReceiptRepository>,
    pub sales: Arc<dyn SalesRepository>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

impl Stores {
    /// Opens the backend named by `config`.
    ///
    /// ## Errors
    /// Only the SQLite backend can fail: the file cannot be opened or the
    /// schema cannot be created.
    pub async fn open(config: &StoreConfig) -> DbResult<Self> {
        match config.backend {
            Backend::Memory => {
                info!("Using in-memory stores");
                Ok(Stores::in_memory())
            }
            Backend::Sqlite => {
                info!(path = %config.database_path.display(), "Using SQLite stores");
                let db = Database::new(config.db_config()).await?;
                Ok(Stores::sqlite(db))
            }
        }
    }

    /// Fresh, empty process-local stores.
    pub fn in_memory() -> Self {
        let units = Arc::new(MemoryUnitRepository::new());
        let products = Arc::new(MemoryProductRepository::new(units.clone()));
        let receipts = Arc::new(MemoryReceiptRepository::new(products.clone()));
        let sales = Arc::new(MemorySalesRepository::new(receipts.clone()));

        Stores {
            units,
            products,
            receipts,
            sales,
        }
    }

    /// Stores sharing the pool of `db`.
    pub fn sqlite(db: Database) -> Self {
        Stores {
            units: Arc::new(db.units()),
            products: Arc::new(db.products()),
            receipts: Arc::new(db.receipts()),
            sales: Arc::new(db.sales()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use tally_core::{Money, Product, Receipt, ReceiptStatus, Sales, Unit};

    async fn close_one_sale(stores: &Stores) -> Sales {
        let kg = Unit::new("kg");
        stores.units.create(&kg).await.unwrap();
        let apple = Product::new(&kg.id, "Apple", "123", Money::from_cents(150));
        stores.products.create(&apple).await.unwrap();

        let receipt = Receipt::new();
        stores.receipts.create(&receipt).await.unwrap();
        stores.receipts.add_product(&receipt.id, &apple.id, 3).await.unwrap();
        stores
            .receipts
            .update_status(&receipt.id, ReceiptStatus::Closed)
            .await
            .unwrap();

        stores.sales.read().await.unwrap()
    }

    #[tokio::test]
    async fn test_open_default_is_memory() {
        let stores = Stores::open(&StoreConfig::default()).await.unwrap();
        assert_eq!(
            close_one_sale(&stores).await,
            Sales { n_receipts: 1, revenue_cents: 450 }
        );
    }

    #[tokio::test]
    async fn test_sqlite_stores_share_one_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stores = Stores::sqlite(db);
        assert_eq!(
            close_one_sale(&stores).await,
            Sales { n_receipts: 1, revenue_cents: 450 }
        );
    }
}
