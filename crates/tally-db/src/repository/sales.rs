//! # Sales Repository
//!
//! Sales are never stored. Every read aggregates the closed receipts, so the
//! numbers cannot drift from the receipts they describe.

use async_trait::async_trait;

use crate::repository::receipt::SqliteReceiptRepository;
use tally_core::{ReceiptRepository, Sales, SalesRepository, StoreResult};

/// Read-only view over [`SqliteReceiptRepository::read_sales`].
#[derive(Debug, Clone)]
pub struct SqliteSalesRepository {
    receipts: SqliteReceiptRepository,
}

impl SqliteSalesRepository {
    pub fn new(receipts: SqliteReceiptRepository) -> Self {
        SqliteSalesRepository { receipts }
    }
}

#[async_trait]
impl SalesRepository for SqliteSalesRepository {
    async fn read(&self) -> StoreResult<Sales> {
        self.receipts.read_sales().await
    }
}
