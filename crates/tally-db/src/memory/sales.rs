//! In-memory sales view.

use std::sync::Arc;

use async_trait::async_trait;

use super::receipt::MemoryReceiptRepository;
use tally_core::{ReceiptRepository, Sales, SalesRepository, StoreResult};

/// Aggregates closed receipts on every read; holds no state of its own.
#[derive(Debug, Clone)]
pub struct MemorySalesRepository {
    receipts: Arc<MemoryReceiptRepository>,
}

impl MemorySalesRepository {
    pub fn new(receipts: Arc<MemoryReceiptRepository>) -> Self {
        MemorySalesRepository { receipts }
    }
}

#[async_trait]
impl SalesRepository for MemorySalesRepository {
    async fn read(&self) -> StoreResult<Sales> {
        self.receipts.read_sales().await
    }
}
