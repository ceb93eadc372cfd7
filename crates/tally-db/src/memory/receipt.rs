//! In-memory receipt store.
//!
//! Line items carry the product price from the moment they were added. The
//! receipt total is always rebuilt from those lines, never patched.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::product::MemoryProductRepository;
use super::Table;
use tally_core::validation::validate_quantity;
use tally_core::{
    LineItem, Money, ProductRepository, Receipt, ReceiptRepository, ReceiptStatus, Sales,
    StoreError, StoreResult, RECEIPT,
};

#[derive(Debug)]
pub struct MemoryReceiptRepository {
    products: Arc<MemoryProductRepository>,
    receipts: RwLock<Table<Receipt>>,
}

impl MemoryReceiptRepository {
    pub fn new(products: Arc<MemoryProductRepository>) -> Self {
        MemoryReceiptRepository {
            products,
            receipts: RwLock::new(Table::default()),
        }
    }
}

#[async_trait]
impl ReceiptRepository for MemoryReceiptRepository {
    async fn create(&self, receipt: &Receipt) -> StoreResult<()> {
        // Same shape a reload from storage would produce.
        let mut lines = Vec::with_capacity(receipt.products.len());
        for line in &receipt.products {
            validate_quantity(line.quantity)?;
            let price = Money::from_cents(line.price_cents);
            lines.push(LineItem::new(&line.product_id, line.quantity, price)?);
        }
        let stored = Receipt::from_parts(&receipt.id, receipt.status.clone(), lines)?;

        // Duplicate id wins over a missing product.
        if self.receipts.read().await.contains(&receipt.id) {
            return Err(StoreError::already_exists(RECEIPT, "id", &receipt.id));
        }
        for line in &stored.products {
            self.products.read(&line.product_id).await?;
        }

        let mut receipts = self.receipts.write().await;
        if receipts.contains(&stored.id) {
            return Err(StoreError::already_exists(RECEIPT, "id", &stored.id));
        }

        debug!(id = %stored.id, lines = stored.products.len(), "Inserting receipt");
        receipts.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn add_product(
        &self,
        receipt_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Receipt> {
        validate_quantity(quantity)?;

        if !self.receipts.read().await.contains(receipt_id) {
            return Err(StoreError::not_found(RECEIPT, "id", receipt_id));
        }
        let product = self.products.read(product_id).await?;

        debug!(
            receipt_id = %receipt_id,
            product_id = %product_id,
            quantity,
            "Adding product to receipt"
        );
        let line = LineItem::snapshot(&product, quantity)?;

        let mut receipts = self.receipts.write().await;
        // Deleted while the product was being looked up.
        let receipt = receipts
            .get_mut(receipt_id)
            .ok_or_else(|| StoreError::not_found(RECEIPT, "id", receipt_id))?;

        receipt.push_line(line)?;

        debug!(receipt_id = %receipt_id, total = %receipt.total(), "Receipt total updated");
        Ok(receipt.clone())
    }

    async fn read(&self, id: &str) -> StoreResult<Receipt> {
        self.receipts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(RECEIPT, "id", id))
    }

    async fn update_status(&self, id: &str, status: ReceiptStatus) -> StoreResult<()> {
        debug!(id = %id, status = %status, "Updating receipt status");

        let mut receipts = self.receipts.write().await;
        let receipt = receipts
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(RECEIPT, "id", id))?;

        receipt.status = status;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut receipts = self.receipts.write().await;

        match receipts.get(id) {
            None => return Err(StoreError::not_found(RECEIPT, "id", id)),
            Some(receipt) if receipt.is_closed() => {
                warn!(id = %id, "Refusing to delete closed receipt");
                return Err(StoreError::closed_receipt(RECEIPT, "id", id));
            }
            Some(_) => {}
        }

        debug!(id = %id, "Deleting receipt");
        receipts.remove(id);
        Ok(())
    }

    async fn read_sales(&self) -> StoreResult<Sales> {
        Ok(Sales::from_receipts(self.receipts.read().await.values())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryUnitRepository;
    use tally_core::{Product, Unit, UnitRepository};

    struct Fixture {
        products: Arc<MemoryProductRepository>,
        receipts: MemoryReceiptRepository,
        apple: Product,
    }

    async fn setup() -> Fixture {
        let units = Arc::new(MemoryUnitRepository::new());
        let kg = Unit::new("kg");
        units.create(&kg).await.unwrap();

        let products = Arc::new(MemoryProductRepository::new(units));
        let apple = Product::new(&kg.id, "Apple", "123", Money::from_cents(150));
        products.create(&apple).await.unwrap();

        Fixture {
            receipts: MemoryReceiptRepository::new(products.clone()),
            products,
            apple,
        }
    }

    #[tokio::test]
    async fn test_add_product_accumulates_total() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();

        f.receipts.add_product(&receipt.id, &f.apple.id, 3).await.unwrap();
        let updated = f.receipts.add_product(&receipt.id, &f.apple.id, 2).await.unwrap();

        assert_eq!(updated.products.len(), 2);
        assert_eq!(updated.total_cents, 750);
        assert_eq!(f.receipts.read(&receipt.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_price_change_keeps_snapshot() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();
        f.receipts.add_product(&receipt.id, &f.apple.id, 3).await.unwrap();

        f.products
            .update_price(&f.apple.id, Money::from_cents(1000))
            .await
            .unwrap();

        let stored = f.receipts.read(&receipt.id).await.unwrap();
        assert_eq!(stored.products[0].price_cents, 150);
        assert_eq!(stored.total_cents, 450);
    }

    #[tokio::test]
    async fn test_receipt_checked_before_product() {
        let f = setup().await;
        let err = f.receipts.add_product("no-receipt", "no-product", 1).await.unwrap_err();
        assert_eq!(err, StoreError::not_found("Receipt", "id", "no-receipt"));
    }

    #[tokio::test]
    async fn test_add_unknown_product_leaves_receipt_alone() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();

        let err = f.receipts.add_product(&receipt.id, "ghost", 1).await.unwrap_err();

        assert_eq!(err, StoreError::not_found("Product", "id", "ghost"));
        assert!(f.receipts.read(&receipt.id).await.unwrap().products.is_empty());
    }

    #[tokio::test]
    async fn test_create_recomputes_total() {
        let f = setup().await;
        let mut receipt = Receipt::new();
        receipt
            .products
            .push(LineItem::new(&f.apple.id, 2, Money::from_cents(150)).unwrap());
        receipt.total_cents = 1;

        f.receipts.create(&receipt).await.unwrap();

        assert_eq!(f.receipts.read(&receipt.id).await.unwrap().total_cents, 300);
    }

    #[tokio::test]
    async fn test_create_duplicate_checked_before_products() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();

        let mut again = receipt.clone();
        again
            .products
            .push(LineItem::new("ghost", 1, Money::from_cents(100)).unwrap());
        let err = f.receipts.create(&again).await.unwrap_err();

        assert_eq!(err, StoreError::already_exists("Receipt", "id", &receipt.id));
    }

    #[tokio::test]
    async fn test_overflowing_line_leaves_receipt_alone() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();
        f.receipts.add_product(&receipt.id, &f.apple.id, 1).await.unwrap();

        let err = f
            .receipts
            .add_product(&receipt.id, &f.apple.id, i64::MAX / 100)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Invalid(_)));
        let stored = f.receipts.read(&receipt.id).await.unwrap();
        assert_eq!(stored.products.len(), 1);
        assert_eq!(stored.total_cents, 150);
    }

    #[tokio::test]
    async fn test_delete_closed_is_refused() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();
        f.receipts
            .update_status(&receipt.id, ReceiptStatus::Closed)
            .await
            .unwrap();

        let err = f.receipts.delete(&receipt.id).await.unwrap_err();

        assert_eq!(err, StoreError::closed_receipt("Receipt", "id", &receipt.id));
        assert!(f.receipts.read(&receipt.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_open_then_missing() {
        let f = setup().await;
        let receipt = Receipt::new();
        f.receipts.create(&receipt).await.unwrap();

        f.receipts.delete(&receipt.id).await.unwrap();

        assert!(f.receipts.read(&receipt.id).await.unwrap_err().is_not_found());
        assert!(f.receipts.delete(&receipt.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sales_ignore_open_receipts() {
        let f = setup().await;
        let closed = Receipt::new();
        let open = Receipt::new();
        f.receipts.create(&closed).await.unwrap();
        f.receipts.create(&open).await.unwrap();
        f.receipts.add_product(&closed.id, &f.apple.id, 3).await.unwrap();
        f.receipts.add_product(&open.id, &f.apple.id, 9).await.unwrap();
        f.receipts
            .update_status(&closed.id, ReceiptStatus::Closed)
            .await
            .unwrap();

        assert_eq!(
            f.receipts.read_sales().await.unwrap(),
            Sales { n_receipts: 1, revenue_cents: 450 }
        );
    }
}
