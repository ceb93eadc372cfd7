//! In-memory product store.
//!
//! `create` checks in a fixed order: the referenced unit first (its
//! `NotFound` is returned untouched), then the barcode.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::unit::MemoryUnitRepository;
use super::Table;
use tally_core::validation::{validate_price, validate_product};
use tally_core::{
    Money, Product, ProductRepository, StoreError, StoreResult, UnitRepository, PRODUCT,
};

/// Products kept in a map, validated against a [`MemoryUnitRepository`].
#[derive(Debug)]
pub struct MemoryProductRepository {
    units: Arc<MemoryUnitRepository>,
    products: RwLock<Table<Product>>,
}

impl MemoryProductRepository {
    pub fn new(units: Arc<MemoryUnitRepository>) -> Self {
        MemoryProductRepository {
            units,
            products: RwLock::new(Table::default()),
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, product: &Product) -> StoreResult<()> {
        validate_product(product)?;

        // Units are never deleted, so the answer cannot go stale.
        self.units.read(&product.unit_id).await?;

        let mut products = self.products.write().await;

        if products.values().any(|existing| existing.barcode == product.barcode) {
            warn!(barcode = %product.barcode, "Barcode already taken");
            return Err(StoreError::already_exists(PRODUCT, "barcode", &product.barcode));
        }
        if products.contains(&product.id) {
            return Err(StoreError::already_exists(PRODUCT, "id", &product.id));
        }

        debug!(id = %product.id, barcode = %product.barcode, "Inserting product");
        products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn read(&self, id: &str) -> StoreResult<Product> {
        self.products
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(PRODUCT, "id", id))
    }

    async fn read_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn update_price(&self, id: &str, price: Money) -> StoreResult<()> {
        validate_price(price)?;

        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(PRODUCT, "id", id))?;

        debug!(id = %id, old = %product.price(), new = %price, "Updating product price");
        product.price_cents = price.cents();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Unit;

    async fn setup() -> (MemoryProductRepository, Unit) {
        let units = Arc::new(MemoryUnitRepository::new());
        let kg = Unit::new("kg");
        units.create(&kg).await.unwrap();
        (MemoryProductRepository::new(units), kg)
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let (products, kg) = setup().await;
        let apple = Product::new(&kg.id, "Apple", "123", Money::from_cents(150));

        products.create(&apple).await.unwrap();

        assert_eq!(products.read(&apple.id).await.unwrap(), apple);
        assert_eq!(products.read_all().await.unwrap(), vec![apple]);
    }

    #[tokio::test]
    async fn test_unknown_unit() {
        let (products, _) = setup().await;
        let orphan = Product::new("no-such-unit", "Apple", "123", Money::from_cents(150));

        let err = products.create(&orphan).await.unwrap_err();

        assert_eq!(err, StoreError::not_found("Unit", "id", "no-such-unit"));
        assert!(products.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unit_checked_before_barcode() {
        let (products, kg) = setup().await;
        products
            .create(&Product::new(&kg.id, "Apple", "123", Money::from_cents(150)))
            .await
            .unwrap();

        // Both wrong: the unit is reported.
        let err = products
            .create(&Product::new("no-such-unit", "Pear", "123", Money::from_cents(200)))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("Unit", "id", "no-such-unit"));
    }

    #[tokio::test]
    async fn test_duplicate_barcode() {
        let (products, kg) = setup().await;
        products
            .create(&Product::new(&kg.id, "Apple", "123", Money::from_cents(150)))
            .await
            .unwrap();

        let err = products
            .create(&Product::new(&kg.id, "Pear", "123", Money::from_cents(200)))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::already_exists("Product", "barcode", "123"));
    }

    #[tokio::test]
    async fn test_update_price() {
        let (products, kg) = setup().await;
        let apple = Product::new(&kg.id, "Apple", "123", Money::from_cents(150));
        products.create(&apple).await.unwrap();

        products.update_price(&apple.id, Money::from_cents(99)).await.unwrap();
        assert_eq!(products.read(&apple.id).await.unwrap().price_cents, 99);

        let err = products.update_price("missing", Money::from_cents(1)).await.unwrap_err();
        assert_eq!(err, StoreError::not_found("Product", "id", "missing"));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let (products, kg) = setup().await;
        let apple = Product::new(&kg.id, "Apple", "123", Money::from_cents(150));
        products.create(&apple).await.unwrap();

        let err = products.update_price(&apple.id, Money::from_cents(-1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(products.read(&apple.id).await.unwrap().price_cents, 150);
    }
}
