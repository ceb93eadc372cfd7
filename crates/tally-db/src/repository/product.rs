//! # Product Repository
//!
//! SQLite storage for products.
//!
//! ## Create
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  One transaction, same order as the memory backend:                    │
//! │                                                                         │
//! │  SELECT 1 FROM units WHERE id = ?                                      │
//! │       └── no row ─────────────────────────────► NotFound(Unit, id)     │
//! │  INSERT INTO products (...)                                            │
//! │       ├── ok ─────────────────────────────────► Ok(())                 │
//! │       ├── UNIQUE constraint failed:                                    │
//! │       │     products.barcode ─────────────────► AlreadyExists(barcode) │
//! │       └── anything else ──────────────────────► Storage                │
//! │                                                                         │
//! │  SQLite reports UNIQUE before FOREIGN KEY, so the unit is looked up    │
//! │  explicitly. A rejected INSERT writes nothing.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use tally_core::validation::{validate_price, validate_product};
use tally_core::{Money, Product, ProductRepository, StoreError, StoreResult, PRODUCT, UNIT};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    /// Creates a new SqliteProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProductRepository { pool }
    }
}

/// Loads a product on an existing connection.
///
/// Shared with the receipt repository, which prices line items inside its
/// own transaction and cannot take a second pool connection.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, unit_id, name, barcode, price_cents FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn create(&self, product: &Product) -> StoreResult<()> {
        validate_product(product)?;

        debug!(id = %product.id, barcode = %product.barcode, "Inserting product");

        let mut tx = begin_write(&self.pool).await?;

        let unit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM units WHERE id = ?1")
            .bind(&product.unit_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if unit.is_none() {
            warn!(unit_id = %product.unit_id, "Product references unknown unit");
            return Err(StoreError::not_found(UNIT, "id", &product.unit_id));
        }

        sqlx::query(
            r#"
            INSERT INTO products (id, unit_id, name, barcode, price_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.unit_id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.price_cents)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_on("products.barcode") => {
                warn!(barcode = %product.barcode, "Barcode already taken");
                StoreError::already_exists(PRODUCT, "barcode", &product.barcode)
            }
            err if err.is_unique_on("products.id") => {
                StoreError::already_exists(PRODUCT, "id", &product.id)
            }
            err if err.is_foreign_key() => StoreError::not_found(UNIT, "id", &product.unit_id),
            other => other.into(),
        })?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn read(&self, id: &str) -> StoreResult<Product> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

        fetch_product(&mut conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found(PRODUCT, "id", id))
    }

    async fn read_all(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, unit_id, name, barcode, price_cents FROM products ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(count = products.len(), "Read all products");
        Ok(products)
    }

    async fn update_price(&self, id: &str, price: Money) -> StoreResult<()> {
        validate_price(price)?;

        debug!(id = %id, price = %price, "Updating product price");

        let result = sqlx::query("UPDATE products SET price_cents = ?2 WHERE id = ?1")
            .bind(id)
            .bind(price.cents())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(PRODUCT, "id", id));
        }

        Ok(())
    }
}
