//! # Receipt Repository
//!
//! SQLite storage for receipts and their line items.
//!
//! ## Receipt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Receipt Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → receipts row { status: 'open' }                     │
//! │                                                                         │
//! │  2. ADD PRODUCTS (one transaction each)                                │
//! │     └── add_product() → products_in_receipts row                       │
//! │         { quantity, price_cents = product price NOW }                  │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── update_status('closed') → counted by read_sales()              │
//! │                                                                         │
//! │  4. (OPTIONAL, open only) DELETE                                       │
//! │     └── delete() → receipt row + every line row                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Snapshot
//! Each line stores the price it was sold at. Reads never join the live
//! `products.price_cents`, so a later price change does not reprice a
//! receipt that was already handed to a customer.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use crate::repository::product::fetch_product;
use tally_core::validation::validate_quantity;
use tally_core::{
    LineItem, Money, Receipt, ReceiptRepository, ReceiptStatus, Sales, StoreError, StoreResult,
    ValidationError, PRODUCT, RECEIPT,
};

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct SqliteReceiptRepository {
    pool: SqlitePool,
}

impl SqliteReceiptRepository {
    /// Creates a new SqliteReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteReceiptRepository { pool }
    }
}

/// Reads a receipt's status, or `None` if there is no such receipt.
async fn fetch_status(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<ReceiptStatus>> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM receipts WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(status.map(ReceiptStatus::from))
}

/// Rebuilds a receipt with every line item, oldest line first.
///
/// Fails with `Invalid` when the lines no longer fit a total; inside a write
/// transaction that rolls the offending insert back.
async fn fetch_receipt(conn: &mut SqliteConnection, id: &str) -> StoreResult<Option<Receipt>> {
    let Some(status) = fetch_status(conn, id).await? else {
        return Ok(None);
    };

    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT product_id, quantity, price_cents
        FROM products_in_receipts
        WHERE receipt_id = ?1
        ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DbError::from)?;

    let lines = rows
        .into_iter()
        .map(|(product_id, quantity, price_cents)| {
            LineItem::new(product_id, quantity, Money::from_cents(price_cents))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Receipt::from_parts(id, status, lines)?))
}

/// Appends one line row.
async fn insert_line(
    conn: &mut SqliteConnection,
    receipt_id: &str,
    line: &LineItem,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products_in_receipts (receipt_id, product_id, quantity, price_cents)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(receipt_id)
    .bind(&line.product_id)
    .bind(line.quantity)
    .bind(line.price_cents)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        // The receipt row is known to exist here, so the product is missing.
        err if err.is_foreign_key() => StoreError::not_found(PRODUCT, "id", &line.product_id),
        other => other.into(),
    })?;

    Ok(())
}

#[async_trait]
impl ReceiptRepository for SqliteReceiptRepository {
    async fn create(&self, receipt: &Receipt) -> StoreResult<()> {
        // Totals are rebuilt from price × quantity; an overflow fails here.
        let mut lines = Vec::with_capacity(receipt.products.len());
        for line in &receipt.products {
            validate_quantity(line.quantity)?;
            let price = Money::from_cents(line.price_cents);
            lines.push(LineItem::new(&line.product_id, line.quantity, price)?);
        }
        let stored = Receipt::from_parts(&receipt.id, receipt.status.clone(), lines)?;

        debug!(id = %stored.id, lines = stored.products.len(), "Inserting receipt");

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query("INSERT INTO receipts (id, status) VALUES (?1, ?2)")
            .bind(&receipt.id)
            .bind(receipt.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                err if err.is_unique_on("receipts.id") => {
                    StoreError::already_exists(RECEIPT, "id", &receipt.id)
                }
                other => other.into(),
            })?;

        for line in &stored.products {
            insert_line(&mut tx, &stored.id, line).await?;
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn add_product(
        &self,
        receipt_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Receipt> {
        validate_quantity(quantity)?;

        debug!(
            receipt_id = %receipt_id,
            product_id = %product_id,
            quantity,
            "Adding product to receipt"
        );

        let mut tx = begin_write(&self.pool).await?;

        if fetch_status(&mut tx, receipt_id).await?.is_none() {
            return Err(StoreError::not_found(RECEIPT, "id", receipt_id));
        }

        let product = fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| StoreError::not_found(PRODUCT, "id", product_id))?;

        let line = LineItem::snapshot(&product, quantity)?;
        insert_line(&mut tx, receipt_id, &line).await?;

        let receipt = fetch_receipt(&mut tx, receipt_id)
            .await?
            .ok_or_else(|| StoreError::not_found(RECEIPT, "id", receipt_id))?;

        tx.commit().await.map_err(DbError::from)?;

        debug!(receipt_id = %receipt_id, total = %receipt.total(), "Receipt total updated");
        Ok(receipt)
    }

    async fn read(&self, id: &str) -> StoreResult<Receipt> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

        fetch_receipt(&mut conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found(RECEIPT, "id", id))
    }

    async fn update_status(&self, id: &str, status: ReceiptStatus) -> StoreResult<()> {
        debug!(id = %id, status = %status, "Updating receipt status");

        let result = sqlx::query("UPDATE receipts SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(RECEIPT, "id", id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting receipt");

        let mut tx = begin_write(&self.pool).await?;

        match fetch_status(&mut tx, id).await? {
            None => return Err(StoreError::not_found(RECEIPT, "id", id)),
            Some(status) if status.is_closed() => {
                warn!(id = %id, "Refusing to delete closed receipt");
                return Err(StoreError::closed_receipt(RECEIPT, "id", id));
            }
            Some(_) => {}
        }

        sqlx::query("DELETE FROM products_in_receipts WHERE receipt_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        sqlx::query("DELETE FROM receipts WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn read_sales(&self) -> StoreResult<Sales> {
        // One total per closed receipt; each one fit when it was written.
        let totals: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(l.price_cents * l.quantity), 0)
            FROM receipts r
            LEFT JOIN products_in_receipts l ON l.receipt_id = r.id
            WHERE r.status = 'closed'
            GROUP BY r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let revenue = Money::checked_sum(totals.iter().copied().map(Money::from_cents))
            .ok_or_else(|| ValidationError::TooLarge {
                field: "revenue".to_string(),
            })?;

        Ok(Sales {
            n_receipts: totals.len() as i64,
            revenue_cents: revenue.cents(),
        })
    }
}
