//! # Domain Types
//!
//! Core domain types shared by every backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Unit       │◄──│    Product      │◄──│    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  name (unique)  │   │  unit_id        │   │  quantity       │       │
//! │  └─────────────────┘   │  barcode(unique)│   │  price (frozen) │       │
//! │                        │  price_cents    │   │  total          │       │
//! │                        └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ 0..n           │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────┴────────┐       │
//! │  │     Sales       │◄──│  ReceiptStatus  │◄──│    Receipt      │       │
//! │  │  n_receipts     │   │  Open / Closed  │   │  id, status     │       │
//! │  │  revenue        │   │  Other(String)  │   │  total = Σ lines│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! References between entities are ids, never embedded values, so a line
//! item outlives any later change to the product it was sold as.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;

/// Generates a fresh entity id (UUID v4, hyphenated).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit
// =============================================================================

/// A measurement unit (kilogram, piece, litre) that products are sold in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Unit {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across all units.
    pub name: String,
}

impl Unit {
    /// Creates a unit with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Unit {
            id: generate_id(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A priced, barcoded item sold in some unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unit this product is measured in. Must exist when the product is created.
    pub unit_id: String,

    /// Display name.
    pub name: String,

    /// Barcode, unique across all products.
    pub barcode: String,

    /// Current price in cents. The only field that changes after creation.
    pub price_cents: i64,
}

impl Product {
    /// Creates a product with a freshly generated id.
    pub fn new(
        unit_id: impl Into<String>,
        name: impl Into<String>,
        barcode: impl Into<String>,
        price: Money,
    ) -> Self {
        Product {
            id: generate_id(),
            unit_id: unit_id.into(),
            name: name.into(),
            barcode: barcode.into(),
            price_cents: price.cents(),
        }
    }

    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Receipt Status
// =============================================================================

/// Lifecycle status of a receipt.
///
/// Only `open` and `closed` mean anything to the stores. Any other value a
/// caller writes is kept verbatim and treated as a non-closed status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReceiptStatus {
    /// Items are still being added.
    #[default]
    Open,
    /// The sale is final; counts towards sales and cannot be deleted.
    Closed,
    /// Any other status string.
    Other(String),
}

impl ReceiptStatus {
    /// Stored / wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            ReceiptStatus::Open => "open",
            ReceiptStatus::Closed => "closed",
            ReceiptStatus::Other(raw) => raw,
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, ReceiptStatus::Closed)
    }
}

impl From<String> for ReceiptStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "open" => ReceiptStatus::Open,
            "closed" => ReceiptStatus::Closed,
            _ => ReceiptStatus::Other(raw),
        }
    }
}

impl From<&str> for ReceiptStatus {
    fn from(raw: &str) -> Self {
        ReceiptStatus::from(raw.to_string())
    }
}

impl From<ReceiptStatus> for String {
    fn from(status: ReceiptStatus) -> Self {
        match status {
            ReceiptStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A product in a receipt.
/// Uses the snapshot pattern: the price is frozen when the line is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product this line was sold as. Serialized as `id`.
    #[serde(rename = "id")]
    pub product_id: String,

    /// Quantity sold, always positive.
    pub quantity: i64,

    /// Unit price in cents at time of adding (frozen).
    pub price_cents: i64,

    /// `price_cents × quantity`.
    pub total_cents: i64,
}

impl LineItem {
    /// Freezes the current price of `product` into a new line.
    pub fn snapshot(product: &Product, quantity: i64) -> ValidationResult<Self> {
        LineItem::new(&product.id, quantity, product.price())
    }

    /// Builds a line from a stored snapshot price.
    ///
    /// ## Errors
    /// `TooLarge` when `price × quantity` does not fit in cents.
    pub fn new(
        product_id: impl Into<String>,
        quantity: i64,
        price: Money,
    ) -> ValidationResult<Self> {
        let total = price
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| ValidationError::TooLarge {
                field: "total".to_string(),
            })?;

        Ok(LineItem {
            product_id: product_id.into(),
            quantity,
            price_cents: price.cents(),
            total_cents: total.cents(),
        })
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A basket of products with a lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub id: String,

    #[ts(type = "string")]
    pub status: ReceiptStatus,

    /// Line items in the order they were added.
    pub products: Vec<LineItem>,

    /// Sum of every line total, in cents.
    pub total_cents: i64,
}

impl Receipt {
    /// Creates an empty, open receipt with a fresh id.
    pub fn new() -> Self {
        Receipt {
            id: generate_id(),
            status: ReceiptStatus::Open,
            products: Vec::new(),
            total_cents: 0,
        }
    }

    /// Rebuilds a receipt from stored parts; the total is derived from the lines.
    pub fn from_parts(
        id: impl Into<String>,
        status: ReceiptStatus,
        products: Vec<LineItem>,
    ) -> ValidationResult<Self> {
        let mut receipt = Receipt {
            id: id.into(),
            status,
            products,
            total_cents: 0,
        };
        receipt.recompute_total()?;
        Ok(receipt)
    }

    /// Appends a line and refreshes the total. On overflow the receipt is
    /// left exactly as it was.
    pub fn push_line(&mut self, line: LineItem) -> ValidationResult<()> {
        let total = self.total().checked_add(line.total()).ok_or_else(|| {
            ValidationError::TooLarge {
                field: "total".to_string(),
            }
        })?;
        self.products.push(line);
        self.total_cents = total.cents();
        Ok(())
    }

    /// Sets `total_cents` to the sum across all lines.
    pub fn recompute_total(&mut self) -> ValidationResult<()> {
        let total = Money::checked_sum(self.products.iter().map(LineItem::total)).ok_or_else(
            || ValidationError::TooLarge {
                field: "total".to_string(),
            },
        )?;
        self.total_cents = total.cents();
        Ok(())
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }
}

impl Default for Receipt {
    fn default() -> Self {
        Receipt::new()
    }
}

// =============================================================================
// Sales
// =============================================================================

/// Aggregate over closed receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sales {
    /// Number of closed receipts.
    pub n_receipts: i64,

    /// Sum of their totals, in cents.
    pub revenue_cents: i64,
}

impl Sales {
    /// Folds the closed receipts out of `receipts`.
    pub fn from_receipts<'a>(
        receipts: impl IntoIterator<Item = &'a Receipt>,
    ) -> ValidationResult<Self> {
        receipts
            .into_iter()
            .filter(|receipt| receipt.is_closed())
            .try_fold(Sales::default(), |acc, receipt| {
                let revenue = acc.revenue().checked_add(receipt.total()).ok_or_else(|| {
                    ValidationError::TooLarge {
                        field: "revenue".to_string(),
                    }
                })?;
                Ok(Sales {
                    n_receipts: acc.n_receipts + 1,
                    revenue_cents: revenue.cents(),
                })
            })
    }

    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_receipt_is_open_and_empty() {
        let receipt = Receipt::new();
        assert_eq!(receipt.status, ReceiptStatus::Open);
        assert!(receipt.products.is_empty());
        assert_eq!(receipt.total_cents, 0);
    }

    #[test]
    fn test_total_is_sum_of_all_lines() {
        let mut receipt = Receipt::new();
        receipt.push_line(LineItem::new("a", 3, Money::from_cents(150)).unwrap()).unwrap();
        receipt.push_line(LineItem::new("b", 2, Money::from_cents(500)).unwrap()).unwrap();

        assert_eq!(receipt.total_cents, 450 + 1000);
    }

    #[test]
    fn test_snapshot_freezes_price() {
        let mut product = Product::new("unit", "Apple", "123", Money::from_cents(150));
        let line = LineItem::snapshot(&product, 3).unwrap();
        product.price_cents = 999;

        assert_eq!(line.price_cents, 150);
        assert_eq!(line.total_cents, 450);
    }

    #[test]
    fn test_status_passthrough() {
        assert_eq!(ReceiptStatus::from("open"), ReceiptStatus::Open);
        assert_eq!(ReceiptStatus::from("closed"), ReceiptStatus::Closed);

        let other = ReceiptStatus::from("on-hold");
        assert_eq!(other, ReceiptStatus::Other("on-hold".to_string()));
        assert_eq!(other.as_str(), "on-hold");
        assert!(!other.is_closed());
    }

    #[test]
    fn test_receipt_wire_shape() {
        let mut receipt = Receipt::new();
        receipt.push_line(LineItem::new("p1", 3, Money::from_cents(150)).unwrap()).unwrap();

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["status"], "open");
        assert_eq!(json["total_cents"], 450);
        assert_eq!(json["products"][0]["id"], "p1");
        assert_eq!(json["products"][0]["price_cents"], 150);
        assert_eq!(json["products"][0]["total_cents"], 450);
        assert!(json.get("total").is_none());

        let back: Receipt = serde_json::from_value(json).unwrap();
        assert_eq!(back, receipt);
    }

    #[test]
    fn test_sales_counts_only_closed() {
        let mut open = Receipt::new();
        open.push_line(LineItem::new("p", 1, Money::from_cents(300)).unwrap()).unwrap();

        let mut closed = Receipt::new();
        closed.push_line(LineItem::new("p", 3, Money::from_cents(150)).unwrap()).unwrap();
        closed.status = ReceiptStatus::Closed;

        let sales = Sales::from_receipts([&open, &closed]).unwrap();
        assert_eq!(sales, Sales { n_receipts: 1, revenue_cents: 450 });
    }

    #[test]
    fn test_sales_of_nothing() {
        assert_eq!(Sales::from_receipts(std::iter::empty()).unwrap(), Sales::default());
    }

    #[test]
    fn test_sales_wire_shape() {
        let json = serde_json::to_value(Sales { n_receipts: 2, revenue_cents: 1450 }).unwrap();
        assert_eq!(json["n_receipts"], 2);
        assert_eq!(json["revenue_cents"], 1450);
    }

    #[test]
    fn test_line_total_overflow_is_rejected() {
        let err = LineItem::new("p", i64::MAX / 100, Money::from_cents(150)).unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { field: "total".to_string() });
    }

    #[test]
    fn test_push_line_overflow_leaves_receipt_untouched() {
        let mut receipt = Receipt::new();
        receipt.push_line(LineItem::new("a", 1, Money::from_cents(i64::MAX)).unwrap()).unwrap();

        let err = receipt
            .push_line(LineItem::new("b", 1, Money::from_cents(1)).unwrap())
            .unwrap_err();

        assert_eq!(err, ValidationError::TooLarge { field: "total".to_string() });
        assert_eq!(receipt.products.len(), 1);
        assert_eq!(receipt.total_cents, i64::MAX);
    }

    #[test]
    fn test_from_parts_overflow_is_rejected() {
        let lines = vec![
            LineItem::new("a", 1, Money::from_cents(i64::MAX)).unwrap(),
            LineItem::new("b", 1, Money::from_cents(1)).unwrap(),
        ];
        assert!(Receipt::from_parts("r", ReceiptStatus::Open, lines).is_err());
    }

    #[test]
    fn test_revenue_overflow_is_rejected() {
        let mut big = Receipt::new();
        big.push_line(LineItem::new("a", 1, Money::from_cents(i64::MAX)).unwrap()).unwrap();
        big.status = ReceiptStatus::Closed;
        let mut small = Receipt::new();
        small.push_line(LineItem::new("b", 1, Money::from_cents(1)).unwrap()).unwrap();
        small.status = ReceiptStatus::Closed;

        let err = Sales::from_receipts([&big, &small]).unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { field: "revenue".to_string() });
    }
}
