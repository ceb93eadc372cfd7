//! # Validation Module
//!
//! Input checks run by every repository before it touches storage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (request schemas, out of tree)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - called by memory and SQLite repositories       │
//! │  ├── blank names / barcodes (no length or charset rules)               │
//! │  ├── negative prices                                                   │
//! │  └── non-positive quantities                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage                                                      │
//! │  ├── UNIQUE (units.name, products.barcode)                             │
//! │  └── FOREIGN KEY (products.unit_id, line items)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_quantity, validate_unit};
//! use tally_core::Unit;
//!
//! validate_unit(&Unit::new("kg")).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, Unit};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects blank text. Anything else, whitespace and length included, is the
/// caller's business.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price. Zero is allowed (free items), negatives are not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a line item quantity.
///
/// ```rust
/// use tally_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-1).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a unit before it is created.
pub fn validate_unit(unit: &Unit) -> ValidationResult<()> {
    validate_required("name", &unit.name)
}

/// Validates a product before it is created.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required("name", &product.name)?;
    validate_required("barcode", &product.barcode)?;
    validate_price(product.price())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_required() {
        assert_eq!(
            validate_required("name", "   "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
        assert!(validate_required("barcode", "").is_err());
    }

    #[test]
    fn test_free_form_text_is_accepted() {
        assert!(validate_required("barcode", "4006 381 333931").is_ok());
        assert!(validate_unit(&Unit::new("x".repeat(500))).is_ok());

        let spaced = Product::new("unit", "Apple", "4006 381 333931", Money::from_cents(150));
        assert!(validate_product(&spaced).is_ok());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(150)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_product() {
        let ok = Product::new("unit", "Apple", "123", Money::from_cents(150));
        assert!(validate_product(&ok).is_ok());

        let blank = Product::new("unit", "", "123", Money::from_cents(150));
        assert!(validate_product(&blank).is_err());
    }
}
