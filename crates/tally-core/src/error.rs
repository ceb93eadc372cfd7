//! # Error Types
//!
//! The error taxonomy every repository speaks.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── StoreError       - Outcome of a repository call                   │
//! │  │   ├── AlreadyExists  (Unit.name, Product.barcode)                   │
//! │  │   ├── NotFound       (any lookup by id)                             │
//! │  │   ├── ClosedReceipt  (delete of a closed receipt)                   │
//! │  │   ├── Invalid        (wraps ValidationError)                        │
//! │  │   └── Storage        (engine failure, SQLite backend only)          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - sqlx failures, translated into StoreError      │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → StoreError → ErrorEnvelope → caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Message Contract
//! The three domain variants render as fixed, client-facing sentences:
//! ```text
//! Unit with name<kg> already exists.
//! Product with id<...> does not exist.
//! Receipt with id<...> is closed.
//! ```
//! Transport layers wrap that text in [`ErrorEnvelope`]:
//! `{"error": {"message": "..."}}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Failure returned by any repository operation.
///
/// The three domain variants carry `(entity, field, value)` so callers can
/// report *what* collided or went missing without parsing strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness invariant was violated.
    ///
    /// ## When This Occurs
    /// - Creating a unit whose name is taken
    /// - Creating a product whose barcode is taken
    #[error("{entity} with {field}<{value}> already exists.")]
    AlreadyExists {
        entity: String,
        field: String,
        value: String,
    },

    /// A lookup by identifier found nothing.
    ///
    /// ## When This Occurs
    /// - Reading, updating or deleting an unknown id
    /// - Creating a product whose `unit_id` names no unit
    /// - Adding an unknown product to a receipt
    #[error("{entity} with {field}<{value}> does not exist.")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Deletion was attempted on a closed receipt.
    #[error("{entity} with {field}<{value}> is closed.")]
    ClosedReceipt {
        entity: String,
        field: String,
        value: String,
    },

    /// Input rejected before touching storage.
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// The storage engine failed for a reason that is not a domain outcome.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    /// Creates an AlreadyExists error.
    pub fn already_exists(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        StoreError::AlreadyExists {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a ClosedReceipt error.
    pub fn closed_receipt(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        StoreError::ClosedReceipt {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// HTTP status a web layer should answer with for this outcome.
    ///
    /// ```text
    /// AlreadyExists → 409    NotFound → 404    ClosedReceipt → 403
    /// Invalid       → 422    Storage  → 500
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::AlreadyExists { .. } => 409,
            StoreError::NotFound { .. } => 404,
            StoreError::ClosedReceipt { .. } => 403,
            StoreError::Invalid(_) => 422,
            StoreError::Storage(_) => 500,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by [`crate::validation`] before a backend is consulted, so both
/// backends reject bad input identically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// The amount does not fit in 64-bit cents.
    ///
    /// ## When This Occurs
    /// - `price × quantity` of a line overflows
    /// - The sum of a receipt's lines, or of all closed receipts, overflows
    #[error("{field} is too large")]
    TooLarge { field: String },
}

// =============================================================================
// Error Envelope
// =============================================================================

/// Wire body for a failed call.
///
/// ```json
/// {"error": {"message": "Unit with name<kg> already exists."}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorMessage,
}

/// Inner part of [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl From<&StoreError> for ErrorEnvelope {
    fn from(err: &StoreError) -> Self {
        // Engine details stay in the logs, not on the wire.
        let message = match err {
            StoreError::Storage(_) => "Storage failure.".to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            error: ErrorMessage { message },
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for repository results.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_messages() {
        let err = StoreError::already_exists("Unit", "name", "kg");
        assert_eq!(err.to_string(), "Unit with name<kg> already exists.");

        let err = StoreError::not_found("Product", "id", "42");
        assert_eq!(err.to_string(), "Product with id<42> does not exist.");

        let err = StoreError::closed_receipt("Receipt", "id", "7");
        assert_eq!(err.to_string(), "Receipt with id<7> is closed.");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::already_exists("Unit", "name", "kg").status_code(), 409);
        assert_eq!(StoreError::not_found("Unit", "id", "1").status_code(), 404);
        assert_eq!(StoreError::closed_receipt("Receipt", "id", "1").status_code(), 403);
        assert_eq!(StoreError::Storage("disk full".into()).status_code(), 500);
    }

    #[test]
    fn test_envelope_shape() {
        let err = StoreError::not_found("Receipt", "id", "abc");
        let json = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "error": { "message": "Receipt with id<abc> does not exist." }
            })
        );
    }

    #[test]
    fn test_envelope_hides_storage_details() {
        let err = StoreError::Storage("database is locked".into());
        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.error.message, "Storage failure.");
    }

    #[test]
    fn test_validation_converts_to_store_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let store_err: StoreError = validation_err.into();
        assert!(matches!(store_err, StoreError::Invalid(_)));
        assert_eq!(store_err.status_code(), 422);
        assert_eq!(store_err.to_string(), "quantity must be positive");
    }
}
