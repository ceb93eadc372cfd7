//! # tally-core: Pure Domain Model for Tally POS
//!
//! This crate holds every type the point-of-sale backend agrees on: the
//! entities, the error taxonomy and the repository contracts that the
//! storage backends in `tally-db` implement.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Transport layer (HTTP routes, out of tree)         │   │
//! │  │      units ──► products ──► receipts ──► sales                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dyn UnitRepository, ...               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ repository │  │   error   │  │   │
//! │  │   │   Unit    │  │   Money   │  │  UnitRepo  │  │ StoreError│  │   │
//! │  │   │  Receipt  │  │           │  │  SalesRepo │  │ Envelope  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           tally-db (memory + SQLite repositories)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Unit, Product, Receipt, LineItem, Sales)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Store error taxonomy and the wire error envelope
//! - [`repository`] - Storage contracts implemented by every backend
//! - [`validation`] - Input checks shared by both backends
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Money, Product, Unit};
//!
//! let kg = Unit::new("kg");
//! let apple = Product::new(&kg.id, "Apple", "123", Money::from_cents(150));
//!
//! assert_eq!(apple.unit_id, kg.id);
//! assert_eq!(apple.price().checked_multiply_quantity(3), Some(Money::from_cents(450)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod repository;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ErrorEnvelope, StoreError, StoreResult, ValidationError};
pub use money::Money;
pub use repository::{ProductRepository, ReceiptRepository, SalesRepository, UnitRepository};
pub use types::*;

// =============================================================================
// Entity Names
// =============================================================================
// Used as the `entity` part of every StoreError so both backends phrase
// their failures identically.

/// Entity name for units.
pub const UNIT: &str = "Unit";

/// Entity name for products.
pub const PRODUCT: &str = "Product";

/// Entity name for receipts.
pub const RECEIPT: &str = "Receipt";
