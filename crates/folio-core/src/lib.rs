//! # folio-core: Pure Domain Model for Folio
//!
//! Folio runs the books of a worldwide book sales company with shops in
//! many countries. This crate holds the domain model as pure values with
//! zero I/O dependencies; the query engine lives in `folio-analytics`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Folio Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Reporting / UI / data generation (external)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          folio-analytics (PurchaseIndex, Purchases facade)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ folio-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   range   │  │  catalog  │  │ purchase  │  │   │
//! │  │   │   Money   │  │   Range   │  │ Registry  │  │ Purchase  │  │   │
//! │  │   │ Multiplier│  │           │  │ Book/Shop │  │   Item    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Fixed-point Money with round-half-up arithmetic
//! - [`range`] - Inclusive integer interval
//! - [`catalog`] - Master records and the registries that own them
//! - [`purchase`] - Purchase and PurchaseItem
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Example Usage
//!
//! ```rust
//! use folio_core::money::{retail_price, Money};
//!
//! let purchase_price = Money::from_cents(1000); // $10.00
//! let retail = retail_price(purchase_price);     // 11% margin
//! assert_eq!(retail.to_string(), "$11.10");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod purchase;
pub mod range;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{
    Book, BookId, Catalog, CountryCode, Customer, CustomerId, Employee, EmployeeId, Registry,
    RegistryId, Shop, ShopId,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Currency, Money, Multiplier};
pub use purchase::{CustomerRef, Purchase, PurchaseItem, ShopRef};
pub use range::Range;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum copies of a single book in one purchase line.
///
/// ## Business Reason
/// Catches data-generation bugs (e.g. an unbounded random amount) before
/// they distort best-seller rankings.
pub const MAX_ITEM_AMOUNT: u32 = 999;

/// Largest accepted unit price, in minor units ($100,000.00).
///
/// ## Business Reason
/// No book sells for more. Together with `MAX_ITEM_AMOUNT` this keeps every
/// line total and yearly sum far inside `i64`.
pub const MAX_PRICE_MINOR: i64 = 10_000_000;
