//! # Error Types
//!
//! Domain-specific error types for folio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  folio-core errors (this file)                                         │
//! │  ├── CoreError        - Data integrity / domain errors                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  folio-analytics errors (separate crate)                               │
//! │  └── AnalyticsError   - Config + recording failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AnalyticsError → caller           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! A query for a year or country nobody has sold anything in is not an
//! error. Rankings come back empty, counts come back zero, and the
//! employee of the year comes back `None`.

use thiserror::Error;

use crate::catalog::{BookId, CustomerId, EmployeeId, ShopId};
use crate::money::Currency;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// Every variant here describes data that would silently corrupt
/// downstream aggregates if accepted, so they are raised at construction
/// time and propagated to whoever tried to record the data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A purchase was built without any line items.
    #[error("Purchase must contain at least one item")]
    EmptyPurchase,

    /// Two amounts in different currencies were combined.
    ///
    /// ## When This Occurs
    /// - A purchase mixes line items priced in different currencies
    /// - `Money::checked_add` is called across currencies
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: Currency, found: Currency },

    /// Book id is not registered in the catalog.
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// Shop id is not registered in the catalog.
    #[error("Shop not found: {0}")]
    ShopNotFound(ShopId),

    /// Employee id is not registered in the catalog.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// Customer id is not registered in the catalog.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Money arithmetic left the `i64` range of minor units.
    #[error("Monetary amount overflow")]
    AmountOverflow,

    /// A monetary amount could not be parsed or is out of range.
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before values enter the domain model.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., country code, ISBN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Interval bounds are inverted.
    #[error("Invalid range: lower bound {lower} is greater than upper bound {upper}")]
    InvalidRange { lower: i32, upper: i32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
