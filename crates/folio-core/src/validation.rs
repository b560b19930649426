//! # Validation Module
//!
//! Input validation for everything that enters the catalog or a purchase.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Field checks (THIS MODULE)                                   │
//! │  ├── Names, ISBNs, country codes                                       │
//! │  └── Quantities and prices                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entity construction (Purchase::new, Catalog::add_*)          │
//! │  ├── Non-empty items, single currency                                  │
//! │  └── Referenced master records exist                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Recording (Data::record_purchase)                            │
//! │  └── Denormalized country codes match the catalog                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::validation::{validate_isbn13, validate_item_amount};
//!
//! validate_isbn13("9780306406157").unwrap();
//! validate_item_amount(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_AMOUNT, MAX_PRICE_MINOR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name / title.
const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name or title.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// Returns the trimmed value.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates an ISBN-13 including its check digit.
///
/// Hyphens are ignored; the normalized 13-digit string is returned.
///
/// ## Example
/// ```rust
/// use folio_core::validation::validate_isbn13;
///
/// assert_eq!(validate_isbn13("978-0-306-40615-7").unwrap(), "9780306406157");
/// assert!(validate_isbn13("9780306406158").is_err()); // bad check digit
/// assert!(validate_isbn13("").is_err());
/// ```
pub fn validate_isbn13(isbn: &str) -> ValidationResult<String> {
    let digits: String = isbn.trim().chars().filter(|c| *c != '-').collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn13".to_string(),
        });
    }

    if digits.len() != 13 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "isbn13".to_string(),
            reason: "must be 13 digits".to_string(),
        });
    }

    let checksum: u32 = digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();

    if checksum % 10 != 0 {
        return Err(ValidationError::InvalidFormat {
            field: "isbn13".to_string(),
            reason: "check digit mismatch".to_string(),
        });
    }

    Ok(digits)
}

/// Validates an ISO 3166 alpha-2 country code.
///
/// Returns the upper-cased two letters.
pub fn validate_country_code(code: &str) -> ValidationResult<[u8; 2]> {
    let code = code.trim();

    match code.as_bytes() {
        [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
            Ok([a.to_ascii_uppercase(), b.to_ascii_uppercase()])
        }
        [] => Err(ValidationError::Required {
            field: "country".to_string(),
        }),
        _ => Err(ValidationError::InvalidFormat {
            field: "country".to_string(),
            reason: "must be an ISO 3166 alpha-2 code".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the sold quantity of a purchase item.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_AMOUNT
pub fn validate_item_amount(amount: u32) -> ValidationResult<()> {
    if amount == 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    if amount > MAX_ITEM_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_AMOUNT),
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaways)
/// - Must not exceed MAX_PRICE_MINOR
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.minor() > MAX_PRICE_MINOR {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_MINOR,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
