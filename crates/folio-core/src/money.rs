//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Fixed-Point Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summed over millions of purchases the drift becomes visible in        │
//! │  yearly totals and can even flip an "employee of the year" ranking.    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + round-half-up                      │
//! │    $12.345 → 1234.5 cents → 1235 cents                                  │
//! │    Every operation rounds once, after the raw integer arithmetic       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::money::{retail_price, Currency, Money};
//!
//! let purchase_price = Money::parse("10.00", Currency::Usd).unwrap();
//! let retail = retail_price(purchase_price); // 11% margin
//! assert_eq!(retail.minor(), 1110);
//!
//! let line_total = retail.times(3);
//! assert_eq!(line_total.to_string(), "$33.30");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Number of fractional digits every amount is rounded to.
pub const SCALE: u32 = 2;

/// Minor units per major unit (10^SCALE).
const MINOR_PER_MAJOR: i64 = 100;

/// Basis points per whole (1 bps = 0.01%).
const BPS_PER_WHOLE: i128 = 10_000;

/// Longest fractional part accepted by [`Money::parse`].
const MAX_PARSE_FRACTION_DIGITS: usize = 18;

/// Longest integer part accepted by [`Money::parse`].
const MAX_PARSE_INTEGER_DIGITS: usize = 15;

/// The single currency the bookstore deployment operates in.
pub const DEPLOYMENT_CURRENCY: Currency = Currency::Usd;

/// Markup applied uniformly to every purchase price to derive the sale
/// price: 1.11, an 11% margin.
pub const RETAIL_MARGIN: Multiplier = Multiplier::from_bps(11_100);

// =============================================================================
// Currency
// =============================================================================

/// ISO 4217 currency of an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// Three-letter ISO code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Display symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Multiplier
// =============================================================================

/// A non-negative decimal scalar represented in basis points.
///
/// 10_000 bps = 1.0, 11_100 bps = 1.11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Multiplier(u32);

impl Multiplier {
    /// Creates a multiplier from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Multiplier(bps)
    }

    /// Returns the multiplier in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The identity multiplier (1.0).
    #[inline]
    pub const fn one() -> Self {
        Multiplier(BPS_PER_WHOLE as u32)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount in minor units of a single currency.
///
/// ## Design Decisions
/// - **i64 minor units**: no binary floating point anywhere
/// - **Currency carried along**: combining currencies is a programmer error
///   and trips an assertion (use [`Money::checked_add`] to get an error)
/// - **Immutable**: every operation returns a new value
///
/// Ordering compares the amount first. It is only meaningful between
/// amounts of the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a Money value from minor units (cents for USD).
    #[inline]
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Money { minor, currency }
    }

    /// Creates a Money value from cents in the deployment currency.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money::from_minor(cents, DEPLOYMENT_CURRENCY)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50, ..)` is -5.50, not -4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64, currency: Currency) -> Self {
        if major < 0 {
            Money::from_minor(major * MINOR_PER_MAJOR - minor, currency)
        } else {
            Money::from_minor(major * MINOR_PER_MAJOR + minor, currency)
        }
    }

    /// Zero in the given currency.
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money::from_minor(0, currency)
    }

    /// Parses a decimal string, rounding half-up to [`SCALE`] digits.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::{Currency, Money};
    ///
    /// assert_eq!(Money::parse("12.345", Currency::Usd).unwrap().minor(), 1235);
    /// assert_eq!(Money::parse("-0.005", Currency::Usd).unwrap().minor(), -1);
    /// assert_eq!(Money::parse("7", Currency::Usd).unwrap().minor(), 700);
    /// assert!(Money::parse("1.2.3", Currency::Usd).is_err());
    /// ```
    pub fn parse(input: &str, currency: Currency) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (integer, fraction) = match unsigned.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (unsigned, ""),
        };

        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid("no digits"));
        }
        if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits with an optional decimal point"));
        }
        if integer.len() > MAX_PARSE_INTEGER_DIGITS {
            return Err(invalid("integer part too long"));
        }
        if fraction.len() > MAX_PARSE_FRACTION_DIGITS {
            return Err(invalid("fractional part too long"));
        }

        let mut digits: i128 = 0;
        for c in integer.chars().chain(fraction.chars()) {
            digits = digits * 10 + i128::from(c as u8 - b'0');
        }
        if negative {
            digits = -digits;
        }

        let denominator = 10i128.pow(fraction.len() as u32);
        let minor = round_half_up(digits * i128::from(MINOR_PER_MAJOR), denominator);
        Ok(Money::from_minor(minor as i64, currency))
    }

    /// Returns the amount in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the currency.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.minor / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.minor % MINOR_PER_MAJOR).abs()
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Adds two amounts, reporting a currency mismatch or `i64` overflow
    /// as an error.
    pub fn checked_add(&self, other: Money) -> CoreResult<Money> {
        if self.currency != other.currency {
            return Err(CoreError::CurrencyMismatch {
                expected: self.currency,
                found: other.currency,
            });
        }
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(CoreError::AmountOverflow)?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Sums amounts that must all be in `currency`.
    pub fn total<I>(amounts: I, currency: Currency) -> CoreResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, amount| acc.checked_add(amount))
    }

    /// Multiplies by a whole quantity. Exact, no rounding involved.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.times(3).minor(), 897);
    /// ```
    #[inline]
    pub fn times(&self, quantity: u32) -> Money {
        Money::from_minor(self.minor * i64::from(quantity), self.currency)
    }

    /// Like [`Money::times`], but reports `i64` overflow instead of
    /// wrapping or panicking.
    pub fn checked_times(&self, quantity: u32) -> CoreResult<Money> {
        self.minor
            .checked_mul(i64::from(quantity))
            .map(|minor| Money::from_minor(minor, self.currency))
            .ok_or(CoreError::AmountOverflow)
    }

    /// Multiplies by a decimal scalar, rounding half-up after the raw
    /// integer product.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::money::{Money, Multiplier};
    ///
    /// // $0.05 × 1.5 = $0.075 → $0.08
    /// let m = Money::from_cents(5).multiply(Multiplier::from_bps(15_000));
    /// assert_eq!(m.minor(), 8);
    /// ```
    pub fn multiply(&self, factor: Multiplier) -> Money {
        let raw = i128::from(self.minor) * i128::from(factor.bps());
        Money::from_minor(round_half_up(raw, BPS_PER_WHOLE) as i64, self.currency)
    }

    /// Divides into `count` equal shares, rounding half-up.
    ///
    /// Returns `None` for a zero count.
    pub fn div_round(&self, count: u64) -> Option<Money> {
        if count == 0 {
            return None;
        }
        let minor = round_half_up(i128::from(self.minor), i128::from(count));
        Some(Money::from_minor(minor as i64, self.currency))
    }

    /// Formats the bare amount, e.g. `"12.34"` or `"-0.50"`.
    pub fn to_amount_string(&self) -> String {
        let sign = if self.minor < 0 { "-" } else { "" };
        format!(
            "{}{}.{:02}",
            sign,
            self.major().abs(),
            self.minor_part()
        )
    }
}

/// Divides rounding half away from zero. `denominator` must be positive.
fn round_half_up(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

/// Derives a sale price from a purchase price by applying [`RETAIL_MARGIN`].
///
/// ## Example
/// ```rust
/// use folio_core::money::{retail_price, Money};
///
/// // $7.25 × 1.11 = $8.0475 → $8.05
/// assert_eq!(retail_price(Money::from_cents(725)).minor(), 805);
/// ```
pub fn retail_price(purchase_price: Money) -> Money {
    purchase_price.multiply(RETAIL_MARGIN)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows symbol and amount, e.g. `$10.99` or `-€5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            self.currency.symbol(),
            self.major().abs(),
            self.minor_part()
        )
    }
}

/// Addition of two Money values. Panics on a currency mismatch.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        assert_eq!(
            self.currency, other.currency,
            "cannot add amounts of different currencies"
        );
        Money::from_minor(self.minor + other.minor, self.currency)
    }
}

/// Addition assignment (+=). Panics on a currency mismatch.
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Multiplication by a quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, quantity: u32) -> Self {
        self.times(quantity)
    }
}

/// Multiplication by a decimal scalar.
impl Mul<Multiplier> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Multiplier) -> Self {
        self.multiply(factor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
