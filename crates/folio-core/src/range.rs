//! # Range
//!
//! Inclusive integer interval, used for the span of years that hold
//! purchase data. Year selectors bound their input with it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// An inclusive interval `lower..=upper` with `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    lower: i32,
    upper: i32,
}

impl Range {
    /// Creates a range, rejecting inverted bounds.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::Range;
    ///
    /// let years = Range::new(2019, 2024).unwrap();
    /// assert!(years.contains(2020));
    /// assert!(Range::new(2024, 2019).is_err());
    /// ```
    pub fn new(lower: i32, upper: i32) -> ValidationResult<Self> {
        if lower > upper {
            return Err(ValidationError::InvalidRange { lower, upper });
        }
        Ok(Range { lower, upper })
    }

    /// A degenerate range holding exactly one value.
    #[inline]
    pub const fn single(value: i32) -> Self {
        Range {
            lower: value,
            upper: value,
        }
    }

    /// The smallest range holding both values, in either order.
    #[inline]
    pub fn spanning(a: i32, b: i32) -> Self {
        Range {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    /// Whether `value` lies within the bounds (inclusive).
    #[inline]
    pub const fn contains(&self, value: i32) -> bool {
        self.lower <= value && value <= self.upper
    }

    #[inline]
    pub const fn lower_bound(&self) -> i32 {
        self.lower
    }

    #[inline]
    pub const fn upper_bound(&self) -> i32 {
        self.upper
    }

    /// Number of values in the range (never zero).
    #[inline]
    pub fn len(&self) -> u64 {
        (i64::from(self.upper) - i64::from(self.lower) + 1) as u64
    }

    /// Clamps `value` into the range.
    #[inline]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.lower, self.upper)
    }

    /// Iterates every value in the range, ascending.
    pub fn iter(&self) -> std::ops::RangeInclusive<i32> {
        self.lower..=self.upper
    }
}

impl IntoIterator for Range {
    type Item = i32;
    type IntoIter = std::ops::RangeInclusive<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let range = Range::new(2010, 2012).unwrap();
        assert!(range.contains(2010));
        assert!(range.contains(2012));
        assert!(!range.contains(2009));
        assert!(!range.contains(2013));
    }

    #[test]
    fn test_single() {
        let range = Range::single(2026);
        assert_eq!(range.lower_bound(), 2026);
        assert_eq!(range.upper_bound(), 2026);
        assert_eq!(range.len(), 1);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![2026]);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = Range::new(5, 4).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRange { lower: 5, upper: 4 }));
    }

    #[test]
    fn test_spanning_orders_bounds() {
        assert_eq!(Range::spanning(2024, 2019), Range::new(2019, 2024).unwrap());
        assert_eq!(Range::spanning(7, 7), Range::single(7));
    }

    #[test]
    fn test_clamp_and_len() {
        let range = Range::new(-2, 3).unwrap();
        assert_eq!(range.len(), 6);
        assert_eq!(range.clamp(10), 3);
        assert_eq!(range.clamp(-10), -2);
        assert_eq!(range.clamp(0), 0);
        assert_eq!(range.to_string(), "-2..=3");
    }

    #[test]
    fn test_extreme_bounds() {
        let range = Range::new(i32::MIN, i32::MAX).unwrap();
        assert_eq!(range.len(), 1u64 << 32);
    }
}
