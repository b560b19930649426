//! # Report Values
//!
//! Plain values returned by queries. They are built fresh for every
//! response and carry no handle back into the index.

use serde::Serialize;

use folio_core::{BookId, Money};

// =============================================================================
// Book Sales
// =============================================================================

/// A book and the number of copies sold within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BookSales {
    pub book: BookId,
    pub amount: u64,
}

impl BookSales {
    pub fn new(book: BookId, amount: u64) -> Self {
        BookSales { book, amount }
    }
}

/// Orders best-seller entries: most copies first, then ascending book id.
pub(crate) fn rank(sales: &mut [BookSales]) {
    sales.sort_unstable_by(|a, b| b.amount.cmp(&a.amount).then(a.book.cmp(&b.book)));
}

// =============================================================================
// Money Summary
// =============================================================================

/// Summary statistics over a set of amounts, e.g. purchase totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoneySummary {
    pub count: u64,
    pub sum: Money,
    pub min: Money,
    pub max: Money,
    /// `sum / count`, rounded half-up.
    pub average: Money,
}

impl MoneySummary {
    /// Summarizes `amounts`; `None` when there are none.
    ///
    /// All amounts must share one currency.
    pub fn of<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        let mut amounts = amounts.into_iter();
        let first = amounts.next()?;

        let (count, sum, min, max) = amounts.fold(
            (1u64, first, first, first),
            |(count, sum, min, max), amount| {
                (count + 1, sum + amount, min.min(amount), max.max(amount))
            },
        );

        Some(MoneySummary {
            count,
            sum,
            min,
            max,
            average: sum.div_round(count)?,
        })
    }
}
