//! # Purchases
//!
//! Query façade over a shared [`PurchaseIndex`]. Adds report views that
//! are sized by configuration: the top-N best seller list and summary
//! statistics over purchase totals.
//!
//! ```text
//! Purchases ──clone──► Purchases      (cheap, same index)
//!     │                    │
//!     └──────► Arc<PurchaseIndex> ◄───┘
//! ```

use std::sync::Arc;

use folio_core::{CountryCode, EmployeeId, Purchase, Range};

use crate::book_sales::{BookSales, MoneySummary};
use crate::config::{AnalyticsConfig, ReportSettings};
use crate::index::PurchaseIndex;
use crate::purchase_log::SnapshotIter;

/// Cloneable handle for appending and querying purchases.
#[derive(Debug, Clone)]
pub struct Purchases {
    index: Arc<PurchaseIndex>,
    reports: ReportSettings,
}

impl Default for Purchases {
    fn default() -> Self {
        Purchases::new(&AnalyticsConfig::default())
    }
}

impl Purchases {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Purchases {
            index: Arc::new(PurchaseIndex::new(config.index.clone())),
            reports: config.reports.clone(),
        }
    }

    /// Wraps an existing index, e.g. one shared with other handles.
    pub fn with_index(index: Arc<PurchaseIndex>, reports: ReportSettings) -> Self {
        Purchases { index, reports }
    }

    pub fn index(&self) -> &Arc<PurchaseIndex> {
        &self.index
    }

    pub fn append(&self, purchase: Purchase) -> Arc<Purchase> {
        self.index.append(purchase)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn years(&self) -> Range {
        self.index.years()
    }

    pub fn countries(&self, year: i32) -> Vec<CountryCode> {
        self.index.countries(year)
    }

    pub fn best_seller_list(&self, year: i32) -> Vec<BookSales> {
        self.index.best_seller_list(year)
    }

    pub fn best_seller_list_in(&self, year: i32, country: CountryCode) -> Vec<BookSales> {
        self.index.best_seller_list_in(year, country)
    }

    pub fn count_purchases_of_foreigners(&self, year: i32) -> u64 {
        self.index.count_purchases_of_foreigners(year)
    }

    pub fn count_purchases_of_foreigners_in(&self, year: i32, country: CountryCode) -> u64 {
        self.index.count_purchases_of_foreigners_in(year, country)
    }

    pub fn employee_of_the_year(&self, year: i32) -> Option<EmployeeId> {
        self.index.employee_of_the_year(year)
    }

    pub fn employee_of_the_year_in(&self, year: i32, country: CountryCode) -> Option<EmployeeId> {
        self.index.employee_of_the_year_in(year, country)
    }

    pub fn compute_by_year<R, F>(&self, year: i32, reduction: F) -> R
    where
        F: FnOnce(SnapshotIter<'_>) -> R,
    {
        self.index.compute_by_year(year, reduction)
    }

    // =========================================================================
    // Report Views
    // =========================================================================

    /// The best seller list cut down to the configured `top_n` entries,
    /// for all shops or for the shops of one country.
    pub fn top_sellers(&self, year: i32, country: Option<CountryCode>) -> Vec<BookSales> {
        let mut sales = match country {
            Some(country) => self.best_seller_list_in(year, country),
            None => self.best_seller_list(year),
        };
        sales.truncate(self.reports.top_n);
        sales
    }

    /// Count, sum, extremes and average of the totals of the purchases in
    /// `year` that pass `filter`. `None` when no purchase passes.
    ///
    /// ## Example
    /// ```rust
    /// use folio_analytics::Purchases;
    ///
    /// let purchases = Purchases::default();
    /// assert!(purchases.summarize_totals(2024, |p| p.is_by_foreigner()).is_none());
    /// ```
    pub fn summarize_totals<F>(&self, year: i32, filter: F) -> Option<MoneySummary>
    where
        F: Fn(&Purchase) -> bool,
    {
        self.compute_by_year(year, |purchases| {
            MoneySummary::of(
                purchases
                    .filter(|purchase| filter(*purchase))
                    .map(Purchase::total),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_core::{BookId, CustomerId, CustomerRef, Money, PurchaseItem, ShopId, ShopRef};

    fn code(s: &str) -> CountryCode {
        s.parse().unwrap()
    }

    fn sale(shop_country: &str, customer_country: &str, cents: i64, books: &[(u32, u32)]) -> Purchase {
        let items = books
            .iter()
            .map(|&(book, amount)| {
                PurchaseItem::new(BookId::new(book), Money::from_cents(cents), amount).unwrap()
            })
            .collect();
        Purchase::new(
            ShopRef { id: ShopId::new(0), country: code(shop_country) },
            EmployeeId::new(0),
            CustomerRef { id: CustomerId::new(0), country: code(customer_country) },
            Utc.with_ymd_and_hms(2023, 3, 1, 9, 30, 0).unwrap(),
            items,
        )
        .unwrap()
    }

    fn purchases_with_top_n(top_n: usize) -> Purchases {
        let mut config = AnalyticsConfig::default();
        config.reports.top_n = top_n;
        Purchases::new(&config)
    }

    #[test]
    fn test_top_sellers_truncates() {
        let purchases = purchases_with_top_n(2);
        purchases.append(sale("US", "US", 100, &[(1, 1), (2, 5), (3, 3)]));

        let top: Vec<u32> = purchases
            .top_sellers(2023, None)
            .iter()
            .map(|s| s.book.get())
            .collect();
        assert_eq!(top, vec![2, 3]);
        assert!(purchases.top_sellers(2023, Some(code("FR"))).is_empty());
    }

    #[test]
    fn test_summarize_totals() {
        let purchases = Purchases::default();
        purchases.append(sale("US", "US", 1000, &[(1, 1)]));
        purchases.append(sale("US", "DE", 250, &[(1, 2)]));
        purchases.append(sale("DE", "FR", 300, &[(2, 1)]));

        let all = purchases.summarize_totals(2023, |_| true).unwrap();
        assert_eq!(all.count, 3);
        assert_eq!(all.sum.minor(), 1800);
        assert_eq!(all.max.minor(), 1000);

        let foreign = purchases.summarize_totals(2023, Purchase::is_by_foreigner).unwrap();
        assert_eq!(foreign.count, 2);
        assert_eq!(foreign.min.minor(), 300);
        assert_eq!(foreign.average.minor(), 400);

        assert!(purchases.summarize_totals(1999, |_| true).is_none());
    }

    #[test]
    fn test_clones_share_index() {
        let purchases = Purchases::default();
        let other = purchases.clone();
        other.append(sale("US", "US", 100, &[(1, 1)]));
        assert_eq!(purchases.len(), 1);
        assert!(Arc::ptr_eq(purchases.index(), other.index()));
    }
}
