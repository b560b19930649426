//! # Purchase Index
//!
//! Owns every purchase, partitioned by year and, within a year, by the
//! country of the shop that made the sale.
//!
//! ## Partitioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PurchaseIndex                                                          │
//! │                                                                         │
//! │  years: DashMap<year, YearPartition>                                    │
//! │    │                                                                    │
//! │    ├── 2023 ─► all: PurchaseLog [p, p, p, p, p, ...]                     │
//! │    │           by_country: DashMap<CountryCode, PurchaseLog>            │
//! │    │             ├── US ─► [p, p, ...]                                  │
//! │    │             └── DE ─► [p, ...]                                     │
//! │    │                                                                    │
//! │    └── 2024 ─► ...                                                      │
//! │                                                                         │
//! │  Every purchase sits in exactly one year's `all` log and in that        │
//! │  year's log for its shop country. Nothing is ever removed.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Query Flow
//! ```text
//! query(year[, country])
//!      │
//!      ▼
//! look up partition ──missing──► empty snapshot ──► [] / 0 / None
//!      │
//!      ▼
//! snapshot (Arc clone + atomic length load, no lock)
//!      │
//!      ├── len < parallel_threshold ──► sequential reduce
//!      └── otherwise ─────────────────► rayon fold + reduce
//! ```
//!
//! Parallel aggregation is only used for associative reductions (sums,
//! counts, max-by). Caller supplied reductions in [`PurchaseIndex::compute_by_year`]
//! always run sequentially, in append order.

use chrono::{Datelike, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, trace};

use folio_core::{BookId, CountryCode, EmployeeId, Money, Purchase, Range};

use crate::book_sales::{rank, BookSales};
use crate::config::IndexSettings;
use crate::purchase_log::{PurchaseLog, Snapshot, SnapshotIter};

// =============================================================================
// Year Partition
// =============================================================================

#[derive(Debug)]
struct YearPartition {
    all: PurchaseLog,
    by_country: DashMap<CountryCode, Arc<PurchaseLog>>,
}

impl YearPartition {
    fn new(chunk_capacity: usize) -> Self {
        YearPartition {
            all: PurchaseLog::new(chunk_capacity),
            by_country: DashMap::new(),
        }
    }
}

// =============================================================================
// Purchase Index
// =============================================================================

/// Year / country partitioned store of purchases with aggregate queries.
///
/// Shared between threads behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct PurchaseIndex {
    settings: IndexSettings,
    years: DashMap<i32, Arc<YearPartition>>,
    /// Serializes writers so a year's `all` log and its country logs
    /// receive purchases in the same relative order.
    append_lock: Mutex<()>,
}

impl Default for PurchaseIndex {
    fn default() -> Self {
        PurchaseIndex::new(IndexSettings::default())
    }
}

impl PurchaseIndex {
    pub fn new(settings: IndexSettings) -> Self {
        PurchaseIndex {
            settings,
            years: DashMap::new(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    // =========================================================================
    // Append
    // =========================================================================

    /// Adds a purchase to its year partition and to the sub-partition of its
    /// shop's country, creating either on first use.
    ///
    /// The purchase is validated at construction, so appending cannot fail.
    /// It becomes visible to snapshots taken after this call returns.
    pub fn append(&self, purchase: Purchase) -> Arc<Purchase> {
        let purchase = Arc::new(purchase);
        let year = purchase.year();
        let country = purchase.shop().country;

        let _writer = self.append_lock.lock();

        let partition = self.year_partition_or_create(year);
        // The map guard must be released before inserting into the same shard.
        let existing = partition
            .by_country
            .get(&country)
            .map(|log| Arc::clone(log.value()));
        let country_log = match existing {
            Some(log) => log,
            None => {
                debug!(year, %country, "Creating country partition");
                let log = Arc::new(PurchaseLog::new(self.settings.chunk_capacity));
                partition.by_country.insert(country, Arc::clone(&log));
                log
            }
        };

        partition.all.push(Arc::clone(&purchase));
        country_log.push(Arc::clone(&purchase));

        trace!(year, %country, total = %purchase.total(), "Purchase appended");
        purchase
    }

    fn year_partition_or_create(&self, year: i32) -> Arc<YearPartition> {
        if let Some(partition) = self.year_partition(year) {
            return partition;
        }

        debug!(year, "Creating year partition");
        let partition = Arc::new(YearPartition::new(self.settings.chunk_capacity));
        self.years.insert(year, Arc::clone(&partition));
        partition
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    fn year_partition(&self, year: i32) -> Option<Arc<YearPartition>> {
        self.years.get(&year).map(|partition| Arc::clone(partition.value()))
    }

    fn year_snapshot(&self, year: i32) -> Snapshot {
        self.year_partition(year)
            .map(|partition| partition.all.snapshot())
            .unwrap_or_else(Snapshot::empty)
    }

    fn country_snapshot(&self, year: i32, country: CountryCode) -> Snapshot {
        self.year_partition(year)
            .and_then(|partition| {
                partition
                    .by_country
                    .get(&country)
                    .map(|log| Arc::clone(log.value()))
            })
            .map(|log| log.snapshot())
            .unwrap_or_else(Snapshot::empty)
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// Span from the earliest to the latest year holding purchases.
    ///
    /// An empty index reports the current calendar year as a single-year
    /// range, so year selectors always have valid bounds.
    pub fn years(&self) -> Range {
        let mut years = self.years.iter().map(|entry| *entry.key());
        match years.next() {
            Some(first) => years.fold(Range::single(first), |span, year| {
                Range::spanning(
                    span.lower_bound().min(year),
                    span.upper_bound().max(year),
                )
            }),
            None => Range::single(Utc::now().year()),
        }
    }

    /// Countries with at least one sale in `year`, sorted.
    pub fn countries(&self, year: i32) -> Vec<CountryCode> {
        let mut countries: Vec<CountryCode> = self
            .year_partition(year)
            .map(|partition| partition.by_country.iter().map(|e| *e.key()).collect())
            .unwrap_or_default();
        countries.sort_unstable();
        countries
    }

    /// Number of purchases across all years.
    pub fn len(&self) -> usize {
        self.years.iter().map(|entry| entry.value().all.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Best Seller List
    // =========================================================================

    /// Books sold in `year`, most copies first, ties by ascending book id.
    pub fn best_seller_list(&self, year: i32) -> Vec<BookSales> {
        let result = self.best_sellers(&self.year_snapshot(year));
        trace!(year, books = result.len(), "Best seller list computed");
        result
    }

    /// Books sold in `year` by shops in `country`, ordered as
    /// [`best_seller_list`](Self::best_seller_list).
    pub fn best_seller_list_in(&self, year: i32, country: CountryCode) -> Vec<BookSales> {
        let result = self.best_sellers(&self.country_snapshot(year, country));
        trace!(year, %country, books = result.len(), "Best seller list computed");
        result
    }

    fn best_sellers(&self, snapshot: &Snapshot) -> Vec<BookSales> {
        let copies: HashMap<BookId, u64> = if self.settings.use_parallel(snapshot.len()) {
            snapshot
                .par_iter()
                .fold(HashMap::new, |mut acc, purchase| {
                    tally_copies(&mut acc, purchase);
                    acc
                })
                .reduce(HashMap::new, |a, b| merge_with(a, b, |x, y| *x += y))
        } else {
            let mut acc = HashMap::new();
            for purchase in snapshot {
                tally_copies(&mut acc, purchase);
            }
            acc
        };

        let mut sales: Vec<BookSales> = copies
            .into_iter()
            .map(|(book, amount)| BookSales::new(book, amount))
            .collect();
        rank(&mut sales);
        sales
    }

    // =========================================================================
    // Purchases of Foreigners
    // =========================================================================

    /// Purchases in `year` whose customer lives outside the shop's country.
    pub fn count_purchases_of_foreigners(&self, year: i32) -> u64 {
        let snapshot = self.year_snapshot(year);
        let count = self.count_where(&snapshot, Purchase::is_by_foreigner);
        trace!(year, count, "Purchases of foreigners counted");
        count
    }

    /// Purchases in `year` at shops in `country` by customers living
    /// elsewhere.
    pub fn count_purchases_of_foreigners_in(&self, year: i32, country: CountryCode) -> u64 {
        let snapshot = self.country_snapshot(year, country);
        let count = self.count_where(&snapshot, |purchase| purchase.customer().country != country);
        trace!(year, %country, count, "Purchases of foreigners counted");
        count
    }

    fn count_where<P>(&self, snapshot: &Snapshot, predicate: P) -> u64
    where
        P: Fn(&Purchase) -> bool + Sync + Send,
    {
        let count = if self.settings.use_parallel(snapshot.len()) {
            snapshot.par_iter().filter(|purchase| predicate(*purchase)).count()
        } else {
            snapshot.iter().filter(|purchase| predicate(*purchase)).count()
        };
        count as u64
    }

    // =========================================================================
    // Employee of the Year
    // =========================================================================

    /// The employee with the highest summed purchase totals in `year`.
    ///
    /// `None` when nothing was sold that year. Equal totals go to the
    /// lowest employee id.
    pub fn employee_of_the_year(&self, year: i32) -> Option<EmployeeId> {
        let best = self.top_employee(&self.year_snapshot(year));
        trace!(year, employee = ?best, "Employee of the year computed");
        best
    }

    /// Like [`employee_of_the_year`](Self::employee_of_the_year), limited to
    /// shops in `country`.
    pub fn employee_of_the_year_in(&self, year: i32, country: CountryCode) -> Option<EmployeeId> {
        let best = self.top_employee(&self.country_snapshot(year, country));
        trace!(year, %country, employee = ?best, "Employee of the year computed");
        best
    }

    fn top_employee(&self, snapshot: &Snapshot) -> Option<EmployeeId> {
        let totals: HashMap<EmployeeId, Money> = if self.settings.use_parallel(snapshot.len()) {
            snapshot
                .par_iter()
                .fold(HashMap::new, |mut acc, purchase| {
                    tally_revenue(&mut acc, purchase);
                    acc
                })
                .reduce(HashMap::new, |a, b| merge_with(a, b, |x, y| *x += y))
        } else {
            let mut acc = HashMap::new();
            for purchase in snapshot {
                tally_revenue(&mut acc, purchase);
            }
            acc
        };

        totals
            .into_iter()
            .max_by(|(a_id, a_total), (b_id, b_total)| {
                a_total.cmp(b_total).then_with(|| b_id.cmp(a_id))
            })
            .map(|(employee, _)| employee)
    }

    // =========================================================================
    // Custom Reductions
    // =========================================================================

    /// Runs `reduction` over the purchases of `year` in append order and
    /// returns its result.
    ///
    /// The reduction sees shared references only and runs on a snapshot,
    /// so concurrent appends neither block it nor show up in it.
    ///
    /// ## Example
    /// ```rust
    /// use folio_analytics::PurchaseIndex;
    ///
    /// let index = PurchaseIndex::default();
    /// let copies: u64 = index.compute_by_year(2024, |purchases| {
    ///     purchases.map(|p| p.item_count()).sum()
    /// });
    /// assert_eq!(copies, 0);
    /// ```
    pub fn compute_by_year<R, F>(&self, year: i32, reduction: F) -> R
    where
        F: FnOnce(SnapshotIter<'_>) -> R,
    {
        let snapshot = self.year_snapshot(year);
        reduction(snapshot.iter())
    }
}

// =============================================================================
// Reduction Helpers
// =============================================================================

fn tally_copies(acc: &mut HashMap<BookId, u64>, purchase: &Purchase) {
    for item in purchase.items() {
        *acc.entry(item.book()).or_insert(0) += u64::from(item.amount());
    }
}

fn tally_revenue(acc: &mut HashMap<EmployeeId, Money>, purchase: &Purchase) {
    acc.entry(purchase.employee())
        .and_modify(|total| *total += purchase.total())
        .or_insert_with(|| purchase.total());
}

/// Merges the smaller map into the larger one.
fn merge_with<K, V, F>(a: HashMap<K, V>, b: HashMap<K, V>, combine: F) -> HashMap<K, V>
where
    K: Eq + Hash,
    F: Fn(&mut V, V),
{
    let (mut into, from) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (key, value) in from {
        match into.get_mut(&key) {
            Some(existing) => combine(existing, value),
            None => {
                into.insert(key, value);
            }
        }
    }
    into
}

// =============================================================================
// Unit Tests
// =============================================================================
