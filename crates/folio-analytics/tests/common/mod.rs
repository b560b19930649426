//! Shared fixtures for the integration test suites.
//!
//! Import via `mod common;`.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

pub use folio_analytics::{AnalyticsConfig, Data, IndexSettings, PurchaseIndex, Purchases};
pub use folio_core::{
    BookId, CountryCode, CustomerId, CustomerRef, EmployeeId, Money, Purchase, PurchaseItem,
    ShopId, ShopRef,
};

pub fn country(code: &str) -> CountryCode {
    code.parse().unwrap()
}

pub fn at(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 7, 15, 14, 0, 0).unwrap()
}

/// Index that aggregates in parallel from the very first purchase.
pub fn parallel_index() -> PurchaseIndex {
    PurchaseIndex::new(IndexSettings {
        chunk_capacity: 4,
        parallel_threshold: 1,
    })
}

/// Index that never aggregates in parallel.
pub fn sequential_index() -> PurchaseIndex {
    PurchaseIndex::new(IndexSettings {
        chunk_capacity: 4,
        parallel_threshold: 0,
    })
}

// ============================================================================
// Purchase Builder
// ============================================================================

/// Builds purchases without a catalog; ids are taken at face value.
#[derive(Debug, Clone)]
pub struct Sale {
    shop: ShopRef,
    employee: EmployeeId,
    customer: CustomerRef,
    year: i32,
    items: Vec<PurchaseItem>,
}

impl Sale {
    /// A sale at shop 0 in `shop_country` to a customer living in
    /// `customer_country`.
    pub fn new(year: i32, shop_country: &str, customer_country: &str) -> Self {
        Sale {
            shop: ShopRef {
                id: ShopId::new(0),
                country: country(shop_country),
            },
            employee: EmployeeId::new(0),
            customer: CustomerRef {
                id: CustomerId::new(0),
                country: country(customer_country),
            },
            year,
            items: Vec::new(),
        }
    }

    pub fn by(mut self, employee: u32) -> Self {
        self.employee = EmployeeId::new(employee);
        self
    }

    /// Adds a line of `amount` copies of `book` at `cents` each.
    pub fn item(mut self, book: u32, amount: u32, cents: i64) -> Self {
        self.items
            .push(PurchaseItem::new(BookId::new(book), Money::from_cents(cents), amount).unwrap());
        self
    }

    pub fn build(self) -> Purchase {
        Purchase::new(
            self.shop,
            self.employee,
            self.customer,
            at(self.year),
            self.items,
        )
        .unwrap()
    }
}
