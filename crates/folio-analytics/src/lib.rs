//! # folio-analytics: Sales Query Engine for Folio
//!
//! Holds every recorded purchase and answers aggregate questions about
//! them: best sellers, purchases by foreigners and the employee of the
//! year, each per calendar year and optionally per shop country.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Query Engine Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  Data (catalog + purchases)                      │  │
//! │  │                                                                  │  │
//! │  │  record_purchase: reference checks, then append                  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │             Purchases (cloneable facade, report views)           │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │                         PurchaseIndex                            │  │
//! │  │                                                                  │  │
//! │  │   year ──► PurchaseLog (all)                                     │  │
//! │  │        └─► country ──► PurchaseLog                               │  │
//! │  │                                                                  │  │
//! │  │   snapshots ──► sequential or rayon reductions                   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`index`] - Year / country partitioned purchase index and its queries
//! - [`purchase_log`] - Append-only, snapshot-readable purchase log
//! - [`purchases`] - Shared query handle with report views
//! - [`data`] - Catalog plus purchases, with reference checks
//! - [`book_sales`] - Report value types
//! - [`config`] - Index and report settings (TOML + environment)
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Analytics error types
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use folio_analytics::{AnalyticsConfig, Data};
//! use folio_core::{Catalog, CustomerRef, Money, Purchase, PurchaseItem, ShopRef};
//!
//! let mut catalog = Catalog::new();
//! let book = catalog
//!     .add_book("978-0-306-40615-7", "Dune", "Frank Herbert", Money::from_cents(1000))
//!     .unwrap();
//! let shop = catalog.add_shop("Corner Books", "Boston", "US".parse().unwrap()).unwrap();
//! let clerk = catalog.add_employee("Ann", shop).unwrap();
//! let customer = catalog.add_customer("Bea", "DE".parse().unwrap()).unwrap();
//!
//! let data = Data::new(catalog, &AnalyticsConfig::default());
//! let purchase = Purchase::new(
//!     ShopRef::from(data.catalog().shop(shop).unwrap()),
//!     clerk,
//!     CustomerRef::from(data.catalog().customer(customer).unwrap()),
//!     Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap(),
//!     vec![PurchaseItem::at_retail(data.catalog().book(book).unwrap(), 2).unwrap()],
//! )
//! .unwrap();
//! data.record_purchase(purchase).unwrap();
//!
//! let purchases = data.purchases();
//! assert_eq!(purchases.best_seller_list(2024)[0].amount, 2);
//! assert_eq!(purchases.count_purchases_of_foreigners(2024), 1);
//! assert_eq!(purchases.employee_of_the_year(2024), Some(clerk));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod book_sales;
pub mod config;
pub mod data;
pub mod error;
pub mod index;
pub mod purchase_log;
pub mod purchases;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use book_sales::{BookSales, MoneySummary};
pub use config::{AnalyticsConfig, IndexSettings, ReportSettings};
pub use data::Data;
pub use error::{AnalyticsError, AnalyticsResult};
pub use index::PurchaseIndex;
pub use purchase_log::{PurchaseLog, Snapshot, SnapshotIter};
pub use purchases::Purchases;
pub use telemetry::init_tracing;
