//! # Purchases
//!
//! An immutable sale event and its line items.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Purchase                                                               │
//! │  ─────────────────────────────────────────────                          │
//! │  shop      ShopRef     { id, country }   ← partition key (country)     │
//! │  employee  EmployeeId                    ← employee of the year        │
//! │  customer  CustomerRef { id, country }   ← foreigner check             │
//! │  timestamp DateTime<Utc>                 ← partition key (year)        │
//! │  items     [PurchaseItem; 1..]           ← best-seller counting        │
//! │  total     Money (cached sum of item totals)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shop and customer references carry the country they resided in when the
//! purchase was made, so the query engine never consults the catalog.
//!
//! A purchase is validated once, in [`Purchase::new`], and never changes
//! afterwards. It is `Serialize` only; the constructor is the sole way in.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::catalog::{Book, BookId, CountryCode, Customer, CustomerId, EmployeeId, Shop, ShopId};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{validate_item_amount, validate_price};

// =============================================================================
// References
// =============================================================================

/// Non-owning reference to a shop plus its country of residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShopRef {
    pub id: ShopId,
    pub country: CountryCode,
}

impl From<&Shop> for ShopRef {
    fn from(shop: &Shop) -> Self {
        ShopRef {
            id: shop.id,
            country: shop.country,
        }
    }
}

/// Non-owning reference to a customer plus their country of residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CustomerRef {
    pub id: CustomerId,
    pub country: CountryCode,
}

impl From<&Customer> for CustomerRef {
    fn from(customer: &Customer) -> Self {
        CustomerRef {
            id: customer.id,
            country: customer.country,
        }
    }
}

// =============================================================================
// Purchase Item
// =============================================================================

/// One line of a purchase: a book, its unit price and the sold quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseItem {
    book: BookId,
    price: Money,
    amount: u32,
}

impl PurchaseItem {
    /// Creates a line item.
    ///
    /// ## Rules
    /// - `amount` must be positive
    /// - `price` must not be negative
    pub fn new(book: BookId, price: Money, amount: u32) -> CoreResult<Self> {
        validate_item_amount(amount)?;
        validate_price(price)?;
        Ok(PurchaseItem { book, price, amount })
    }

    /// Creates a line item sold at the book's retail price.
    pub fn at_retail(book: &Book, amount: u32) -> CoreResult<Self> {
        PurchaseItem::new(book.id, book.retail_price, amount)
    }

    #[inline]
    pub fn book(&self) -> BookId {
        self.book
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    #[inline]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// `price × amount`.
    #[inline]
    pub fn item_total(&self) -> Money {
        self.price.times(self.amount)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A sale: who sold what to whom, where and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    shop: ShopRef,
    employee: EmployeeId,
    customer: CustomerRef,
    timestamp: DateTime<Utc>,
    items: Box<[PurchaseItem]>,
    total: Money,
}

impl Purchase {
    /// Builds a purchase and caches its total.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyPurchase`] when `items` is empty
    /// - [`CoreError::CurrencyMismatch`] when items are priced in more than
    ///   one currency
    /// - [`CoreError::AmountOverflow`] when the total leaves the `i64` range
    pub fn new(
        shop: ShopRef,
        employee: EmployeeId,
        customer: CustomerRef,
        timestamp: DateTime<Utc>,
        items: Vec<PurchaseItem>,
    ) -> CoreResult<Self> {
        let currency = match items.first() {
            Some(first) => first.price.currency(),
            None => return Err(CoreError::EmptyPurchase),
        };
        let total = items.iter().try_fold(Money::zero(currency), |acc, item| {
            acc.checked_add(item.price.checked_times(item.amount)?)
        })?;

        Ok(Purchase {
            shop,
            employee,
            customer,
            timestamp,
            items: items.into_boxed_slice(),
            total,
        })
    }

    #[inline]
    pub fn shop(&self) -> ShopRef {
        self.shop
    }

    #[inline]
    pub fn employee(&self) -> EmployeeId {
        self.employee
    }

    #[inline]
    pub fn customer(&self) -> CustomerRef {
        self.customer
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Calendar year (UTC) the purchase falls into.
    #[inline]
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// Line items in the order they were rung up. Never empty.
    #[inline]
    pub fn items(&self) -> &[PurchaseItem] {
        &self.items
    }

    /// Sum of all item totals.
    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }

    /// Whether the customer lives outside the shop's country.
    #[inline]
    pub fn is_by_foreigner(&self) -> bool {
        self.customer.country != self.shop.country
    }

    /// Total number of copies sold in this purchase.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
