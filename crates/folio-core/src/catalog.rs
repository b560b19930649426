//! # Catalog
//!
//! Master data the purchases point at: books, shops, employees and
//! customers.
//!
//! ## Ownership Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Catalog (owns master data)                        │
//! │                                                                         │
//! │   Registry<BookId, Book>        Registry<ShopId, Shop>                  │
//! │   Registry<EmployeeId, Employee> Registry<CustomerId, Customer>         │
//! │          ▲                              ▲                               │
//! │          │ BookId                       │ ShopId + CountryCode          │
//! │          │                              │                               │
//! │   ┌──────┴──────────────────────────────┴─────────┐                     │
//! │   │ Purchase (owned by the purchase index)        │                     │
//! │   │   holds ids, never references                 │                     │
//! │   └───────────────────────────────────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Registries are append-only arenas: an id is the position of the entry,
//! so a lookup is a bounds-checked index and ids are never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{retail_price, Money};
use crate::validation::{
    validate_country_code, validate_isbn13, validate_name, validate_price, ValidationResult,
};

// =============================================================================
// Identifiers
// =============================================================================

/// Ids that address a slot in a [`Registry`].
pub trait RegistryId: Copy + 'static {
    /// Builds the id for the entry stored at `index`.
    fn from_index(index: usize) -> Self;

    /// Position of the entry this id addresses.
    fn index(self) -> usize;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl RegistryId for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                $name(index as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Book`]. Ascending id order is the tie-break of
    /// best-seller rankings.
    BookId,
    "book"
);
entity_id!(
    /// Identifier of a [`Shop`].
    ShopId,
    "shop"
);
entity_id!(
    /// Identifier of an [`Employee`].
    EmployeeId,
    "employee"
);
entity_id!(
    /// Identifier of a [`Customer`].
    CustomerId,
    "customer"
);

// =============================================================================
// Country Code
// =============================================================================

/// ISO 3166 alpha-2 country code, always upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Parses and normalizes a code such as `"us"` → `US`.
    pub fn new(code: &str) -> ValidationResult<Self> {
        validate_country_code(code).map(CountryCode)
    }

    pub fn as_str(&self) -> &str {
        // Both bytes are validated ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for CountryCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CountryCode::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CountryCode::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Master Records
// =============================================================================

/// A book on sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    /// Normalized 13-digit ISBN.
    pub isbn13: String,
    pub title: String,
    pub author: String,
    /// What the company pays the publisher.
    pub purchase_price: Money,
    /// What customers pay: purchase price plus the retail margin.
    pub retail_price: Money,
}

/// A shop, resident in exactly one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub city: String,
    pub country: CountryCode,
}

/// An employee working in one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub shop: ShopId,
}

/// A customer with a country of residence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub country: CountryCode,
}

// =============================================================================
// Registry
// =============================================================================

/// Append-only arena keyed by a typed id.
#[derive(Debug, Clone)]
pub struct Registry<I, T> {
    entries: Vec<T>,
    _id: PhantomData<I>,
}

impl<I: RegistryId, T> Registry<I, T> {
    pub fn new() -> Self {
        Registry {
            entries: Vec::new(),
            _id: PhantomData,
        }
    }

    /// Stores the value built by `build`, which receives the new id.
    pub fn insert_with(&mut self, build: impl FnOnce(I) -> T) -> I {
        let id = I::from_index(self.entries.len());
        self.entries.push(build(id));
        id
    }

    #[inline]
    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get(id.index())
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        id.index() < self.entries.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(id, entry)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (I::from_index(index), entry))
    }
}

impl<I: RegistryId, T> Default for Registry<I, T> {
    fn default() -> Self {
        Registry::new()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Owner of all master records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Registry<BookId, Book>,
    shops: Registry<ShopId, Shop>,
    employees: Registry<EmployeeId, Employee>,
    customers: Registry<CustomerId, Customer>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a book; its retail price is derived from the purchase price.
    pub fn add_book(
        &mut self,
        isbn13: &str,
        title: &str,
        author: &str,
        purchase_price: Money,
    ) -> CoreResult<BookId> {
        let isbn13 = validate_isbn13(isbn13)?;
        let title = validate_name("title", title)?;
        let author = validate_name("author", author)?;
        validate_price(purchase_price)?;

        Ok(self.books.insert_with(|id| Book {
            id,
            isbn13,
            title,
            author,
            purchase_price,
            retail_price: retail_price(purchase_price),
        }))
    }

    pub fn add_shop(&mut self, name: &str, city: &str, country: CountryCode) -> CoreResult<ShopId> {
        let name = validate_name("shop name", name)?;
        let city = validate_name("city", city)?;

        Ok(self.shops.insert_with(|id| Shop {
            id,
            name,
            city,
            country,
        }))
    }

    /// Registers an employee of an existing shop.
    pub fn add_employee(&mut self, name: &str, shop: ShopId) -> CoreResult<EmployeeId> {
        let name = validate_name("employee name", name)?;
        if !self.shops.contains(shop) {
            return Err(CoreError::ShopNotFound(shop));
        }

        Ok(self.employees.insert_with(|id| Employee { id, name, shop }))
    }

    pub fn add_customer(&mut self, name: &str, country: CountryCode) -> CoreResult<CustomerId> {
        let name = validate_name("customer name", name)?;

        Ok(self.customers.insert_with(|id| Customer { id, name, country }))
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn book(&self, id: BookId) -> CoreResult<&Book> {
        self.books.get(id).ok_or(CoreError::BookNotFound(id))
    }

    pub fn shop(&self, id: ShopId) -> CoreResult<&Shop> {
        self.shops.get(id).ok_or(CoreError::ShopNotFound(id))
    }

    pub fn employee(&self, id: EmployeeId) -> CoreResult<&Employee> {
        self.employees.get(id).ok_or(CoreError::EmployeeNotFound(id))
    }

    pub fn customer(&self, id: CustomerId) -> CoreResult<&Customer> {
        self.customers.get(id).ok_or(CoreError::CustomerNotFound(id))
    }

    pub fn books(&self) -> &Registry<BookId, Book> {
        &self.books
    }

    pub fn shops(&self) -> &Registry<ShopId, Shop> {
        &self.shops
    }

    pub fn employees(&self) -> &Registry<EmployeeId, Employee> {
        &self.employees
    }

    pub fn customers(&self) -> &Registry<CustomerId, Customer> {
        &self.customers
    }

    /// Shops resident in `country`, in registration order.
    pub fn shops_in(&self, country: CountryCode) -> impl Iterator<Item = &Shop> + '_ {
        self.shops
            .iter()
            .map(|(_, shop)| shop)
            .filter(move |shop| shop.country == country)
    }

    /// Books whose title contains `query`, ignoring case, in insertion order.
    ///
    /// An empty or blank query matches every book.
    pub fn search_books_by_title<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Book> + 'a {
        let needle = query.trim().to_lowercase();
        self.books
            .iter()
            .map(|(_, book)| book)
            .filter(move |book| book.title.to_lowercase().contains(&needle))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
