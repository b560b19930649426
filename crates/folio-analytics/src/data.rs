//! # Data
//!
//! The catalog of books, shops, employees and customers together with the
//! purchases recorded against it.
//!
//! ## Recording Flow
//! ```text
//! record_purchase(purchase)
//!      │
//!      ├── shop, employee, customer, books exist? ──no──► Core(..NotFound)
//!      ├── shop / customer countries match catalog? ─no──► ReferenceMismatch
//!      ├── employee works at the shop? ──────────────no──► ReferenceMismatch
//!      │
//!      ▼
//! Purchases::append ──► visible to queries
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use folio_core::money::DEPLOYMENT_CURRENCY;
use folio_core::{Catalog, CoreError, CountryCode, Employee, Purchase};

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::purchases::Purchases;

/// Catalog plus purchase index.
#[derive(Debug, Default)]
pub struct Data {
    catalog: Catalog,
    purchases: Purchases,
}

impl Data {
    pub fn new(catalog: Catalog, config: &AnalyticsConfig) -> Self {
        info!(
            books = catalog.books().len(),
            shops = catalog.shops().len(),
            employees = catalog.employees().len(),
            customers = catalog.customers().len(),
            "Analytics data initialized"
        );
        Data {
            catalog,
            purchases: Purchases::new(config),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Query handle; clones share the same index.
    pub fn purchases(&self) -> &Purchases {
        &self.purchases
    }

    pub fn purchase_count(&self) -> usize {
        self.purchases.len()
    }

    /// Checks a purchase against the catalog and appends it.
    ///
    /// ## Errors
    /// - [`AnalyticsError::Core`] when a referenced entity is unknown
    /// - [`AnalyticsError::ReferenceMismatch`] when a denormalized country
    ///   or the employee's shop disagrees with the catalog
    pub fn record_purchase(&self, purchase: Purchase) -> AnalyticsResult<Arc<Purchase>> {
        if let Err(err) = self.check_references(&purchase) {
            warn!(error = %err, shop = %purchase.shop().id, "Rejected purchase");
            return Err(err);
        }

        let purchase = self.purchases.append(purchase);
        debug!(
            shop = %purchase.shop().id,
            employee = %purchase.employee(),
            year = purchase.year(),
            "Purchase recorded"
        );
        Ok(purchase)
    }

    fn check_references(&self, purchase: &Purchase) -> AnalyticsResult<()> {
        let shop_ref = purchase.shop();
        let shop = self.catalog.shop(shop_ref.id)?;
        if shop.country != shop_ref.country {
            return Err(AnalyticsError::ReferenceMismatch(format!(
                "{} is in {}, purchase says {}",
                shop.id, shop.country, shop_ref.country
            )));
        }

        let employee = self.catalog.employee(purchase.employee())?;
        if employee.shop != shop.id {
            return Err(AnalyticsError::ReferenceMismatch(format!(
                "{} works at {}, not {}",
                employee.id, employee.shop, shop.id
            )));
        }

        let customer_ref = purchase.customer();
        let customer = self.catalog.customer(customer_ref.id)?;
        if customer.country != customer_ref.country {
            return Err(AnalyticsError::ReferenceMismatch(format!(
                "{} lives in {}, purchase says {}",
                customer.id, customer.country, customer_ref.country
            )));
        }

        for item in purchase.items() {
            self.catalog.book(item.book())?;
            let found = item.price().currency();
            if found != DEPLOYMENT_CURRENCY {
                return Err(CoreError::CurrencyMismatch {
                    expected: DEPLOYMENT_CURRENCY,
                    found,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Resolves the employee of the year, overall or for one country.
    pub fn employee_of_the_year(&self, year: i32, country: Option<CountryCode>) -> Option<&Employee> {
        let id = match country {
            Some(country) => self.purchases.employee_of_the_year_in(year, country),
            None => self.purchases.employee_of_the_year(year),
        }?;
        self.catalog.employee(id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_core::{
        BookId, Currency, CustomerId, CustomerRef, EmployeeId, Money, PurchaseItem, ShopId,
        ShopRef,
    };

    struct Fixture {
        data: Data,
        book: BookId,
        shop: ShopId,
        clerk: EmployeeId,
        local: CustomerId,
    }

    fn code(s: &str) -> CountryCode {
        s.parse().unwrap()
    }

    fn fixture() -> Fixture {
        let mut catalog = Catalog::new();
        let book = catalog
            .add_book("978-0-306-40615-7", "Dune", "Frank Herbert", Money::from_cents(1000))
            .unwrap();
        let shop = catalog.add_shop("Corner Books", "Boston", code("US")).unwrap();
        let clerk = catalog.add_employee("Ann", shop).unwrap();
        let local = catalog.add_customer("Bob", code("US")).unwrap();
        Fixture {
            data: Data::new(catalog, &AnalyticsConfig::default()),
            book,
            shop,
            clerk,
            local,
        }
    }

    fn purchase(
        shop: ShopRef,
        employee: EmployeeId,
        customer: CustomerRef,
        book: BookId,
    ) -> Purchase {
        Purchase::new(
            shop,
            employee,
            customer,
            Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap(),
            vec![PurchaseItem::new(book, Money::from_cents(1110), 1).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_record_and_resolve_employee() {
        let f = fixture();
        let shop = ShopRef::from(f.data.catalog().shop(f.shop).unwrap());
        let customer = CustomerRef::from(f.data.catalog().customer(f.local).unwrap());

        f.data
            .record_purchase(purchase(shop, f.clerk, customer, f.book))
            .unwrap();

        assert_eq!(f.data.purchase_count(), 1);
        let employee = f.data.employee_of_the_year(2022, None).unwrap();
        assert_eq!(employee.name, "Ann");
        assert_eq!(f.data.employee_of_the_year(2022, Some(code("US"))).unwrap().id, f.clerk);
        assert!(f.data.employee_of_the_year(2022, Some(code("DE"))).is_none());
        assert!(f.data.employee_of_the_year(2021, None).is_none());
    }

    #[test]
    fn test_unknown_book_rejected() {
        let f = fixture();
        let shop = ShopRef::from(f.data.catalog().shop(f.shop).unwrap());
        let customer = CustomerRef::from(f.data.catalog().customer(f.local).unwrap());

        let err = f
            .data
            .record_purchase(purchase(shop, f.clerk, customer, BookId::new(42)))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Core(CoreError::BookNotFound(_))));
        assert!(err.is_integrity_error());
        assert_eq!(f.data.purchase_count(), 0);
    }

    #[test]
    fn test_country_mismatch_rejected() {
        let f = fixture();
        let wrong_shop = ShopRef { id: f.shop, country: code("DE") };
        let customer = CustomerRef::from(f.data.catalog().customer(f.local).unwrap());

        let err = f
            .data
            .record_purchase(purchase(wrong_shop, f.clerk, customer, f.book))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::ReferenceMismatch(_)));

        let shop = ShopRef::from(f.data.catalog().shop(f.shop).unwrap());
        let wrong_customer = CustomerRef { id: f.local, country: code("FR") };
        let err = f
            .data
            .record_purchase(purchase(shop, f.clerk, wrong_customer, f.book))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::ReferenceMismatch(_)));
        assert!(f.data.purchases().is_empty());
    }

    #[test]
    fn test_employee_of_other_shop_rejected() {
        let mut catalog = Catalog::new();
        let book = catalog
            .add_book("978-0-306-40615-7", "Dune", "Frank Herbert", Money::from_cents(1000))
            .unwrap();
        let boston = catalog.add_shop("Corner Books", "Boston", code("US")).unwrap();
        let denver = catalog.add_shop("Mile High", "Denver", code("US")).unwrap();
        let clerk = catalog.add_employee("Ann", denver).unwrap();
        let customer = catalog.add_customer("Bob", code("US")).unwrap();
        let data = Data::new(catalog, &AnalyticsConfig::default());

        let shop = ShopRef::from(data.catalog().shop(boston).unwrap());
        let customer = CustomerRef::from(data.catalog().customer(customer).unwrap());
        let err = data
            .record_purchase(purchase(shop, clerk, customer, book))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::ReferenceMismatch(_)));
    }

    #[test]
    fn test_unknown_employee_rejected() {
        let f = fixture();
        let shop = ShopRef::from(f.data.catalog().shop(f.shop).unwrap());
        let customer = CustomerRef::from(f.data.catalog().customer(f.local).unwrap());
        let err = f
            .data
            .record_purchase(purchase(shop, EmployeeId::new(9), customer, f.book))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Core(CoreError::EmployeeNotFound(_))));
    }

    #[test]
    fn test_foreign_currency_rejected() {
        let f = fixture();
        let shop = ShopRef::from(f.data.catalog().shop(f.shop).unwrap());
        let customer = CustomerRef::from(f.data.catalog().customer(f.local).unwrap());
        let in_euros = Purchase::new(
            shop,
            f.clerk,
            customer,
            Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap(),
            vec![PurchaseItem::new(f.book, Money::from_minor(1110, Currency::Eur), 1).unwrap()],
        )
        .unwrap();

        let err = f.data.record_purchase(in_euros).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::Core(CoreError::CurrencyMismatch {
                expected: Currency::Usd,
                found: Currency::Eur
            })
        ));
        assert!(err.is_integrity_error());
        assert_eq!(f.data.purchase_count(), 0);

        // Queries over the year stay in dollars after the rejection.
        f.data
            .record_purchase(purchase(shop, f.clerk, customer, f.book))
            .unwrap();
        assert_eq!(f.data.employee_of_the_year(2022, None).unwrap().id, f.clerk);
        let summary = f.data.purchases().summarize_totals(2022, |_| true).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.sum, Money::from_cents(1110));
    }
}
