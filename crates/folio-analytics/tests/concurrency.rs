//! Appends racing with queries.
//!
//! Readers must never block on writers, never observe a partially added
//! purchase, and must see the index grow monotonically.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use common::*;

const WRITERS: u32 = 4;
const PER_WRITER: u32 = 500;
const COUNTRIES: [&str; 3] = ["US", "DE", "FR"];

fn copies_in(index: &PurchaseIndex, year: i32) -> u64 {
    index.compute_by_year(year, |purchases| purchases.map(|p| p.item_count()).sum())
}

fn sale_for(writer: u32, n: u32) -> Purchase {
    let shop = COUNTRIES[(n % 3) as usize];
    let customer = COUNTRIES[((n / 3) % 3) as usize];
    Sale::new(2024 + (n % 2) as i32, shop, customer)
        .by(writer)
        // Every purchase holds exactly three copies.
        .item(n % 5, 1, 100)
        .item(n % 7, 2, 250)
        .build()
}

#[test]
fn test_concurrent_writers_lose_nothing() {
    let index = Arc::new(PurchaseIndex::new(IndexSettings {
        chunk_capacity: 16,
        parallel_threshold: 64,
    }));

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let index = Arc::clone(&index);
            scope.spawn(move || {
                for n in 0..PER_WRITER {
                    index.append(sale_for(writer, n));
                }
            });
        }
    });

    let total = u64::from(WRITERS * PER_WRITER);
    assert_eq!(index.len() as u64, total);
    assert_eq!(copies_in(&index, 2024) + copies_in(&index, 2025), total * 3);

    // Country partitions hold exactly the purchases of their year.
    for year in [2024, 2025] {
        let overall: u64 = index.best_seller_list(year).iter().map(|s| s.amount).sum();
        let by_country: u64 = COUNTRIES
            .iter()
            .flat_map(|c| index.best_seller_list_in(year, country(c)))
            .map(|s| s.amount)
            .sum();
        assert_eq!(overall, by_country);

        let foreign_by_country: u64 = COUNTRIES
            .iter()
            .map(|c| index.count_purchases_of_foreigners_in(year, country(c)))
            .sum();
        assert_eq!(index.count_purchases_of_foreigners(year), foreign_by_country);
    }
}

#[test]
fn test_readers_see_monotonic_growth() {
    let index = Arc::new(PurchaseIndex::new(IndexSettings {
        chunk_capacity: 8,
        parallel_threshold: 32,
    }));
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        scope.spawn(|| {
            for n in 0..2_000 {
                // All in one year so every read covers the whole log.
                let purchase = Sale::new(2024, COUNTRIES[(n % 3) as usize], "US")
                    .by(n % 11)
                    .item(n % 13, 3, 100)
                    .build();
                index.append(purchase);
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..3 {
            scope.spawn(|| {
                let mut last_copies = 0;
                let mut last_purchases = 0;
                loop {
                    let finished = done.load(Ordering::Acquire);

                    // A snapshot never holds half a purchase.
                    let (purchases, copies) = index.compute_by_year(2024, |it| {
                        it.fold((0u64, 0u64), |(n, c), p| (n + 1, c + p.item_count()))
                    });
                    assert_eq!(copies, purchases * 3);
                    assert!(purchases >= last_purchases);

                    let ranked: u64 = index.best_seller_list(2024).iter().map(|s| s.amount).sum();
                    assert_eq!(ranked % 3, 0);
                    assert!(ranked >= last_copies);

                    last_purchases = purchases;
                    last_copies = ranked;
                    if finished {
                        break;
                    }
                }
                assert_eq!(last_purchases, 2_000);
            });
        }
    });

    assert_eq!(copies_in(&index, 2024), 6_000);
}

#[test]
fn test_long_reduction_does_not_block_appends() {
    let index = PurchaseIndex::default();
    index.append(Sale::new(2024, "US", "US").item(1, 1, 100).build());

    let seen = index.compute_by_year(2024, |purchases| {
        // Appending from inside a running reduction must not deadlock.
        index.append(Sale::new(2024, "US", "US").item(2, 1, 100).build());
        purchases.count()
    });

    assert_eq!(seen, 1);
    assert_eq!(index.len(), 2);
}

#[test]
fn test_shared_purchases_handle_across_threads() {
    let purchases = Purchases::default();

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let handle = purchases.clone();
            scope.spawn(move || {
                for n in 0..50 {
                    handle.append(sale_for(writer, n));
                }
            });
        }
    });

    assert_eq!(purchases.len(), (WRITERS * 50) as usize);
    assert_eq!(purchases.years().lower_bound(), 2024);
    assert_eq!(purchases.years().upper_bound(), 2025);
}
