//! # Purchase Log
//!
//! Append-only sequence of purchases backing every partition.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PurchaseLog (chunk_capacity = c)                                       │
//! │                                                                         │
//! │   segment 0: [ c slots ]                                                │
//! │   segment 1: [ 2c slots ]        every slot is written once            │
//! │   segment 2: [ 4c slots ]        segments are never moved or freed     │
//! │   ...                                                                   │
//! │   len: AtomicUsize               count of published slots               │
//! │                                                                         │
//! │  Writer ──writer mutex──► fill slot[len] ──► len.store(len + 1)         │
//! │  Reader ──len.load()──► Snapshot { storage, len } ──► reduce            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Readers take no lock at all: a snapshot is one `Arc` clone and one
//! atomic load. Slots below the published length are filled before the
//! length is released, so a snapshot either contains a complete purchase
//! or does not contain it. Writers serialize among themselves only.

use parking_lot::Mutex;
use rayon::prelude::*;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use folio_core::Purchase;

/// Segment `k` holds `chunk_capacity << k` slots, so this many segments
/// address more slots than a `usize` can count.
const SEGMENTS: usize = usize::BITS as usize;

type Slot = OnceLock<Arc<Purchase>>;
type Segment = Box<[Slot]>;

// =============================================================================
// Storage
// =============================================================================

struct Storage {
    base: usize,
    segments: [OnceLock<Segment>; SEGMENTS],
    len: AtomicUsize,
}

impl Storage {
    fn new(base: usize) -> Self {
        Storage {
            base: base.max(1),
            segments: std::array::from_fn(|_| OnceLock::new()),
            len: AtomicUsize::new(0),
        }
    }

    /// Segment and offset of the slot at `index`.
    fn locate(&self, index: usize) -> (usize, usize) {
        let run = (index / self.base).saturating_add(1);
        let segment = (usize::BITS - 1 - run.leading_zeros()) as usize;
        let start = self.base * ((1usize << segment) - 1);
        (segment, index - start)
    }

    fn segment_len(&self, segment: usize) -> usize {
        self.base.saturating_mul(1usize << segment)
    }

    /// Published slots, segment by segment, cut at `len`.
    fn runs(&self, len: usize) -> impl Iterator<Item = &[Slot]> + '_ {
        let mut remaining = len;
        self.segments
            .iter()
            .map_while(OnceLock::get)
            .map(move |segment| {
                let take = remaining.min(segment.len());
                remaining -= take;
                &segment[..take]
            })
            .take_while(|run| !run.is_empty())
    }
}

// =============================================================================
// Purchase Log
// =============================================================================

/// Append-only, snapshot-readable purchase sequence.
pub struct PurchaseLog {
    storage: Arc<Storage>,
    writer: Mutex<()>,
}

impl PurchaseLog {
    /// Creates an empty log whose first segment holds `chunk_capacity`
    /// purchases; each further segment doubles.
    pub fn new(chunk_capacity: usize) -> Self {
        PurchaseLog {
            storage: Arc::new(Storage::new(chunk_capacity)),
            writer: Mutex::new(()),
        }
    }

    /// Appends a purchase at the end of the log.
    pub fn push(&self, purchase: Arc<Purchase>) {
        let _writer = self.writer.lock();
        let storage = &*self.storage;

        let index = storage.len.load(Ordering::Relaxed);
        let (segment, offset) = storage.locate(index);
        let slots = storage.segments[segment].get_or_init(|| {
            (0..storage.segment_len(segment))
                .map(|_| OnceLock::new())
                .collect()
        });
        let fresh = slots[offset].set(purchase).is_ok();
        debug_assert!(fresh, "slot {index} written twice");

        storage.len.store(index + 1, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.storage.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captures the purchases appended so far.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            storage: Arc::clone(&self.storage),
            len: self.len(),
        }
    }
}

impl fmt::Debug for PurchaseLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurchaseLog")
            .field("chunk_capacity", &self.storage.base)
            .field("len", &self.len())
            .finish()
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A frozen view of a [`PurchaseLog`], in append order.
///
/// Holds no lock; later appends to the log are not visible through it.
#[derive(Clone)]
pub struct Snapshot {
    storage: Arc<Storage>,
    len: usize,
}

impl Snapshot {
    /// A snapshot of nothing, for partitions that do not exist.
    pub fn empty() -> Self {
        Snapshot {
            storage: Arc::new(Storage::new(1)),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sequential iteration in append order.
    pub fn iter(&self) -> SnapshotIter<'_> {
        let empty: &[Slot] = &[];
        SnapshotIter {
            segments: self.storage.segments.iter(),
            current: empty.iter(),
            remaining: self.len,
        }
    }

    /// Parallel iteration. No order guarantee.
    pub fn par_iter(&self) -> impl ParallelIterator<Item = &Purchase> + '_ {
        let runs: Vec<&[Slot]> = self.storage.runs(self.len).collect();
        runs.into_par_iter().flat_map(|run| {
            run.par_iter()
                .filter_map(|slot| slot.get().map(|purchase| &**purchase))
        })
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot").field("len", &self.len).finish()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Purchase;
    type IntoIter = SnapshotIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the purchases of a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotIter<'a> {
    segments: std::slice::Iter<'a, OnceLock<Segment>>,
    current: std::slice::Iter<'a, Slot>,
    remaining: usize,
}

impl<'a> Iterator for SnapshotIter<'a> {
    type Item = &'a Purchase;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(slot) = self.current.next() {
                self.remaining -= 1;
                return slot.get().map(|purchase| &**purchase);
            }
            self.current = self.segments.next()?.get()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SnapshotIter<'_> {}

impl FusedIterator for SnapshotIter<'_> {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_core::{BookId, CustomerId, CustomerRef, EmployeeId, Money, PurchaseItem, ShopId, ShopRef};

    /// Purchases are told apart by their employee id.
    fn purchase(tag: u32) -> Arc<Purchase> {
        let us = "US".parse().unwrap();
        let item = PurchaseItem::new(BookId::new(0), Money::from_cents(100), 1).unwrap();
        Arc::new(
            Purchase::new(
                ShopRef { id: ShopId::new(0), country: us },
                EmployeeId::new(tag),
                CustomerRef { id: CustomerId::new(0), country: us },
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                vec![item],
            )
            .unwrap(),
        )
    }

    fn tags(snapshot: &Snapshot) -> Vec<u32> {
        snapshot.iter().map(|p| p.employee().get()).collect()
    }

    #[test]
    fn test_empty_log() {
        let log = PurchaseLog::new(4);
        assert!(log.is_empty());
        let snapshot = log.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.iter().count(), 0);
        assert_eq!(Snapshot::empty().iter().next(), None);
    }

    #[test]
    fn test_order_preserved_across_segments() {
        let log = PurchaseLog::new(3);
        for tag in 0..10 {
            log.push(purchase(tag));
        }
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 10);
        assert_eq!(tags(&snapshot), (0..10).collect::<Vec<_>>());
        assert_eq!(snapshot.iter().len(), 10);
    }

    #[test]
    fn test_exact_multiple_of_capacity() {
        let log = PurchaseLog::new(2);
        for tag in 0..4 {
            log.push(purchase(tag));
        }
        assert_eq!(tags(&log.snapshot()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let log = PurchaseLog::new(2);
        log.push(purchase(1));
        let before = log.snapshot();
        log.push(purchase(2));
        log.push(purchase(3));

        assert_eq!(tags(&before), vec![1]);
        assert_eq!(tags(&log.snapshot()), vec![1, 2, 3]);
    }

    #[test]
    fn test_par_iter_visits_everything_once() {
        let log = PurchaseLog::new(7);
        for tag in 0..100 {
            log.push(purchase(tag));
        }
        let snapshot = log.snapshot();
        let mut seen: Vec<u32> = snapshot.par_iter().map(|p| p.employee().get()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = PurchaseLog::new(0);
        log.push(purchase(1));
        log.push(purchase(2));
        assert_eq!(tags(&log.snapshot()), vec![1, 2]);
    }

    #[test]
    fn test_segments_double_in_size() {
        let storage = Storage::new(3);
        assert_eq!(storage.locate(0), (0, 0));
        assert_eq!(storage.locate(2), (0, 2));
        assert_eq!(storage.locate(3), (1, 0));
        assert_eq!(storage.locate(8), (1, 5));
        assert_eq!(storage.locate(9), (2, 0));
        assert_eq!(storage.locate(20), (2, 11));
        assert_eq!(storage.locate(21), (3, 0));
        assert_eq!(storage.segment_len(2), 12);

        let log = PurchaseLog::new(3);
        for tag in 0..50 {
            log.push(purchase(tag));
        }
        assert_eq!(tags(&log.snapshot()), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_readers_ignore_the_writer_lock() {
        let log = PurchaseLog::new(2);
        for tag in 0..5 {
            log.push(purchase(tag));
        }

        // A writer mid-append must not stop a query from completing.
        let _writer = log.writer.lock();
        let snapshot = log.snapshot();
        assert_eq!(log.len(), 5);
        assert_eq!(tags(&snapshot), vec![0, 1, 2, 3, 4]);
        assert_eq!(snapshot.par_iter().count(), 5);
    }
}
