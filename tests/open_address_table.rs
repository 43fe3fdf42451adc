// OpenAddressTable integration suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Placement: growth precedes placement; inserts reclaim the earliest
//   tombstone on the probe path.
// - Deletion: erase leaves a tombstone; missing keys are reported, not
//   raised.
// - Resources: every store the table allocates is released exactly once,
//   and allocation failures leave the table unchanged.
// - Policies: custom hashers, key-equality predicates and load factors are
//   honored and exposed through accessors.
use probe_table::{
    Bounded, DefaultKeyEq, Heap, KeyEq, LoadFactor, OpenAddressTable, SlotAllocator, TableError,
};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

#[derive(Clone, Copy, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

/// Counts store allocations and releases, and can be told to fail.
#[derive(Clone, Default)]
struct Tally {
    allocs: Rc<Cell<usize>>,
    frees: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl SlotAllocator for Tally {
    fn allocate<T>(&self, n: usize) -> Result<Vec<T>, TableError> {
        if self.fail.get() {
            return Err(TableError::AllocationFailure { requested: n });
        }
        self.allocs.set(self.allocs.get() + 1);
        Heap.allocate(n)
    }

    fn deallocate<T>(&self, store: Vec<T>) {
        self.frees.set(self.frees.get() + 1);
        drop(store);
    }
}

type TallyTable = OpenAddressTable<u32, String, probe_table::DefaultHashBuilder, DefaultKeyEq, Tally>;

fn tally_table(tally: &Tally, buckets: usize) -> TallyTable {
    OpenAddressTable::with_parts(
        buckets,
        Default::default(),
        DefaultKeyEq,
        tally.clone(),
        LoadFactor::DEFAULT,
    )
    .expect("allocation")
}

// Test: growth on a small pre-sized table.
// Assumes: 5 buckets at load factor 0.5 hold at most 2 entries.
// Verifies: the third insert grows the table before landing; all keys stay
// findable with their values.
#[test]
fn third_insert_into_five_buckets_grows() {
    let mut t: OpenAddressTable<&str, i32> = OpenAddressTable::with_buckets(5).unwrap();
    assert_eq!(t.bucket_count(), 5);
    t.insert("a", 1).unwrap();
    t.insert("b", 2).unwrap();
    assert_eq!(t.bucket_count(), 5);
    t.insert("c", 3).unwrap();
    assert!(t.bucket_count() >= 6);
    assert!(t.load_factor() <= 0.5);
    assert_eq!(t.get("a"), Some(&1));
    assert_eq!(t.get("b"), Some(&2));
    assert_eq!(t.get("c"), Some(&3));
}

// Test: tombstone reclamation.
// Assumes: with a constant hasher every key shares home slot 0.
// Verifies: after erasing k, a different key with the same home lands in
// k's old slot, and k stays absent.
#[test]
fn colliding_key_reuses_erased_slot() {
    let mut t: OpenAddressTable<String, i32, ConstBuildHasher> =
        OpenAddressTable::with_buckets_and_hasher(8, ConstBuildHasher).unwrap();
    let (b, _) = t.insert("k".to_string(), 1).unwrap();
    assert_eq!(b.index(), 0);
    assert!(t.erase("k"));
    let (b2, inserted) = t.insert("k2".to_string(), 2).unwrap();
    assert!(inserted);
    assert_eq!(b2.index(), b.index());
    assert!(t.find("k").is_none());
    assert_eq!(t.get("k2"), Some(&2));
}

// Test: erase-then-reinsert.
// Verifies: an erased key is absent, can be inserted again, and the new
// value is the one found.
#[test]
fn erase_then_reinsert_observes_new_value() {
    let mut t: OpenAddressTable<String, i32> = OpenAddressTable::new();
    t.insert("k".to_string(), 1).unwrap();
    assert!(t.erase("k"));
    assert!(t.find("k").is_none());
    assert!(!t.erase("k"), "second erase reports absence");
    assert_eq!(t.len(), 0);
    let (_, inserted) = t.insert("k".to_string(), 2).unwrap();
    assert!(inserted);
    assert_eq!(t.at("k"), Ok(&2));
}

// Test: strict lookup.
// Verifies: `at` reports KeyNotFound and never inserts.
#[test]
fn at_reports_missing_key() {
    let mut t: OpenAddressTable<u8, u8> = OpenAddressTable::from([(1, 10)]);
    assert_eq!(t.at(&2), Err(TableError::KeyNotFound));
    assert_eq!(t.at_mut(&2), Err(TableError::KeyNotFound));
    assert_eq!(t.len(), 1);
    assert_eq!(t.at(&1), Ok(&10));
}

// Test: rehash preserves contents.
// Assumes: rehash targets at least the requested count.
// Verifies: every entry survives growth and shrink, tombstones are gone.
#[test]
fn rehash_round_trip_keeps_entries() {
    let mut t: OpenAddressTable<u32, u32> = (0..100).map(|i| (i, i * i)).collect();
    for i in (0..100).step_by(4) {
        t.erase(&i);
    }
    assert!(t.tombstone_count() > 0);
    t.rehash(1000).unwrap();
    assert!(t.bucket_count() >= 1000);
    assert_eq!(t.tombstone_count(), 0);
    t.rehash(t.len()).unwrap();
    assert!(t.load_factor() <= 0.5);
    for i in 0..100 {
        let expected = (i % 4 != 0).then_some(i * i);
        assert_eq!(t.get(&i).copied(), expected);
    }
}

// Test: InvalidCapacityRequest.
// Verifies: rehash below the live count fails and leaves the table alone.
#[test]
fn rehash_below_len_fails() {
    let mut t: OpenAddressTable<u32, u32> = (0..10).map(|i| (i, i)).collect();
    let before = t.bucket_count();
    let err = t.rehash(3).unwrap_err();
    assert_eq!(
        err,
        TableError::InvalidCapacityRequest {
            requested: 3,
            len: 10
        }
    );
    assert_eq!(t.bucket_count(), before);
    assert_eq!(t.len(), 10);
}

// Test: allocation failure during growth.
// Assumes: Bounded refuses stores larger than its cap.
// Verifies: the failing insert returns AllocationFailure, the offered entry
// is not inserted, and existing entries are untouched.
#[test]
fn failed_growth_leaves_table_unchanged() {
    let mut t: OpenAddressTable<u32, u32, probe_table::DefaultHashBuilder, DefaultKeyEq, Bounded> =
        OpenAddressTable::with_parts(
            8,
            Default::default(),
            DefaultKeyEq,
            Bounded::new(8),
            LoadFactor::DEFAULT,
        )
        .unwrap();
    for i in 0..4 {
        t.insert(i, i).unwrap();
    }
    let err = t.insert(99, 99).unwrap_err();
    assert_eq!(err, TableError::AllocationFailure { requested: 16 });
    assert_eq!(t.len(), 4);
    assert_eq!(t.bucket_count(), 8);
    assert!(!t.contains_key(&99));
    for i in 0..4 {
        assert_eq!(t.get(&i), Some(&i));
    }
    // Duplicates need no room and still succeed.
    assert_eq!(t.insert(2, 0).map(|(_, inserted)| inserted), Ok(false));
    assert_eq!(t.reserve(5), Err(TableError::AllocationFailure { requested: 10 }));
    assert_eq!(t.bucket_count(), 8);
}

// Test: lazy default under allocation failure.
// Verifies: get_or_insert_with does not run its constructor when room for
// the entry cannot be made.
#[test]
fn failed_growth_skips_default_constructor() {
    let tally = Tally::default();
    let mut t = tally_table(&tally, 0);
    tally.fail.set(true);
    let ran = Cell::new(false);
    let res = t.get_or_insert_with(1, || {
        ran.set(true);
        "v".to_string()
    });
    assert_eq!(res.err(), Some(TableError::AllocationFailure { requested: 8 }));
    assert!(!ran.get());
    assert!(t.is_empty());
}

// Test: store lifecycle.
// Assumes: every growth allocates one new store and retires the old one.
// Verifies: after the table drops, releases equal allocations.
#[test]
fn every_store_is_released_once() {
    let tally = Tally::default();
    {
        let mut t = tally_table(&tally, 0);
        assert_eq!(tally.allocs.get(), 0, "empty table allocates nothing");
        for i in 0..500 {
            t.insert(i, i.to_string()).unwrap();
        }
        for i in 0..250 {
            t.erase(&i);
        }
        t.rehash(t.len()).unwrap();
        t.reserve(2000).unwrap();
        assert!(tally.allocs.get() > 1);
        assert_eq!(tally.frees.get(), tally.allocs.get() - 1, "only the live store is held");

        let c = t.clone();
        assert_eq!(c.len(), t.len());
    }
    assert_eq!(tally.frees.get(), tally.allocs.get());
}

// Test: owned iteration releases the store.
// Verifies: consuming a table into an iterator hands the store back to
// the allocator when the iterator drops.
#[test]
fn into_iter_releases_store() {
    let tally = Tally::default();
    let mut t = tally_table(&tally, 16);
    for i in 0..5 {
        t.insert(i, format!("v{i}")).unwrap();
    }
    let mut it = t.into_iter();
    assert_eq!(it.len(), 5);
    it.next();
    assert_eq!(tally.frees.get(), 0);
    drop(it);
    assert_eq!(tally.allocs.get(), 1);
    assert_eq!(tally.frees.get(), 1);
}

// Test: custom key equality.
// Assumes: keys equal modulo 10 are equivalent; the constant hasher keeps
// equivalent keys hashing equally.
// Verifies: an equivalent key is treated as a duplicate and finds the
// stored entry.
#[test]
fn custom_key_eq_defines_duplicates() {
    #[derive(Clone, Copy, Default)]
    struct ModTen;
    impl KeyEq<u32> for ModTen {
        fn equivalent(&self, stored: &u32, query: &u32) -> bool {
            stored % 10 == query % 10
        }
    }

    let mut t: OpenAddressTable<u32, &str, ConstBuildHasher, ModTen> =
        OpenAddressTable::with_parts(0, ConstBuildHasher, ModTen, Heap, LoadFactor::DEFAULT).unwrap();
    t.insert(3, "three").unwrap();
    let (_, inserted) = t.insert(13, "thirteen").unwrap();
    assert!(!inserted);
    assert_eq!(t.get_key_value(&23), Some((&3, &"three")));
    assert!(t.erase(&43));
    assert!(t.is_empty());
    let _: &ModTen = t.key_eq();
    let _: &ConstBuildHasher = t.hash_function();
    let _: &Heap = t.allocator();
}

// Test: configurable load factor.
// Verifies: a 0.75 table fills to 75% before growing.
#[test]
fn custom_load_factor_is_honored() {
    let lf = LoadFactor::new(0.75).unwrap();
    let mut t: OpenAddressTable<u32, u32> =
        OpenAddressTable::with_parts(8, Default::default(), DefaultKeyEq, Heap, lf).unwrap();
    for i in 0..6 {
        t.insert(i, i).unwrap();
    }
    assert_eq!(t.bucket_count(), 8);
    t.insert(6, 6).unwrap();
    assert_eq!(t.bucket_count(), 16);
    assert_eq!(t.max_load_factor(), lf);
}

// Test: construction from ranges and literals.
// Verifies: first pair wins on duplicate keys; bucket hints are honored.
#[test]
fn construction_from_pairs() {
    let t = OpenAddressTable::try_from_iter_with_buckets(vec![("a", 1), ("b", 2), ("a", 3)], 64).unwrap();
    assert_eq!(t.bucket_count(), 64);
    assert_eq!(t.len(), 2);
    assert_eq!(t.get("a"), Some(&1));

    let lit = OpenAddressTable::from([("x", 'x'), ("y", 'y')]);
    assert_eq!(lit.len(), 2);
    assert_eq!(lit.at("y"), Ok(&'y'));

    let collected: OpenAddressTable<u32, u32> = (0..10).map(|i| (i % 5, i)).collect();
    assert_eq!(collected.len(), 5);
    assert_eq!(collected.get(&4), Some(&4));
}

// Test: merge and swap.
// Verifies: merge moves absent keys only; swap exchanges whole tables.
#[test]
fn merge_then_swap() {
    let mut a: OpenAddressTable<&str, u32> = OpenAddressTable::from([("shared", 1), ("a", 2)]);
    let mut b: OpenAddressTable<&str, u32> = OpenAddressTable::from([("shared", 10), ("b", 20)]);
    a.merge(&mut b).unwrap();
    let a_view: BTreeMap<_, _> = a.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(a_view, BTreeMap::from([("a", 2), ("b", 20), ("shared", 1)]));
    assert_eq!(b.len(), 1);
    assert_eq!(b.get("shared"), Some(&10));

    a.swap(&mut b);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 3);
}

// Test: iteration completeness.
// Verifies: traversal length equals len() and visits only live entries.
#[test]
fn iteration_visits_live_entries_only() {
    let mut t: OpenAddressTable<u32, u32> = (0..64).map(|i| (i, i)).collect();
    for i in 0..64 {
        if i % 3 == 0 {
            t.erase(&i);
        }
    }
    let seen: Vec<u32> = t.keys().copied().collect();
    assert_eq!(seen.len(), t.len());
    assert!(seen.iter().all(|k| k % 3 != 0));
    let mut sorted = seen.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), seen.len());
}

// Test: clear and drain.
// Verifies: both keep capacity and leave a usable, empty table.
#[test]
fn clear_and_drain_keep_capacity() {
    let mut t: OpenAddressTable<u32, String> = (0..20).map(|i| (i, i.to_string())).collect();
    let buckets = t.bucket_count();
    let drained: BTreeMap<u32, String> = t.drain().collect();
    assert_eq!(drained.len(), 20);
    assert!(t.is_empty());
    assert_eq!(t.bucket_count(), buckets);

    t.insert(7, "seven".to_string()).unwrap();
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.bucket_count(), buckets);
    assert!(t.find(&7).is_none());
}

// Test: oversized capacity requests.
// Assumes: no store of usize::MAX slots (or of the buckets needed for
// usize::MAX entries) can be allocated.
// Verifies: reserve and rehash report AllocationFailure instead of
// overflowing, and the table keeps its entries and capacity.
#[test]
fn oversized_requests_fail_without_side_effects() {
    let mut t: OpenAddressTable<u32, u32> = (0..20).map(|i| (i, i)).collect();
    t.erase(&0);
    let buckets = t.bucket_count();
    let tombstones = t.tombstone_count();

    assert_eq!(
        t.reserve(usize::MAX),
        Err(TableError::AllocationFailure {
            requested: usize::MAX
        })
    );
    assert_eq!(
        t.rehash(usize::MAX),
        Err(TableError::AllocationFailure {
            requested: usize::MAX
        })
    );
    assert!(matches!(
        t.reserve(usize::MAX / 4),
        Err(TableError::AllocationFailure { .. })
    ));

    assert_eq!(t.bucket_count(), buckets);
    assert_eq!(t.tombstone_count(), tombstones);
    assert_eq!(t.len(), 19);
    for i in 1..20 {
        assert_eq!(t.get(&i), Some(&i));
    }
    t.insert(0, 0).unwrap();
    assert_eq!(t.len(), 20);
}

// Test: churn near the load limit.
// Assumes: 1024 buckets at load factor 0.5 hold 512 entries; 511 are live.
// Verifies: steady erase-one/insert-one traffic triggers only occasional
// rehashes, not one every few operations, and no entry is lost.
#[test]
fn churn_near_limit_rehashes_rarely() {
    let tally = Tally::default();
    let mut t = tally_table(&tally, 1024);
    for i in 0..511 {
        t.insert(i, i.to_string()).unwrap();
    }
    assert_eq!(tally.allocs.get(), 1);

    for round in 0..10_000u32 {
        assert!(t.erase(&round));
        let k = round + 511;
        t.insert(k, k.to_string()).unwrap();
    }
    assert!(
        tally.allocs.get() < 100,
        "{} allocations for 10k rounds",
        tally.allocs.get()
    );
    assert_eq!(t.len(), 511);
    for k in 10_000..10_511u32 {
        assert_eq!(t.get(&k).map(String::as_str), Some(k.to_string().as_str()));
    }
}
