#![cfg(test)]

// Property tests for OpenAddressTable kept inside the crate so they can
// check slot-level invariants through `assert_invariants`.

use crate::table::test_hashers::{ConstBuildHasher, IdentityBuildHasher};
use crate::{OpenAddressTable, TableError};
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    InsertOrAssign(usize, i32),
    Erase(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Rehash(usize),
    Reserve(usize),
    Retain(bool),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertOrAssign(i, v)),
            4 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => (0usize..64).prop_map(OpI::Rehash),
            1 => (0usize..40).prop_map(OpI::Reserve),
            1 => any::<bool>().prop_map(OpI::Retain),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_state_machine<S>(mut sut: OpenAddressTable<Key, i32, S>, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let (b, inserted) = sut.insert(k.clone(), v).expect("heap allocation");
                prop_assert_eq!(inserted, !already, "inserted iff key was absent");
                model.entry(k.clone()).or_insert(v);
                prop_assert_eq!(b.key(&sut), Some(&k));
                prop_assert_eq!(b.value(&sut), model.get(&k));
            }
            OpI::InsertOrAssign(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let (_, inserted) = sut.insert_or_assign(k.clone(), v).expect("heap allocation");
                prop_assert_eq!(inserted, !already);
                model.insert(k, v);
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                let len_before = sut.len();
                let removed = sut.erase(k.0.as_str());
                prop_assert_eq!(removed, model.remove(&k).is_some());
                if !removed {
                    prop_assert_eq!(sut.len(), len_before, "missing erase changes nothing");
                }
                prop_assert!(sut.find(&k).is_none());
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.contains_key(&k));
                if let Some(b) = found {
                    prop_assert_eq!(b.value(&sut), model.get(&k));
                }
                match sut.at(&k) {
                    Ok(v) => {
                        prop_assert_eq!(Some(v), model.get(&k));
                    }
                    Err(e) => {
                        prop_assert_eq!(e, TableError::KeyNotFound);
                        prop_assert!(!model.contains_key(&k));
                    }
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(v) = sut.get_mut(&k) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(&k).expect("present in model");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Rehash(n) => {
                let before = sut.bucket_count();
                match sut.rehash(n) {
                    Ok(()) => {
                        prop_assert!(n >= model.len());
                        prop_assert!(sut.bucket_count() >= n);
                        prop_assert_eq!(sut.tombstone_count(), 0);
                    }
                    Err(e) => {
                        prop_assert_eq!(
                            e,
                            TableError::InvalidCapacityRequest {
                                requested: n,
                                len: model.len()
                            }
                        );
                        prop_assert_eq!(sut.bucket_count(), before);
                    }
                }
            }
            OpI::Reserve(n) => {
                let before = sut.bucket_count();
                sut.reserve(n).expect("heap allocation");
                prop_assert!(sut.bucket_count() >= before, "reserve never shrinks");
                prop_assert!(sut.max_load_factor().max_len(sut.bucket_count()) >= n);
            }
            OpI::Retain(even) => {
                sut.retain(|_, v| (*v % 2 == 0) == even);
                model.retain(|_, v| (*v % 2 == 0) == even);
            }
            OpI::Clear => {
                let before = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), before);
            }
            OpI::Iterate => {
                let s_keys: Vec<_> = sut.keys().cloned().collect();
                let unique: BTreeSet<_> = s_keys.iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), unique.len(), "each entry visited once");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
        }

        // Post-conditions after each op
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= sut.max_load_factor().get());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert reports `inserted` iff the key was absent and keeps the old value.
// - erase of a missing key is a no-op; erased keys are never found again.
// - rehash below the live count fails without side effects; otherwise it
//   keeps every entry and drops tombstones.
// - iteration visits each live entry exactly once.
// - slot bookkeeping, load factor and probe reachability hold after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(OpenAddressTable::new(), &pool, ops)?;
    }
}

// Property: same invariants under worst-case collisions, where every key
// shares one home slot and probing resolves by equality alone.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(OpenAddressTable::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: with identity hashing, interleaved insert/erase on keys that
// share home slots never loses a key (clustered tombstones).
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_clustered_churn(ops in proptest::collection::vec((any::<bool>(), 0u64..6), 1..200)) {
        let mut sut: OpenAddressTable<u64, u64, IdentityBuildHasher> =
            OpenAddressTable::with_buckets_and_hasher(16, IdentityBuildHasher).unwrap();
        let mut model: BTreeSet<u64> = BTreeSet::new();
        for (insert, slot) in ops {
            // Keys 16 apart share a home slot in a 16-bucket store.
            let k = slot * 16 + (slot % 3);
            if insert {
                let (_, inserted) = sut.insert(k, k).unwrap();
                prop_assert_eq!(inserted, model.insert(k));
            } else {
                prop_assert_eq!(sut.erase(&k), model.remove(&k));
            }
            sut.assert_invariants();
            for k in &model {
                prop_assert_eq!(sut.get(k), Some(k));
            }
        }
    }
}
