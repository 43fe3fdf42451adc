//! probe-table: a single-threaded hash table using open addressing with
//! linear probing, tombstone deletion and load-factor driven growth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the probing, deletion and growth rules in one structure,
//!   since each depends on the others' bookkeeping.
//! - Pieces:
//!   - `Slot<K, V>`: tagged cell, `Empty | Tombstone | Occupied`. The type
//!     system forbids reading a payload from a slot that holds none.
//!   - `Store<T, A>`: the slot array plus the `SlotAllocator` it came from;
//!     returns its storage to that allocator exactly once on drop.
//!   - `OpenAddressTable<K, V, S, E, A>`: the engine. Owns one store, the
//!     live and tombstone counts, the `BuildHasher`, the `KeyEq` predicate
//!     and the `LoadFactor`.
//!
//! Probing rules
//! - An entry's home slot is `hash mod C`; probes advance by +1, wrapping,
//!   and visit at most `C` slots.
//! - Lookups skip tombstones and stop at the first empty slot.
//! - Inserts land in the earliest tombstone or empty slot on the path to a
//!   confirmed miss.
//! - Erase turns a slot into a tombstone, never back into an empty slot;
//!   doing so would cut off keys whose probe path crosses it.
//!
//! Growth
//! - The load factor is strictly below 1. An insert that would exceed it
//!   grows the table (doubling) before the new entry is placed.
//! - Tombstones count toward the limit for inserts that would consume an
//!   empty slot; when they push it over, the table is rehashed to purge
//!   them. The rehash keeps the size while live entries fill at most half
//!   the limit and doubles otherwise, so purges stay amortized O(1). At
//!   least one empty slot therefore always exists.
//!
//! Hashes and rehashing
//! - Each occupied slot stores its `u64` hash. Rehash places entries from
//!   the stored hash and never calls `K: Hash` or `KeyEq`, so after its one
//!   allocation it cannot fail. Allocation happens first: on failure the
//!   table is unchanged.
//!
//! Constraints
//! - Single-threaded; no interior mutability.
//! - Iterators borrow the table, so structural mutation during traversal
//!   does not compile. `Bucket` positions are plain indices and are only
//!   meaningful until the next structural change.
//! - No logging output unless the application installs a `log` backend;
//!   rehashes are reported at debug level, growth triggers at trace level.

mod alloc;
mod error;
mod iter;
mod policy;
mod slot;
mod table;
mod table_proptest;

// Public surface
pub use alloc::{Bounded, Heap, SlotAllocator};
pub use error::TableError;
pub use hashbrown::hash_map::DefaultHashBuilder;
pub use iter::{Drain, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use policy::{DefaultKeyEq, KeyEq, LoadFactor};
pub use table::{Bucket, OpenAddressTable};
