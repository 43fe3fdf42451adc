//! OpenAddressTable: linear probing over a tagged slot array, with
//! tombstone deletion and load-factor driven growth.

use crate::alloc::{Heap, SlotAllocator, Store};
use crate::error::TableError;
use crate::iter::{Drain, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::policy::{DefaultKeyEq, KeyEq, LoadFactor};
use crate::slot::Slot;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, trace};

/// Smallest store allocated by automatic growth.
const MIN_BUCKETS: usize = 8;

/// Position of an occupied slot, as returned by `insert` and `find`.
///
/// A bucket stays meaningful until the next structural change (an insert
/// that grows, erase, rehash, reserve, clear, merge); after that it may
/// resolve to nothing or to a different entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Bucket(usize);

impl Bucket {
    /// Slot index; `bucket_count()` is the one-past-the-end position.
    pub fn index(self) -> usize {
        self.0
    }

    /// Key stored at this position, if the slot is still occupied.
    pub fn key<'a, K, V, S, E, A>(&self, table: &'a OpenAddressTable<K, V, S, E, A>) -> Option<&'a K>
    where
        A: SlotAllocator,
    {
        table.entry_at(*self).map(|(k, _)| k)
    }

    /// Value stored at this position, if the slot is still occupied.
    pub fn value<'a, K, V, S, E, A>(&self, table: &'a OpenAddressTable<K, V, S, E, A>) -> Option<&'a V>
    where
        A: SlotAllocator,
    {
        table.entry_at(*self).map(|(_, v)| v)
    }

    /// Mutable access to the value at this position.
    pub fn value_mut<'a, K, V, S, E, A>(
        &self,
        table: &'a mut OpenAddressTable<K, V, S, E, A>,
    ) -> Option<&'a mut V>
    where
        A: SlotAllocator,
    {
        table.entry_at_mut(*self).map(|(_, v)| v)
    }
}

/// Outcome of scanning a probe sequence.
enum Probe {
    /// Occupied slot holding an equivalent key.
    Found(usize),
    /// Confirmed miss; earliest tombstone or empty slot on the path.
    Vacant(usize),
    /// No slots, or a full wrap without a free slot.
    Exhausted,
}

#[inline]
fn home(hash: u64, buckets: usize) -> usize {
    (hash % buckets as u64) as usize
}

/// First free slot on the probe path of `hash`.
fn vacant_in<K, V>(slots: &[Slot<K, V>], hash: u64) -> Option<usize> {
    let buckets = slots.len();
    if buckets == 0 {
        return None;
    }
    let start = home(hash, buckets);
    (0..buckets)
        .map(|step| (start + step) % buckets)
        .find(|&i| slots[i].is_free())
}

/// Hash table storing entries directly in one slot array, resolving
/// collisions by linear probing.
///
/// `S` hashes keys, `E` decides key equivalence, `A` supplies the slot
/// storage. Fallible operations return [`TableError`] and leave the table
/// unchanged on failure.
pub struct OpenAddressTable<K, V, S = DefaultHashBuilder, E = DefaultKeyEq, A: SlotAllocator = Heap> {
    store: Store<Slot<K, V>, A>,
    len: usize,
    tombstones: usize,
    max_load_factor: LoadFactor,
    hasher: S,
    key_eq: E,
}

impl<K, V> OpenAddressTable<K, V> {
    /// Empty table; nothing is allocated until the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with exactly `buckets` slots allocated up front.
    pub fn with_buckets(buckets: usize) -> Result<Self, TableError> {
        Self::with_buckets_and_hasher(buckets, DefaultHashBuilder::default())
    }

    /// Table built from `(key, value)` pairs with a bucket-count hint.
    /// On duplicate keys the first pair wins.
    pub fn try_from_iter_with_buckets<I>(iter: I, buckets: usize) -> Result<Self, TableError>
    where
        K: Hash + Eq,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut table = Self::with_buckets(buckets)?;
        for (key, value) in iter {
            table.insert(key, value)?;
        }
        Ok(table)
    }
}

impl<K, V, S> OpenAddressTable<K, V, S> {
    /// Empty table using `hasher`; allocates nothing.
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(
            Store::unallocated(Heap),
            hasher,
            DefaultKeyEq,
            LoadFactor::DEFAULT,
        )
    }

    /// Table with `buckets` slots allocated up front, hashing with `hasher`.
    pub fn with_buckets_and_hasher(buckets: usize, hasher: S) -> Result<Self, TableError> {
        Self::with_parts(buckets, hasher, DefaultKeyEq, Heap, LoadFactor::DEFAULT)
    }
}

impl<K, V, S, E, A: SlotAllocator> OpenAddressTable<K, V, S, E, A> {
    /// Fully configured table with `buckets` slots allocated from `alloc`.
    pub fn with_parts(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
        max_load_factor: LoadFactor,
    ) -> Result<Self, TableError> {
        let store = Store::allocate(alloc, buckets, || Slot::Empty)?;
        Ok(Self::from_parts(store, hasher, key_eq, max_load_factor))
    }

    fn from_parts(store: Store<Slot<K, V>, A>, hasher: S, key_eq: E, max_load_factor: LoadFactor) -> Self {
        Self {
            store,
            len: 0,
            tombstones: 0,
            max_load_factor,
            hasher,
            key_eq,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the store, occupied or not.
    pub fn bucket_count(&self) -> usize {
        self.store.len()
    }

    /// Slots holding a tombstone left by erase.
    pub fn tombstone_count(&self) -> usize {
        self.tombstones
    }

    /// `len / bucket_count`, or 0 for an unallocated table.
    pub fn load_factor(&self) -> f64 {
        if self.store.is_empty() {
            0.0
        } else {
            self.len as f64 / self.store.len() as f64
        }
    }

    /// Load factor this table grows to stay under; fixed at construction.
    pub fn max_load_factor(&self) -> LoadFactor {
        self.max_load_factor
    }

    pub fn hash_function(&self) -> &S {
        &self.hasher
    }

    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    pub fn allocator(&self) -> &A {
        self.store.allocator()
    }

    /// Entry at `bucket`, if that slot is occupied.
    pub(crate) fn entry_at(&self, bucket: Bucket) -> Option<(&K, &V)> {
        self.store.get(bucket.0).and_then(Slot::entry)
    }

    pub(crate) fn entry_at_mut(&mut self, bucket: Bucket) -> Option<(&K, &mut V)> {
        self.store.get_mut(bucket.0).and_then(Slot::entry_mut)
    }

    /// Re-place every live entry into a fresh store of at least `buckets`
    /// slots. Tombstones do not survive. On error the table is unchanged.
    pub fn rehash(&mut self, buckets: usize) -> Result<(), TableError> {
        if buckets < self.len {
            return Err(TableError::InvalidCapacityRequest {
                requested: buckets,
                len: self.len,
            });
        }
        let target = buckets.max(self.buckets_for(self.len)?);
        self.resize(target)
    }

    /// Make room for `len` entries without further growth. Never shrinks.
    pub fn reserve(&mut self, len: usize) -> Result<(), TableError> {
        let needed = self.buckets_for(len)?;
        if needed > self.bucket_count() {
            self.rehash(needed)?;
        }
        Ok(())
    }

    /// Drop every entry; capacity is kept.
    pub fn clear(&mut self) {
        if self.len == 0 && self.tombstones == 0 {
            return;
        }
        for slot in self.store.iter_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.tombstones = 0;
    }

    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Erase every entry for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for i in 0..self.store.len() {
            let retained = match self.store[i].entry_mut() {
                Some((k, v)) => keep(k, v),
                None => continue,
            };
            if !retained {
                self.vacate(i);
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.store, self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.store, self.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Move every entry out, leaving the table empty with its capacity.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain::new(&mut self.store, &mut self.len, &mut self.tombstones)
    }

    /// Turn the occupied slot `i` into a tombstone.
    fn vacate(&mut self, i: usize) -> Option<(K, V)> {
        if !self.store[i].is_occupied() {
            return None;
        }
        let entry = mem::replace(&mut self.store[i], Slot::Tombstone).into_entry();
        self.len -= 1;
        self.tombstones += 1;
        entry
    }

    /// Construct an entry in the free slot `i`.
    fn fill(&mut self, i: usize, hash: u64, key: K, value: V) -> &mut V {
        let slot = &mut self.store[i];
        debug_assert!(slot.is_free());
        if slot.is_tombstone() {
            self.tombstones -= 1;
        }
        self.len += 1;
        *slot = Slot::Occupied { hash, key, value };
        match slot {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot was just occupied"),
        }
    }

    fn occupied_value_mut(&mut self, i: usize) -> &mut V {
        self.store[i]
            .entry_mut()
            .map(|(_, v)| v)
            .expect("probe reported an occupied slot")
    }

    /// Bucket count needed for `len` live entries under this table's load
    /// factor.
    fn buckets_for(&self, len: usize) -> Result<usize, TableError> {
        self.max_load_factor
            .min_buckets(len)
            .ok_or(TableError::AllocationFailure { requested: usize::MAX })
    }

    /// Ensure one more entry fits, then return where the entry with `hash`
    /// lands. `vacancy` is the landing slot found before any growth.
    fn make_room(&mut self, hash: u64, vacancy: Option<usize>) -> Result<usize, TableError> {
        let buckets = self.bucket_count();
        let limit = self.max_load_factor.max_len(buckets);
        let needed = self.len + 1;
        if needed <= limit {
            match vacancy {
                Some(i) if self.store[i].is_tombstone() || self.len + self.tombstones < limit => {
                    return Ok(i)
                }
                _ => {}
            }
            // Tombstones used up the headroom. Past half the limit an
            // in-place purge frees too little, so grow instead.
            if needed <= limit / 2 {
                trace!(
                    "insert purges {} tombstones in {} buckets",
                    self.tombstones,
                    buckets
                );
                self.resize(buckets)?;
                return Ok(self.vacant_slot(hash));
            }
        }
        let target = buckets
            .saturating_mul(2)
            .max(self.buckets_for(needed)?)
            .max(MIN_BUCKETS);
        trace!(
            "insert grows table: {} live, {} tombstones in {} buckets",
            self.len,
            self.tombstones,
            buckets
        );
        self.resize(target)?;
        Ok(self.vacant_slot(hash))
    }

    fn vacant_slot(&self, hash: u64) -> usize {
        vacant_in(&self.store, hash).expect("load factor below 1 leaves a free slot")
    }

    /// Move all live entries into a fresh store of exactly `buckets` slots.
    fn resize(&mut self, buckets: usize) -> Result<(), TableError> {
        debug_assert!(buckets == 0 || self.len <= self.max_load_factor.max_len(buckets));
        let fresh = Store::allocate(self.store.allocator().clone(), buckets, || Slot::Empty)?;
        let mut old = mem::replace(&mut self.store, fresh);
        debug!(
            "rehash {} -> {} buckets ({} live, {} tombstones dropped)",
            old.len(),
            buckets,
            self.len,
            self.tombstones
        );
        for slot in old.drain_all() {
            let hash = match slot {
                Slot::Occupied { hash, .. } => hash,
                _ => continue,
            };
            let i = vacant_in(&self.store, hash).expect("fresh store has room for every live entry");
            self.store[i] = slot;
        }
        self.tombstones = 0;
        Ok(())
    }
}

impl<K, V, S, E, A> OpenAddressTable<K, V, S, E, A>
where
    S: BuildHasher,
    A: SlotAllocator,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Scan from `hash mod C`: tombstones are skipped, the first empty slot
    /// ends a miss, and at most `C` slots are visited.
    fn probe<Q>(&self, hash: u64, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        let buckets = self.store.len();
        if buckets == 0 {
            return Probe::Exhausted;
        }
        let start = home(hash, buckets);
        let mut vacancy = None;
        for step in 0..buckets {
            let i = (start + step) % buckets;
            match &self.store[i] {
                Slot::Empty => return Probe::Vacant(vacancy.unwrap_or(i)),
                Slot::Tombstone => {
                    vacancy.get_or_insert(i);
                }
                Slot::Occupied { hash: h, key, .. } => {
                    if *h == hash && self.key_eq.equivalent(<K as Borrow<Q>>::borrow(key), q) {
                        return Probe::Found(i);
                    }
                }
            }
        }
        vacancy.map_or(Probe::Exhausted, Probe::Vacant)
    }

    fn find_index<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        if self.len == 0 {
            return None;
        }
        match self.probe(self.make_hash(q), q) {
            Probe::Found(i) => Some(i),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Bucket>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.find_index(q).map(Bucket)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.find_index(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let i = self.find_index(q)?;
        self.store[i].entry()
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let i = self.find_index(q)?;
        self.store[i].entry_mut().map(|(_, v)| v)
    }

    /// Value for `q`; never inserts.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.get(q).ok_or(TableError::KeyNotFound)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.get_mut(q).ok_or(TableError::KeyNotFound)
    }

    /// Remove the entry for `q`, leaving a tombstone. Returns whether a
    /// live entry was removed.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.remove_entry(q).is_some()
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let i = self.find_index(q)?;
        self.vacate(i)
    }
}

impl<K, V, S, E, A> OpenAddressTable<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
    A: SlotAllocator,
{
    /// Insert `key -> value` unless an equivalent key is live.
    ///
    /// Returns the entry's bucket and whether it was inserted. On a
    /// duplicate the stored value is kept and the arguments are dropped.
    pub fn insert(&mut self, key: K, value: V) -> Result<(Bucket, bool), TableError> {
        let hash = self.make_hash(&key);
        let vacancy = match self.probe(hash, &key) {
            Probe::Found(i) => return Ok((Bucket(i), false)),
            Probe::Vacant(i) => Some(i),
            Probe::Exhausted => None,
        };
        let i = self.make_room(hash, vacancy)?;
        self.fill(i, hash, key, value);
        Ok((Bucket(i), true))
    }

    /// Like `insert`, but overwrites the value of a live equivalent key.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Result<(Bucket, bool), TableError> {
        let hash = self.make_hash(&key);
        let vacancy = match self.probe(hash, &key) {
            Probe::Found(i) => {
                *self.occupied_value_mut(i) = value;
                return Ok((Bucket(i), false));
            }
            Probe::Vacant(i) => Some(i),
            Probe::Exhausted => None,
        };
        let i = self.make_room(hash, vacancy)?;
        self.fill(i, hash, key, value);
        Ok((Bucket(i), true))
    }

    /// Value for `key`, inserting `default()` first if absent. `default`
    /// only runs once room for the new entry has been secured.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> Result<&mut V, TableError>
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let vacancy = match self.probe(hash, &key) {
            Probe::Found(i) => return Ok(self.occupied_value_mut(i)),
            Probe::Vacant(i) => Some(i),
            Probe::Exhausted => None,
        };
        let i = self.make_room(hash, vacancy)?;
        Ok(self.fill(i, hash, key, default()))
    }

    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, TableError>
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Move every entry of `other` whose key is absent here into `self`.
    /// Entries with keys already present stay in `other`.
    ///
    /// On allocation failure the entries moved so far stay moved and the
    /// rest remain in `other`; nothing is lost.
    pub fn merge(&mut self, other: &mut Self) -> Result<(), TableError> {
        for i in 0..other.store.len() {
            let key = match other.store[i].entry() {
                Some((key, _)) => key,
                None => continue,
            };
            let hash = self.make_hash(key);
            let vacancy = match self.probe(hash, key) {
                Probe::Found(_) => continue,
                Probe::Vacant(j) => Some(j),
                Probe::Exhausted => None,
            };
            let j = self.make_room(hash, vacancy)?;
            if let Some((key, value)) = other.vacate(i) {
                self.fill(j, hash, key, value);
            }
        }
        Ok(())
    }
}

impl<K, V, S, E, A> Default for OpenAddressTable<K, V, S, E, A>
where
    S: Default,
    E: Default,
    A: SlotAllocator + Default,
{
    fn default() -> Self {
        Self::from_parts(
            Store::unallocated(A::default()),
            S::default(),
            E::default(),
            LoadFactor::DEFAULT,
        )
    }
}

impl<K, V, S, E, A> Clone for OpenAddressTable<K, V, S, E, A>
where
    K: Clone,
    V: Clone,
    S: Clone,
    E: Clone,
    A: SlotAllocator,
{
    /// # Panics
    /// If the allocator cannot provide a store of the same size.
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            len: self.len,
            tombstones: self.tombstones,
            max_load_factor: self.max_load_factor,
            hasher: self.hasher.clone(),
            key_eq: self.key_eq.clone(),
        }
    }
}

impl<K, V, S, E, A> fmt::Debug for OpenAddressTable<K, V, S, E, A>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: SlotAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, E, A> PartialEq for OpenAddressTable<K, V, S, E, A>
where
    K: Hash,
    V: PartialEq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: SlotAllocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S, E, A> Eq for OpenAddressTable<K, V, S, E, A>
where
    K: Hash,
    V: Eq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: SlotAllocator,
{
}

impl<K, V, S, E, A> Extend<(K, V)> for OpenAddressTable<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
    A: SlotAllocator,
{
    /// Pairs whose key is already live are dropped.
    ///
    /// # Panics
    /// If the allocator cannot provide room for the new entries.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        // Duplicates are likely when extending a populated table; only
        // reserve half the hint then.
        let hint = iter.size_hint().0;
        let additional = if self.is_empty() { hint } else { hint.div_ceil(2) };
        if let Err(e) = self.reserve(self.len.saturating_add(additional)) {
            panic!("{e}");
        }
        for (key, value) in iter {
            if let Err(e) = self.insert(key, value) {
                panic!("{e}");
            }
        }
    }
}

impl<K, V, S, E, A> FromIterator<(K, V)> for OpenAddressTable<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
    A: SlotAllocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for OpenAddressTable<K, V>
where
    K: Hash + Eq,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S, E, A: SlotAllocator> IntoIterator for OpenAddressTable<K, V, S, E, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.store, self.len)
    }
}

impl<'a, K, V, S, E, A: SlotAllocator> IntoIterator for &'a OpenAddressTable<K, V, S, E, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, E, A: SlotAllocator> IntoIterator for &'a mut OpenAddressTable<K, V, S, E, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
impl<K, V, S, E, A: SlotAllocator> OpenAddressTable<K, V, S, E, A> {
    /// Panics unless the bookkeeping matches the slots and every live key
    /// is reachable from its home slot without crossing an empty slot.
    pub(crate) fn assert_invariants(&self) {
        let buckets = self.store.len();
        let live = self.store.iter().filter(|s| s.is_occupied()).count();
        let tombs = self.store.iter().filter(|s| s.is_tombstone()).count();
        assert_eq!(live, self.len, "len must count occupied slots");
        assert_eq!(tombs, self.tombstones, "tombstone count must match slots");
        if buckets == 0 {
            assert_eq!(self.len, 0);
            return;
        }
        let limit = self.max_load_factor.max_len(buckets);
        assert!(self.len <= limit, "load factor exceeded");
        assert!(self.len + self.tombstones <= limit, "no guaranteed empty slot");
        for (i, slot) in self.store.iter().enumerate() {
            if let Slot::Occupied { hash, .. } = slot {
                let mut j = home(*hash, buckets);
                while j != i {
                    assert!(!self.store[j].is_empty(), "empty slot {j} cuts off entry at {i}");
                    j = (j + 1) % buckets;
                }
            }
        }
    }
}
