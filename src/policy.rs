//! Table policies: key equivalence and the load-factor threshold.

/// Key-equality predicate used while probing.
///
/// Must be reflexive, symmetric and transitive, and keys it deems equal
/// must hash equally under the table's `BuildHasher`.
pub trait KeyEq<Q: ?Sized> {
    fn equivalent(&self, stored: &Q, query: &Q) -> bool;
}

/// Plain `Eq` comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultKeyEq;

impl<Q: ?Sized + Eq> KeyEq<Q> for DefaultKeyEq {
    #[inline]
    fn equivalent(&self, stored: &Q, query: &Q) -> bool {
        stored == query
    }
}

/// Maximum ratio of live entries to buckets, strictly between 0 and 1.
///
/// Keeping it below 1 guarantees at least one free slot in any allocated
/// store, so every probe for a vacancy terminates.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LoadFactor(f64);

impl LoadFactor {
    pub const DEFAULT: LoadFactor = LoadFactor(0.5);

    /// Returns `None` unless `0 < factor < 1`.
    pub fn new(factor: f64) -> Option<Self> {
        (factor > 0.0 && factor < 1.0).then_some(Self(factor))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Largest live count allowed in `buckets` slots. Always below
    /// `buckets` for a non-empty store.
    pub fn max_len(self, buckets: usize) -> usize {
        let limit = (buckets as f64 * self.0).floor() as usize;
        limit.min(buckets.saturating_sub(1))
    }

    /// Smallest bucket count that holds `len` live entries, or `None` if
    /// no `usize` bucket count does.
    pub fn min_buckets(self, len: usize) -> Option<usize> {
        if len == 0 {
            return Some(0);
        }
        // The float estimate can be off either way; `as` saturates.
        let estimate = (len as f64 / self.0).ceil() as usize;
        let mut buckets = estimate.max(len.checked_add(1)?);
        while self.max_len(buckets) < len {
            buckets = buckets.checked_add(1)?;
        }
        while buckets > len + 1 && self.max_len(buckets - 1) >= len {
            buckets -= 1;
        }
        Some(buckets)
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}
