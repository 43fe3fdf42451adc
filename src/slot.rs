//! Slot: the tagged cell stored in the backing array.

/// One cell of the backing store.
///
/// State transitions are `Empty -> Occupied -> Tombstone -> Occupied`.
/// A slot only returns to `Empty` when the whole store is replaced or
/// every payload is discarded at once.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied {
        // Hash computed once at insertion; rehash places from it and never
        // calls back into `K: Hash`.
        hash: u64,
        key: K,
        value: V,
    },
}

impl<K, V> Slot<K, V> {
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub(crate) fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    /// Free for placement: never used, or reclaimable.
    #[inline]
    pub(crate) fn is_free(&self) -> bool {
        !self.is_occupied()
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn into_entry(self) -> Option<(K, V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }
}
