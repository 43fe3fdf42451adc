//! Failure taxonomy for table operations.

use thiserror::Error;

/// Errors reported by [`OpenAddressTable`](crate::OpenAddressTable).
///
/// Absence is only an error for the strict accessors (`at`, `at_mut`);
/// `find`, `get` and `erase` report it through `Option`/`bool`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A strict lookup found no live entry for the key.
    #[error("key not found")]
    KeyNotFound,
    /// The allocation strategy could not provide the requested slots.
    /// The table is left exactly as it was before the call.
    #[error("failed to allocate {requested} buckets")]
    AllocationFailure { requested: usize },
    /// `rehash` was asked for fewer buckets than there are live entries.
    #[error("cannot rehash to {requested} buckets while holding {len} entries")]
    InvalidCapacityRequest { requested: usize, len: usize },
}
