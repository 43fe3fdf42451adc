//! Allocation strategy for slot stores.
//!
//! The table never allocates directly: every backing store is obtained from
//! a [`SlotAllocator`] and handed back to it exactly once, when the owning
//! [`Store`] is dropped. Rehashing builds the new store before touching the
//! old one, so an allocation failure leaves the table unchanged.

use crate::error::TableError;
use core::ops::{Deref, DerefMut};
use std::vec;

/// Source of raw slot storage.
///
/// `allocate` returns an empty `Vec` able to hold at least `n` elements
/// without reallocating; the table fills it. `deallocate` receives every
/// store the table is done with, including ones drained to length zero.
pub trait SlotAllocator: Clone {
    fn allocate<T>(&self, n: usize) -> Result<Vec<T>, TableError>;

    fn deallocate<T>(&self, store: Vec<T>) {
        drop(store);
    }
}

/// Default strategy backed by the global allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

impl SlotAllocator for Heap {
    fn allocate<T>(&self, n: usize) -> Result<Vec<T>, TableError> {
        let mut store = Vec::new();
        store
            .try_reserve_exact(n)
            .map_err(|_| TableError::AllocationFailure { requested: n })?;
        Ok(store)
    }
}

/// Heap allocation capped at `max_buckets` slots per store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounded {
    max_buckets: usize,
}

impl Bounded {
    pub const fn new(max_buckets: usize) -> Self {
        Self { max_buckets }
    }

    pub fn max_buckets(&self) -> usize {
        self.max_buckets
    }
}

impl SlotAllocator for Bounded {
    fn allocate<T>(&self, n: usize) -> Result<Vec<T>, TableError> {
        if n > self.max_buckets {
            return Err(TableError::AllocationFailure { requested: n });
        }
        Heap.allocate(n)
    }
}

/// Owned slot array that returns its storage to the allocator on drop.
pub(crate) struct Store<T, A: SlotAllocator> {
    slots: Vec<T>,
    alloc: A,
}

impl<T, A: SlotAllocator> Store<T, A> {
    pub(crate) fn unallocated(alloc: A) -> Self {
        Self {
            slots: Vec::new(),
            alloc,
        }
    }

    /// Allocate `n` slots, each initialized by `fill`.
    pub(crate) fn allocate<F>(alloc: A, n: usize, fill: F) -> Result<Self, TableError>
    where
        F: FnMut() -> T,
    {
        if n == 0 {
            return Ok(Self::unallocated(alloc));
        }
        let mut slots = alloc.allocate::<T>(n)?;
        debug_assert!(slots.is_empty() && slots.capacity() >= n);
        slots.resize_with(n, fill);
        Ok(Self { slots, alloc })
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Move every slot out, leaving a zero-length store whose capacity is
    /// still released on drop.
    pub(crate) fn drain_all(&mut self) -> vec::Drain<'_, T> {
        self.slots.drain(..)
    }
}

impl<T: Clone, A: SlotAllocator> Clone for Store<T, A> {
    /// # Panics
    /// If the allocator cannot provide a store of the same size.
    fn clone(&self) -> Self {
        let alloc = self.alloc.clone();
        if self.slots.is_empty() {
            return Self::unallocated(alloc);
        }
        let mut slots = match alloc.allocate::<T>(self.slots.len()) {
            Ok(slots) => slots,
            Err(e) => panic!("{e}"),
        };
        slots.extend(self.slots.iter().cloned());
        Self { slots, alloc }
    }
}

impl<T, A: SlotAllocator> Deref for Store<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.slots
    }
}

impl<T, A: SlotAllocator> DerefMut for Store<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T, A: SlotAllocator> Drop for Store<T, A> {
    fn drop(&mut self) {
        if self.slots.capacity() != 0 {
            let slots = core::mem::take(&mut self.slots);
            self.alloc.deallocate(slots);
        }
    }
}
