//! Memory pools used as allocation targets for compressed data
//!
//! A `MemoryPool` is a named region handle. Compressors allocate their output
//! buffers from a pool, and `copy_using_allocator` deep-copies a segment's
//! buffers into a caller-chosen pool. Pools account for every byte they hand
//! out and may enforce a byte budget.
//!
//! Every allocation carries a `PoolReservation`. Dropping the buffer drops
//! the reservation, which returns its bytes to the pool, so a budget frees up
//! again once the segments using it are gone.

use crate::common::constants::DEFAULT_POOL_NAME;
use crate::common::error::{PrismPackError, Result};
use bytes::Bytes;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct PoolState {
    name: String,
    budget: Option<usize>,
    allocated: AtomicUsize,
}

impl PoolState {
    fn release(&self, bytes: usize) {
        let previous = self.allocated.fetch_sub(bytes, Ordering::AcqRel);
        debug_assert!(previous >= bytes, "pool '{}' released more than it holds", self.name);
    }
}

/// Accounting region for compressed buffers.
///
/// Cloning yields another handle to the same region.
#[derive(Debug, Clone)]
pub struct MemoryPool {
    state: Arc<PoolState>,
}

impl MemoryPool {
    pub fn new(name: impl Into<String>, budget: Option<usize>) -> Self {
        Self {
            state: Arc::new(PoolState {
                name: name.into(),
                budget,
                allocated: AtomicUsize::new(0),
            }),
        }
    }

    /// Pool without a byte budget
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Pool refusing allocations once `budget` bytes are outstanding
    pub fn with_budget(name: impl Into<String>, budget: usize) -> Self {
        Self::new(name, Some(budget))
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn budget(&self) -> Option<usize> {
        self.state.budget
    }

    /// Bytes currently held by live allocations from this pool
    pub fn allocated_bytes(&self) -> usize {
        self.state.allocated.load(Ordering::Acquire)
    }

    /// Bytes left before the budget is exhausted (None when unbounded)
    pub fn remaining(&self) -> Option<usize> {
        self.state
            .budget
            .map(|budget| budget.saturating_sub(self.allocated_bytes()))
    }

    /// Accounts for `bytes` against the budget without allocating.
    ///
    /// The bytes are returned when the reservation is dropped.
    pub fn reserve(&self, bytes: usize) -> Result<PoolReservation> {
        let budget = self.state.budget;
        self.state
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = current.checked_add(bytes)?;
                match budget {
                    Some(limit) if next > limit => None,
                    _ => Some(next),
                }
            })
            .map_err(|_| self.allocation_failure(bytes))?;

        Ok(PoolReservation {
            state: Arc::clone(&self.state),
            bytes,
        })
    }

    /// Allocates an empty vector with room for exactly `capacity` elements
    pub fn allocate_vec<T>(&self, capacity: usize) -> Result<PooledVec<T>> {
        let bytes = capacity
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| self.allocation_failure(usize::MAX))?;
        let reservation = self.reserve(bytes)?;

        let mut vec = Vec::new();
        if vec.try_reserve_exact(capacity).is_err() {
            return Err(self.allocation_failure(bytes));
        }
        Ok(PooledVec { vec, reservation })
    }

    /// Copies `src` into a fresh buffer owned by this pool
    pub fn copy_slice<T: Copy>(&self, src: &[T]) -> Result<PooledVec<T>> {
        let mut vec = self.allocate_vec(src.len())?;
        vec.extend_from_slice(src);
        Ok(vec)
    }

    /// Copies `src` into a fresh, immutable byte buffer owned by this pool
    pub fn allocate_copy(&self, src: &[u8]) -> Result<Bytes> {
        Ok(self.copy_slice(src)?.into_bytes())
    }

    fn allocation_failure(&self, requested: usize) -> PrismPackError {
        PrismPackError::AllocationFailure {
            requested,
            pool: self.state.name.clone(),
        }
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::unbounded(DEFAULT_POOL_NAME)
    }
}

/// Bytes accounted in a pool until dropped
#[derive(Debug)]
pub struct PoolReservation {
    state: Arc<PoolState>,
    bytes: usize,
}

impl PoolReservation {
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Name of the pool the bytes are accounted in
    pub fn pool_name(&self) -> &str {
        &self.state.name
    }
}

impl Drop for PoolReservation {
    fn drop(&mut self) {
        self.state.release(self.bytes);
    }
}

/// Vector allocated from a pool.
///
/// Growing past the reserved capacity is not accounted.
#[derive(Debug)]
pub struct PooledVec<T> {
    vec: Vec<T>,
    reservation: PoolReservation,
}

impl<T> PooledVec<T> {
    /// Splits into the raw vector and the reservation backing it
    pub fn into_parts(self) -> (Vec<T>, PoolReservation) {
        (self.vec, self.reservation)
    }

    pub fn reservation(&self) -> &PoolReservation {
        &self.reservation
    }
}

impl PooledVec<u8> {
    /// Freezes into `Bytes`; the pool is credited once the last clone is dropped
    pub fn into_bytes(self) -> Bytes {
        Bytes::from_owner(self)
    }
}

impl<T> Deref for PooledVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.vec
    }
}

impl<T> DerefMut for PooledVec<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.vec
    }
}

impl AsRef<[u8]> for PooledVec<u8> {
    fn as_ref(&self) -> &[u8] {
        &self.vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_pool_accounting() {
        let pool = MemoryPool::unbounded("scratch");

        let v: PooledVec<u32> = pool.allocate_vec(100).unwrap();
        assert!(v.capacity() >= 100);
        assert_eq!(pool.allocated_bytes(), 400);
        assert_eq!(pool.remaining(), None);

        let copy = pool.allocate_copy(&[1, 2, 3]).unwrap();
        assert_eq!(&copy[..], &[1, 2, 3]);
        assert_eq!(pool.allocated_bytes(), 403);

        drop(v);
        assert_eq!(pool.allocated_bytes(), 3);
        drop(copy);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn test_budget_exhaustion_leaves_accounting_unchanged() {
        let pool = MemoryPool::with_budget("small", 16);

        let first = pool.allocate_copy(&[0u8; 10]).unwrap();
        assert_eq!(pool.remaining(), Some(6));

        let err = pool.allocate_copy(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            PrismPackError::AllocationFailure { requested: 10, .. }
        ));
        assert_eq!(pool.allocated_bytes(), 10);

        let _second = pool.allocate_copy(&[0u8; 6]).unwrap();
        assert_eq!(pool.remaining(), Some(0));

        drop(first);
        assert_eq!(pool.remaining(), Some(10));
    }

    #[test]
    fn test_reservation_returns_bytes_on_drop() {
        let pool = MemoryPool::with_budget("p", 8);
        let reservation = pool.reserve(8).unwrap();
        assert_eq!(reservation.pool_name(), "p");
        assert!(pool.reserve(1).is_err());

        drop(reservation);
        let _again = pool.reserve(8).unwrap();
        assert_eq!(pool.allocated_bytes(), 8);
    }

    #[test]
    fn test_shared_bytes_release_after_last_clone() {
        let pool = MemoryPool::unbounded("shared");
        let bytes = pool.allocate_copy(&[7u8; 32]).unwrap();
        let clone = bytes.clone();

        drop(bytes);
        assert_eq!(pool.allocated_bytes(), 32);
        assert_eq!(clone[31], 7);
        drop(clone);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn test_cloned_handle_shares_accounting() {
        let pool = MemoryPool::with_budget("handle", 4);
        let handle = pool.clone();
        let _held = handle.reserve(4).unwrap();
        assert_eq!(pool.remaining(), Some(0));
    }
}
