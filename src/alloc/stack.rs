//! `StackAllocator` - a LIFO marker allocator shared across element types.
//!
//! Every `StackAllocator` is a typed view of one reference-counted
//! [`BumpArena`]. Cloning a view, or rebinding it to another element type,
//! shares the arena instead of creating a new buffer; the buffer is freed
//! when the last view is dropped.
//!
//! Storage is reclaimed only by rolling back to a marker or clearing the
//! whole stack. The allocator tracks bytes, not objects: values living above
//! the marker must be destroyed by the caller before rolling back past them.

use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;
use std::rc::Rc;

use tracing::trace;

use crate::alloc::allocator::{Allocator, BulkReclaim, Propagation, Rebind, Release};
use crate::alloc::bump::{ArenaStats, BumpArena, Marker};
use crate::alloc::config::ArenaConfig;
use crate::alloc::error::{AllocError, ConfigError};

/// A typed view of a shared stack buffer.
pub struct StackAllocator<T> {
    state: Rc<BumpArena>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StackAllocator<T> {
    /// Creates a stack with a fresh buffer of `capacity` bytes.
    ///
    /// # Errors
    /// Returns `ConfigError` for a zero or oversized capacity.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(ArenaConfig::with_capacity(capacity))
    }

    /// Creates a stack from an explicit configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` fails validation.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ConfigError> {
        BumpArena::with_config(config).map(|arena| Self::from_state(Rc::new(arena)))
    }

    /// Creates a view over existing shared state.
    pub fn from_state(state: Rc<BumpArena>) -> Self {
        Self {
            state,
            _marker: PhantomData,
        }
    }

    /// The shared state behind this view.
    #[inline]
    pub fn state(&self) -> &Rc<BumpArena> {
        &self.state
    }

    /// Current top of the stack.
    #[inline]
    pub fn get_marker(&self) -> Marker {
        self.state.save()
    }

    /// Frees everything allocated after `marker`, returning the bytes reclaimed.
    ///
    /// # Errors
    /// Returns `AllocError::InvalidMarker` if `marker` is above the current top
    /// or was taken from another stack.
    pub fn free_to_marker(&self, marker: Marker) -> Result<usize, AllocError> {
        self.state.restore(marker)
    }

    /// Frees the entire stack, returning the bytes reclaimed.
    pub fn clear(&self) -> usize {
        self.state.reset()
    }

    /// Bytes in use, including alignment padding.
    #[inline]
    pub fn used_size(&self) -> usize {
        self.state.used()
    }

    /// Bytes left before the stack is exhausted.
    #[inline]
    pub fn remaining_size(&self) -> usize {
        self.state.remaining()
    }

    /// Capacity of the shared buffer in bytes.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.state.capacity()
    }

    /// Number of views currently sharing the buffer.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.state)
    }

    /// Snapshot of the shared buffer's usage.
    pub fn stats(&self) -> ArenaStats {
        self.state.stats()
    }
}

impl<T> Clone for StackAllocator<T> {
    fn clone(&self) -> Self {
        let view = Self::from_state(Rc::clone(&self.state));
        trace!(views = view.ref_count(), "stack view shared");
        view
    }
}

impl<T> fmt::Debug for StackAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackAllocator")
            .field("element", &core::any::type_name::<T>())
            .field("views", &self.ref_count())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T, U> PartialEq<StackAllocator<U>> for StackAllocator<T> {
    fn eq(&self, other: &StackAllocator<U>) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T> Eq for StackAllocator<T> {}

impl<T> Allocator<T> for StackAllocator<T> {
    const PROPAGATION: Propagation = Propagation::ALL;

    fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        if n == 0 {
            return Err(AllocError::ZeroCount);
        }
        self.state.alloc_array(n)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) -> Result<Release, AllocError> {
        trace!(addr = ptr.as_ptr() as usize, count = n, "stack deallocate deferred");
        Ok(Release::Deferred)
    }
}

impl<T> BulkReclaim for StackAllocator<T> {
    fn mark(&self) -> Marker {
        self.get_marker()
    }

    fn rollback(&self, marker: Marker) -> Result<usize, AllocError> {
        self.free_to_marker(marker)
    }

    fn reset(&self) -> usize {
        self.clear()
    }
}

impl<T, U> Rebind<U> for StackAllocator<T> {
    type Output = StackAllocator<U>;

    fn rebind(&self) -> StackAllocator<U> {
        let view = StackAllocator::from_state(Rc::clone(&self.state));
        trace!(views = view.ref_count(), "stack view rebound");
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_share_one_buffer() {
        let ints = StackAllocator::<u32>::new(128).unwrap();
        let words = crate::alloc::allocator::rebind::<u64, _>(&ints);
        assert_eq!(ints.ref_count(), 2);

        ints.allocate(1).unwrap();
        let w = words.allocate(1).unwrap();
        assert_eq!(w.as_ptr() as usize % 8, 0);
        assert_eq!(ints.used_size(), 16);
        assert_eq!(words.used_size(), 16);

        drop(words);
        assert_eq!(ints.ref_count(), 1);
    }

    #[test]
    fn test_free_to_marker() {
        let stack = StackAllocator::<u8>::new(64).unwrap();
        stack.allocate(10).unwrap();
        let marker = stack.get_marker();
        stack.allocate(20).unwrap();
        assert_eq!(stack.free_to_marker(marker), Ok(20));
        assert_eq!(stack.used_size(), 10);
        assert_eq!(stack.clear(), 10);
        assert_eq!(stack.remaining_size(), stack.total_size());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = StackAllocator::<u8>::new(32).unwrap();
        let b = StackAllocator::<u8>::new(32).unwrap();
        let shared = a.clone();
        assert!(a == shared);
        assert!(a != b);
    }
}
