//! `SystemAllocator` - a tracking front-end over the global allocator.
//!
//! Every request is forwarded to `std::alloc` and reported through
//! `tracing`. It carries no state, so all instances are interchangeable and
//! compare equal. Pools also use the array helpers here when configured to
//! fall back for multi-element requests.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;
use std::alloc::{alloc, dealloc};

use tracing::trace;

use crate::alloc::allocator::{Allocator, Propagation, Rebind, Recycles, Release};
use crate::alloc::error::AllocError;

/// Allocates an array of `n` values from the global allocator.
pub(crate) fn allocate_array<T>(n: usize) -> Result<NonNull<T>, AllocError> {
    let layout = Layout::array::<T>(n).map_err(|_| AllocError::LayoutOverflow)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    let ptr = unsafe { alloc(layout) };
    NonNull::new(ptr.cast::<T>()).ok_or(AllocError::Exhausted {
        requested: layout.size(),
        available: 0,
    })
}

/// Returns an array obtained from [`allocate_array`].
///
/// # Safety
/// `ptr` must come from `allocate_array::<T>(n)` with the same `n`.
pub(crate) unsafe fn deallocate_array<T>(ptr: NonNull<T>, n: usize) {
    if let Ok(layout) = Layout::array::<T>(n) {
        if layout.size() != 0 {
            dealloc(ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}

/// A stateless allocator that forwards to the global allocator.
pub struct SystemAllocator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SystemAllocator<T> {
    /// Creates a new system allocator front-end.
    pub const fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for SystemAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SystemAllocator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SystemAllocator<T> {}

impl<T> fmt::Debug for SystemAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemAllocator")
            .field("element", &core::any::type_name::<T>())
            .finish()
    }
}

impl<T, U> PartialEq<SystemAllocator<U>> for SystemAllocator<T> {
    fn eq(&self, _other: &SystemAllocator<U>) -> bool {
        true
    }
}

impl<T> Eq for SystemAllocator<T> {}

impl<T> Allocator<T> for SystemAllocator<T> {
    const PROPAGATION: Propagation = Propagation::ALL;

    fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        if n == 0 {
            return Err(AllocError::ZeroCount);
        }
        trace!(count = n, size = mem::size_of::<T>(), "system allocate");
        allocate_array(n)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) -> Result<Release, AllocError> {
        if n == 0 {
            return Err(AllocError::ZeroCount);
        }
        trace!(count = n, addr = ptr.as_ptr() as usize, "system deallocate");
        deallocate_array(ptr, n);
        Ok(Release::Recycled)
    }
}

impl<T> Recycles<T> for SystemAllocator<T> {}

impl<T, U> Rebind<U> for SystemAllocator<T> {
    type Output = SystemAllocator<U>;

    fn rebind(&self) -> SystemAllocator<U> {
        SystemAllocator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::allocator::{dispose, emplace};

    #[test]
    fn test_system_allocator_array() {
        let system = SystemAllocator::<u32>::new();
        let ptr = system.allocate(3).unwrap();
        unsafe {
            for i in 0..3 {
                system.construct(NonNull::new_unchecked(ptr.as_ptr().add(i)), i as u32 * 10);
            }
            assert_eq!(*ptr.as_ptr().add(2), 20);
            assert_eq!(system.deallocate(ptr, 3), Ok(Release::Recycled));
        }
    }

    #[test]
    fn test_system_allocator_emplace() {
        let system = SystemAllocator::<String>::new();
        let ptr = emplace(&system, String::from("tracked")).unwrap();
        unsafe {
            assert_eq!(ptr.as_ref(), "tracked");
            assert_eq!(dispose(&system, ptr), Ok(Release::Recycled));
        }
    }

    #[test]
    fn test_system_allocators_are_interchangeable() {
        let a = SystemAllocator::<u8>::new();
        let b: SystemAllocator<u64> = crate::alloc::allocator::rebind(&a);
        assert!(a == b);
        assert_eq!(a.allocate(0), Err(AllocError::ZeroCount));
    }
}
