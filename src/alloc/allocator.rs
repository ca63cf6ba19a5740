//! The allocator contract shared by every front-end.
//!
//! # Features
//! - [`Allocator`]: typed allocate/deallocate plus in-place construct and destroy
//! - [`Recycles`] and [`BulkReclaim`] separate per-object reuse from marker rollback
//! - [`Rebind`] derives a front-end for another element type
//! - [`Propagation`] tells containers how to treat the allocator on copy, move and swap

use core::ptr::{self, NonNull};

use crate::alloc::bump::Marker;
use crate::alloc::error::AllocError;

/// Whether a container should carry its allocator along when it is copied,
/// moved or swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    /// Copying the container shares the allocator with the copy.
    pub on_copy: bool,
    /// Moving the container moves the allocator with it.
    pub on_move: bool,
    /// Swapping two containers swaps their allocators.
    pub on_swap: bool,
}

impl Propagation {
    /// Never propagate; every copy gets its own engine.
    pub const NONE: Self = Self {
        on_copy: false,
        on_move: false,
        on_swap: false,
    };

    /// Always propagate; copies share one engine.
    pub const ALL: Self = Self {
        on_copy: true,
        on_move: true,
        on_swap: true,
    };
}

/// What happened to storage handed back through [`Allocator::deallocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The storage is available for the next allocation.
    Recycled,
    /// Nothing was reclaimed; the storage comes back on the next bulk
    /// rollback or reset.
    Deferred,
    /// The pointer was rejected and the engine left untouched, as the
    /// engine's foreign-pointer policy allows.
    Ignored,
}

/// A typed allocator front-end that generic containers can be written against.
///
/// Implementations forward to an engine that owns the actual storage. Two
/// front-ends compare equal when they share the same engine, which is the
/// condition under which storage obtained through one may be returned
/// through the other.
pub trait Allocator<T> {
    /// How containers should treat this front-end on copy, move and swap.
    const PROPAGATION: Propagation;

    /// Allocates uninitialized storage for `n` values of `T`.
    ///
    /// # Errors
    /// Returns `AllocError::ZeroCount` for `n == 0`, `AllocError::UnsupportedBatch`
    /// when the engine only serves single values, or `AllocError::Exhausted`.
    fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError>;

    /// Hands storage back to the engine.
    ///
    /// The returned [`Release`] says whether the storage was actually reclaimed.
    ///
    /// # Errors
    /// Returns an error when the engine rejects the pointer and is configured to fail.
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate(n)` on an equal front-end,
    /// with the same `n`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) -> Result<Release, AllocError>;

    /// Moves `value` into the storage at `ptr`.
    ///
    /// # Safety
    /// `ptr` must be valid, aligned and not hold a live value.
    unsafe fn construct(&self, ptr: NonNull<T>, value: T) {
        ptr.as_ptr().write(value);
    }

    /// Drops the value at `ptr` in place, leaving the storage allocated.
    ///
    /// # Safety
    /// `ptr` must hold a live value that is not used afterwards.
    unsafe fn destroy(&self, ptr: NonNull<T>) {
        ptr::drop_in_place(ptr.as_ptr());
    }
}

/// Front-ends whose `deallocate` makes the storage immediately reusable.
///
/// Containers that free elements one at a time and expect the memory back
/// should require this bound rather than plain [`Allocator`].
pub trait Recycles<T>: Allocator<T> {}

/// Engines that reclaim storage only in bulk, by rolling back to a marker.
pub trait BulkReclaim {
    /// Records the current top of the allocation stack.
    fn mark(&self) -> Marker;

    /// Reclaims everything allocated after `marker`, returning the bytes freed.
    ///
    /// # Errors
    /// Returns `AllocError::InvalidMarker` if `marker` is above the current top
    /// or came from another engine; the engine is left unchanged.
    fn rollback(&self, marker: Marker) -> Result<usize, AllocError>;

    /// Reclaims everything, returning the bytes freed.
    fn reset(&self) -> usize;
}

/// Produces a front-end for another element type from the same configuration.
///
/// Shared-state front-ends hand out views of the same engine; owning
/// front-ends build a fresh engine laid out for `U`.
pub trait Rebind<U> {
    /// The front-end for `U`.
    type Output: Allocator<U>;

    /// Builds the front-end for `U`.
    fn rebind(&self) -> Self::Output;
}

/// Rebinds `alloc` to element type `U`.
///
/// ```
/// use stratum::alloc::{rebind, StackAllocator};
///
/// let bytes = StackAllocator::<u8>::new(256).unwrap();
/// let words = rebind::<u64, _>(&bytes);
/// assert!(bytes == words);
/// ```
pub fn rebind<U, A: Rebind<U>>(alloc: &A) -> A::Output {
    alloc.rebind()
}

/// Allocates storage for one `T` and moves `value` into it.
///
/// # Errors
/// Returns the allocation error; `value` is dropped in that case.
pub fn emplace<T, A: Allocator<T>>(alloc: &A, value: T) -> Result<NonNull<T>, AllocError> {
    let ptr = alloc.allocate(1)?;
    unsafe { alloc.construct(ptr, value) };
    Ok(ptr)
}

/// Drops the value at `ptr` and hands its storage back.
///
/// # Errors
/// Returns the deallocation error; the value has already been dropped.
///
/// # Safety
/// `ptr` must come from [`emplace`] (or `allocate(1)` plus `construct`) on an
/// equal front-end and must not be used afterwards.
pub unsafe fn dispose<T, A: Allocator<T>>(alloc: &A, ptr: NonNull<T>) -> Result<Release, AllocError> {
    alloc.destroy(ptr);
    alloc.deallocate(ptr, 1)
}
