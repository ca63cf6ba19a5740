//! `BumpArena` - a fixed-buffer arena with marker rollback.
//!
//! # Features
//! - **O(1) allocation**: one aligned offset bump per request.
//! - **Markers**: [`Marker`]s record the offset and roll it back later.
//! - **Borrowing front-end**: [`ArenaAllocator`] gives typed access to an
//!   arena the caller owns.

use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;
use std::alloc::{alloc, dealloc, handle_alloc_error};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::alloc::allocator::{Allocator, BulkReclaim, Propagation, Rebind, Release};
use crate::alloc::config::ArenaConfig;
use crate::alloc::constants::BUFFER_ALIGN;
use crate::alloc::error::{AllocError, ConfigError};

/// A saved arena offset.
///
/// Obtained from [`BumpArena::save`] and handed back to
/// [`BumpArena::restore`] to reclaim everything allocated in between. A
/// marker remembers the buffer it was taken from and is rejected by any
/// other arena. [`Marker::START`] is accepted by every arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker {
    buffer: usize,
    offset: usize,
}

impl Marker {
    /// The marker of an empty arena.
    pub const START: Self = Self { buffer: 0, offset: 0 };

    /// The byte offset this marker records.
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset
    }

    fn belongs_to(self, buffer: usize) -> bool {
        self == Self::START || self.buffer == buffer
    }
}

/// Point-in-time usage of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    /// Buffer size in bytes.
    pub capacity: usize,
    /// Bytes currently in use.
    pub used: usize,
    /// Bytes still available.
    pub remaining: usize,
    /// Highest offset reached since creation.
    pub peak: usize,
}

/// A fixed-size bump arena.
///
/// Allocation advances a single offset through one buffer; nothing is freed
/// individually. Storage comes back only through [`restore`](Self::restore)
/// or [`reset`](Self::reset), after which every pointer handed out past the
/// restored offset is dangling. The arena never grows.
///
/// All operations take `&self` so that several front-ends can draw from one
/// arena. The arena is not `Sync`.
pub struct BumpArena {
    base: NonNull<u8>,
    layout: Layout,
    offset: Cell<usize>,
    peak: Cell<usize>,
}

impl BumpArena {
    /// Creates an arena with a buffer of `capacity` bytes.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyArena` for a zero capacity, or
    /// `ConfigError::TooLarge` if the buffer cannot be described by a `Layout`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(ArenaConfig::with_capacity(capacity))
    }

    /// Creates an arena from `config`.
    ///
    /// # Errors
    /// See [`BumpArena::new`].
    pub fn with_config(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = Layout::from_size_align(config.capacity, BUFFER_ALIGN)
            .map_err(|_| ConfigError::TooLarge { capacity: config.capacity })?;
        // SAFETY: validate() guarantees a nonzero size.
        let ptr = unsafe { alloc(layout) };
        let Some(base) = NonNull::new(ptr) else {
            handle_alloc_error(layout);
        };
        debug!(capacity = config.capacity, "arena created");
        Ok(Self {
            base,
            layout,
            offset: Cell::new(0),
            peak: Cell::new(0),
        })
    }

    /// Allocates `bytes` bytes aligned to `align`.
    ///
    /// The returned address is a multiple of `align` for any power-of-two
    /// alignment. Padding inserted for alignment counts against the capacity.
    ///
    /// # Errors
    /// Returns `AllocError::InvalidAlignment` if `align` is not a power of two,
    /// or `AllocError::Exhausted` if the aligned request does not fit.
    pub fn allocate(&self, bytes: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        if !align.is_power_of_two() {
            return Err(AllocError::InvalidAlignment { align });
        }
        let offset = self.offset.get();
        let capacity = self.capacity();
        let base = self.base.as_ptr() as usize;

        let current = base + offset;
        let aligned = current
            .checked_add(align - 1)
            .ok_or(AllocError::LayoutOverflow)?
            & !(align - 1);
        let start = aligned - base;
        let end = start.checked_add(bytes).ok_or(AllocError::LayoutOverflow)?;

        if end > capacity {
            debug!(bytes, align, offset, capacity, "arena out of memory");
            return Err(AllocError::Exhausted {
                requested: end - offset,
                available: capacity - offset,
            });
        }

        self.offset.set(end);
        if end > self.peak.get() {
            self.peak.set(end);
        }
        trace!(bytes, align, offset = start, top = end, "arena allocation");
        // SAFETY: start <= end <= capacity, so the pointer stays within (or one past) the buffer.
        Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(start)) })
    }

    /// Allocates uninitialized storage for `count` values of `T`.
    ///
    /// # Errors
    /// Returns `AllocError::LayoutOverflow` if the array size overflows, or
    /// `AllocError::Exhausted`.
    pub fn alloc_array<T>(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Layout::array::<T>(count).map_err(|_| AllocError::LayoutOverflow)?;
        self.allocate(layout.size(), layout.align()).map(NonNull::cast)
    }

    /// Records the current offset.
    #[inline]
    pub fn save(&self) -> Marker {
        Marker {
            buffer: self.base.as_ptr() as usize,
            offset: self.offset.get(),
        }
    }

    /// Rolls the offset back to `marker`, returning the number of bytes reclaimed.
    ///
    /// Every allocation made after `marker` was taken becomes invalid. Values
    /// living there are not dropped; destroy them first.
    ///
    /// # Errors
    /// Returns `AllocError::InvalidMarker` if `marker` is above the current
    /// offset or was taken from another arena. The arena is left unchanged.
    pub fn restore(&self, marker: Marker) -> Result<usize, AllocError> {
        let offset = self.offset.get();
        if !marker.belongs_to(self.base.as_ptr() as usize) {
            warn!(marker = marker.offset, offset, "rejected restore to a marker from another arena");
            return Err(AllocError::InvalidMarker {
                marker: marker.offset,
                offset,
            });
        }
        if marker.offset > offset {
            warn!(marker = marker.offset, offset, "rejected restore to a forward marker");
            return Err(AllocError::InvalidMarker {
                marker: marker.offset,
                offset,
            });
        }
        self.offset.set(marker.offset);
        let freed = offset - marker.offset;
        debug!(freed, offset = marker.offset, "arena restored");
        Ok(freed)
    }

    /// Rolls the offset back to zero, returning the number of bytes reclaimed.
    pub fn reset(&self) -> usize {
        let freed = self.offset.replace(0);
        debug!(freed, "arena reset");
        freed
    }

    /// Size of the buffer in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Bytes handed out, including alignment padding.
    #[inline]
    pub fn used(&self) -> usize {
        self.offset.get()
    }

    /// Bytes left at the top of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset.get()
    }

    /// Highest offset reached since the arena was created.
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak.get()
    }

    /// Returns true if `ptr` points into the arena buffer.
    pub fn contains<T>(&self, ptr: NonNull<T>) -> bool {
        let base = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= base && addr < base + self.capacity()
    }

    /// Snapshot of the arena's usage.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity: self.capacity(),
            used: self.used(),
            remaining: self.remaining(),
            peak: self.peak(),
        }
    }
}

impl Drop for BumpArena {
    fn drop(&mut self) {
        // SAFETY: base was allocated in `with_config` with exactly this layout.
        unsafe { dealloc(self.base.as_ptr(), self.layout) };
        debug!(capacity = self.capacity(), peak = self.peak(), "arena released");
    }
}

impl fmt::Debug for BumpArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpArena").field("stats", &self.stats()).finish()
    }
}

impl BulkReclaim for BumpArena {
    fn mark(&self) -> Marker {
        self.save()
    }

    fn rollback(&self, marker: Marker) -> Result<usize, AllocError> {
        self.restore(marker)
    }

    fn reset(&self) -> usize {
        BumpArena::reset(self)
    }
}

/// A typed front-end borrowing a [`BumpArena`].
///
/// Copies and rebinds all draw from the same arena and compare equal.
/// `deallocate` reclaims nothing and reports [`Release::Deferred`].
pub struct ArenaAllocator<'a, T> {
    arena: &'a BumpArena,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> ArenaAllocator<'a, T> {
    /// Creates a front-end drawing from `arena`.
    pub fn new(arena: &'a BumpArena) -> Self {
        Self {
            arena,
            _marker: PhantomData,
        }
    }

    /// The arena this front-end draws from.
    #[inline]
    pub fn arena(&self) -> &'a BumpArena {
        self.arena
    }
}

impl<T> Clone for ArenaAllocator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaAllocator<'_, T> {}

impl<T> fmt::Debug for ArenaAllocator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("element", &core::any::type_name::<T>())
            .field("arena", self.arena)
            .finish()
    }
}

impl<'b, T, U> PartialEq<ArenaAllocator<'b, U>> for ArenaAllocator<'_, T> {
    fn eq(&self, other: &ArenaAllocator<'b, U>) -> bool {
        core::ptr::eq(self.arena, other.arena)
    }
}

impl<T> Eq for ArenaAllocator<'_, T> {}

impl<T> Allocator<T> for ArenaAllocator<'_, T> {
    const PROPAGATION: Propagation = Propagation::ALL;

    fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        if n == 0 {
            return Err(AllocError::ZeroCount);
        }
        self.arena.alloc_array(n)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) -> Result<Release, AllocError> {
        trace!(addr = ptr.as_ptr() as usize, count = n, "arena deallocate deferred");
        Ok(Release::Deferred)
    }
}

impl<T> BulkReclaim for ArenaAllocator<'_, T> {
    fn mark(&self) -> Marker {
        self.arena.save()
    }

    fn rollback(&self, marker: Marker) -> Result<usize, AllocError> {
        self.arena.restore(marker)
    }

    fn reset(&self) -> usize {
        self.arena.reset()
    }
}

impl<'a, T, U> Rebind<U> for ArenaAllocator<'a, T> {
    type Output = ArenaAllocator<'a, U>;

    fn rebind(&self) -> ArenaAllocator<'a, U> {
        ArenaAllocator::new(self.arena)
    }
}
