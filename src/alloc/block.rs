//! Blocks, chunks and the sources chunks are obtained from.
//!
//! A pool never talks to the global allocator directly. It asks a
//! [`ChunkSource`] for whole chunks and hands every one of them back when it
//! is dropped.

use core::alloc::Layout;
use core::mem;
use core::ptr::NonNull;
use std::alloc::{alloc, dealloc};

use crate::alloc::constants::align_up;
use crate::alloc::error::AllocError;

/// Size and alignment of one pool block.
///
/// A block is never smaller than a `usize`, and its size is a multiple of its
/// alignment so that consecutive blocks in a chunk stay aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    size: usize,
    align: usize,
}

impl BlockLayout {
    /// The block layout for values of type `T`.
    pub const fn of<T>() -> Self {
        let align = mem::align_of::<T>();
        let size = if mem::size_of::<T>() > mem::size_of::<usize>() {
            mem::size_of::<T>()
        } else {
            mem::size_of::<usize>()
        };
        Self {
            size: align_up(size, align),
            align,
        }
    }

    /// Block size in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Block alignment in bytes.
    #[inline]
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Layout of a chunk holding `blocks` consecutive blocks.
    ///
    /// # Errors
    /// Returns `AllocError::LayoutOverflow` if the chunk would not fit in `isize::MAX`.
    pub fn chunk_layout(&self, blocks: usize) -> Result<Layout, AllocError> {
        let size = self.size.checked_mul(blocks).ok_or(AllocError::LayoutOverflow)?;
        Layout::from_size_align(size, self.align).map_err(|_| AllocError::LayoutOverflow)
    }
}

/// One contiguous run of blocks owned by a pool.
#[derive(Debug)]
pub struct Chunk {
    base: NonNull<u8>,
    layout: Layout,
    blocks: usize,
}

impl Chunk {
    pub(crate) fn new(base: NonNull<u8>, layout: Layout, blocks: usize) -> Self {
        Self { base, layout, blocks }
    }

    /// First byte of the chunk.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Layout the chunk was obtained with.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of blocks carved out of this chunk.
    #[inline]
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Byte offset of `addr` from the chunk base, if it falls inside the chunk.
    #[inline]
    pub fn offset_of(&self, addr: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base.as_ptr() as usize)?;
        (offset < self.layout.size()).then_some(offset)
    }
}

/// A trait for obtaining and releasing pool chunks.
///
/// This allows `FreeListPool` to be used with different backing stores, such
/// as the global allocator or an instrumented source in tests.
pub trait ChunkSource {
    /// Obtains a chunk of memory with the given layout.
    ///
    /// Returns `None` if the memory is not available.
    ///
    /// # Safety
    /// `layout` must have a nonzero size.
    unsafe fn obtain(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Releases a chunk.
    ///
    /// # Safety
    /// `ptr` must have been returned by `obtain` on this source with the same `layout`,
    /// and must not have been released already.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// A chunk source backed by the global allocator.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemChunks;

impl ChunkSource for SystemChunks {
    unsafe fn obtain(&self, layout: Layout) -> Option<NonNull<u8>> {
        NonNull::new(alloc(layout))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        dealloc(ptr.as_ptr(), layout);
    }
}
