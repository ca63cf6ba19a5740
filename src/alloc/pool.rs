//! `FreeListPool` - a fixed-block pool allocator with chunk growth.
//!
//! Hands out blocks of one size from a LIFO free list, reusing freed blocks
//! in O(1). When the free list runs dry the pool obtains a new chunk from its
//! [`ChunkSource`], threads every block of that chunk onto the list, and
//! keeps the chunk until the pool itself is dropped.
//!
//! # Features
//! - **LIFO reuse**: the most recently freed block is the next one handed out.
//! - **Side-table free list**: free-list links live in a slot table indexed
//!   by block number, never inside user storage.
//! - **Checked returns**: every returned pointer is located through an
//!   address-ordered chunk index first, so foreign pointers and double frees
//!   cannot corrupt the list.
//! - **Full teardown**: every chunk ever obtained is released exactly once.

use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::alloc::allocator::{Allocator, Propagation, Rebind, Recycles, Release};
use crate::alloc::block::{BlockLayout, Chunk, ChunkSource, SystemChunks};
use crate::alloc::config::{BatchPolicy, ForeignPointerPolicy, Growth, PoolConfig};
use crate::alloc::error::{AllocError, ConfigError};
use crate::alloc::system;

/// State of one block, indexed by global block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free { next: Option<usize> },
    Occupied,
}

/// Point-in-time counters for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Size of one block in bytes.
    pub block_size: usize,
    /// Blocks obtained per growth step.
    pub blocks_per_chunk: usize,
    /// Chunks obtained so far.
    pub chunks: usize,
    /// Blocks across all chunks.
    pub capacity: usize,
    /// Blocks currently handed out.
    pub allocated: usize,
    /// Blocks currently on the free list.
    pub available: usize,
    /// Successful allocations over the pool's lifetime.
    pub total_allocations: u64,
    /// Blocks recycled over the pool's lifetime.
    pub total_deallocations: u64,
}

/// The pool engine.
pub struct FreeListPool<S: ChunkSource = SystemChunks> {
    block: BlockLayout,
    config: PoolConfig,
    source: S,
    chunks: Vec<Chunk>,
    /// Chunk base address to chunk number.
    by_address: BTreeMap<usize, usize>,
    slots: Vec<Slot>,
    free_head: Option<usize>,
    allocated: usize,
    total_allocations: u64,
    total_deallocations: u64,
}

impl FreeListPool<SystemChunks> {
    /// Creates an empty pool for blocks of `block` layout backed by the global allocator.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(block: BlockLayout, config: PoolConfig) -> Result<Self, ConfigError> {
        Self::with_source(block, config, SystemChunks)
    }
}

impl<S: ChunkSource> FreeListPool<S> {
    /// Creates an empty pool that obtains its chunks from `source`.
    ///
    /// No chunk is obtained until the first allocation.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` fails validation.
    pub fn with_source(block: BlockLayout, config: PoolConfig, source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(block, config, source))
    }

    fn from_parts(block: BlockLayout, config: PoolConfig, source: S) -> Self {
        debug!(
            block_size = block.size(),
            blocks_per_chunk = config.blocks_per_chunk,
            "pool created"
        );
        Self {
            block,
            config,
            source,
            chunks: Vec::new(),
            by_address: BTreeMap::new(),
            slots: Vec::new(),
            free_head: None,
            allocated: 0,
            total_allocations: 0,
            total_deallocations: 0,
        }
    }

    /// Pops a block off the free list, growing the pool first if the list is empty.
    ///
    /// # Errors
    /// Returns `AllocError::Exhausted` if the pool may not grow or the chunk
    /// source is out of memory.
    pub fn allocate(&mut self) -> Result<NonNull<u8>, AllocError> {
        if self.free_head.is_none() {
            self.grow()?;
        }
        let index = self.free_head.ok_or(AllocError::Exhausted {
            requested: self.block.size(),
            available: 0,
        })?;

        let next = match self.slots[index] {
            Slot::Free { next } => next,
            Slot::Occupied => {
                debug_assert!(false, "occupied block {index} on the free list");
                None
            }
        };
        self.slots[index] = Slot::Occupied;
        self.free_head = next;
        self.allocated += 1;
        self.total_allocations += 1;

        let ptr = self.block_ptr(index);
        trace!(index, addr = ptr.as_ptr() as usize, "pool block allocated");
        Ok(ptr)
    }

    /// Pushes the block at `ptr` back onto the free list.
    ///
    /// Pointers that are not at a block boundary of this pool, or that name a
    /// block already on the free list, are handled according to the
    /// configured [`ForeignPointerPolicy`]. The free list is never modified
    /// for such pointers.
    ///
    /// # Errors
    /// Returns `AllocError::ForeignPointer` or `AllocError::NotAllocated`
    /// under [`ForeignPointerPolicy::Fail`].
    pub fn deallocate(&mut self, ptr: NonNull<u8>) -> Result<Release, AllocError> {
        let addr = ptr.as_ptr() as usize;
        let Some(index) = self.locate(addr) else {
            return self.reject(AllocError::ForeignPointer { addr });
        };
        if let Slot::Free { .. } = self.slots[index] {
            return self.reject(AllocError::NotAllocated { addr });
        }

        self.slots[index] = Slot::Free { next: self.free_head };
        self.free_head = Some(index);
        self.allocated -= 1;
        self.total_deallocations += 1;
        trace!(index, addr, "pool block recycled");
        Ok(Release::Recycled)
    }

    /// Returns true if `ptr` is the start of a block owned by this pool.
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        self.locate(ptr.as_ptr() as usize).is_some()
    }

    /// Number of chunks obtained so far.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of blocks currently handed out.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Number of blocks on the free list.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.allocated
    }

    /// Total blocks across all chunks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Layout of every block in this pool.
    #[inline]
    pub fn block_layout(&self) -> BlockLayout {
        self.block
    }

    /// Configuration the pool was created with.
    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Source the pool obtains chunks from.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            block_size: self.block.size(),
            blocks_per_chunk: self.config.blocks_per_chunk,
            chunks: self.chunks.len(),
            capacity: self.capacity(),
            allocated: self.allocated,
            available: self.available(),
            total_allocations: self.total_allocations,
            total_deallocations: self.total_deallocations,
        }
    }

    fn grow(&mut self) -> Result<(), AllocError> {
        if let Growth::Fixed { max_chunks } = self.config.growth {
            if self.chunks.len() >= max_chunks {
                debug!(chunks = self.chunks.len(), "pool exhausted, growth disabled");
                return Err(AllocError::Exhausted {
                    requested: self.block.size(),
                    available: 0,
                });
            }
        }

        let blocks = self.config.blocks_per_chunk;
        let layout = self.block.chunk_layout(blocks)?;
        self.slots.try_reserve(blocks).map_err(|_| {
            debug!(blocks, "pool could not grow its slot table");
            AllocError::Exhausted {
                requested: layout.size(),
                available: 0,
            }
        })?;
        // SAFETY: blocks >= 1 and block size >= size_of::<usize>(), so the layout is nonzero.
        let base = unsafe { self.source.obtain(layout) }.ok_or(AllocError::Exhausted {
            requested: layout.size(),
            available: 0,
        })?;

        // Thread the new blocks in address order and prepend the batch.
        let first = self.slots.len();
        for i in 1..blocks {
            self.slots.push(Slot::Free { next: Some(first + i) });
        }
        self.slots.push(Slot::Free { next: self.free_head });
        self.free_head = Some(first);
        self.by_address.insert(base.as_ptr() as usize, self.chunks.len());
        self.chunks.push(Chunk::new(base, layout, blocks));

        debug!(
            chunk = self.chunks.len(),
            blocks,
            bytes = layout.size(),
            "pool obtained chunk"
        );
        Ok(())
    }

    fn block_ptr(&self, index: usize) -> NonNull<u8> {
        let per_chunk = self.config.blocks_per_chunk;
        let chunk = &self.chunks[index / per_chunk];
        let offset = (index % per_chunk) * self.block.size();
        // SAFETY: offset is within the chunk, which is a live allocation.
        unsafe { NonNull::new_unchecked(chunk.base().as_ptr().add(offset)) }
    }

    fn locate(&self, addr: usize) -> Option<usize> {
        let size = self.block.size();
        let per_chunk = self.config.blocks_per_chunk;
        let (_, &i) = self.by_address.range(..=addr).next_back()?;
        let offset = self.chunks[i].offset_of(addr)?;
        (offset % size == 0).then(|| i * per_chunk + offset / size)
    }

    fn reject(&self, err: AllocError) -> Result<Release, AllocError> {
        match self.config.foreign_pointer {
            ForeignPointerPolicy::Ignore => Ok(Release::Ignored),
            ForeignPointerPolicy::Log => {
                warn!(error = %err, "pool ignored invalid deallocation");
                Ok(Release::Ignored)
            }
            ForeignPointerPolicy::Fail => Err(err),
        }
    }
}

impl<S: ChunkSource> Drop for FreeListPool<S> {
    fn drop(&mut self) {
        if self.allocated > 0 {
            debug!(live_blocks = self.allocated, "pool dropped with blocks still allocated");
        }
        let released = self.chunks.len();
        self.by_address.clear();
        for chunk in self.chunks.drain(..) {
            // SAFETY: each chunk was obtained from this source with this layout and is
            // drained from the table, so it is released exactly once.
            unsafe { self.source.release(chunk.base(), chunk.layout()) };
        }
        debug!(chunks = released, "pool released chunks");
    }
}

impl<S: ChunkSource> fmt::Debug for FreeListPool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeListPool").field("stats", &self.stats()).finish()
    }
}

/// A typed front-end owning one [`FreeListPool`].
///
/// Serves exactly one `T` per `allocate` call. Cloning or rebinding builds a
/// new, independent pool with the same configuration; two front-ends compare
/// equal only if they are the same pool.
pub struct PoolAllocator<T, S: ChunkSource = SystemChunks> {
    pool: Box<RefCell<FreeListPool<S>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolAllocator<T, SystemChunks> {
    /// Creates a pool front-end with the default configuration.
    pub fn new() -> Self {
        Self::from_pool(FreeListPool::from_parts(
            BlockLayout::of::<T>(),
            PoolConfig::default(),
            SystemChunks,
        ))
    }

    /// Creates a pool front-end with `config`.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` fails validation.
    pub fn with_config(config: PoolConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, SystemChunks)
    }
}

impl<T, S: ChunkSource> PoolAllocator<T, S> {
    /// Creates a pool front-end whose chunks come from `source`.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` fails validation.
    pub fn with_source(config: PoolConfig, source: S) -> Result<Self, ConfigError> {
        FreeListPool::with_source(BlockLayout::of::<T>(), config, source).map(Self::from_pool)
    }

    fn from_pool(pool: FreeListPool<S>) -> Self {
        Self {
            pool: Box::new(RefCell::new(pool)),
            _marker: PhantomData,
        }
    }

    /// Configuration of the underlying pool.
    pub fn config(&self) -> PoolConfig {
        *self.pool.borrow().config()
    }

    /// Snapshot of the underlying pool's counters.
    pub fn stats(&self) -> PoolStats {
        self.pool.borrow().stats()
    }

    /// Number of chunks the pool has obtained.
    pub fn chunk_count(&self) -> usize {
        self.pool.borrow().chunk_count()
    }

    /// Number of values currently allocated.
    pub fn allocated_count(&self) -> usize {
        self.pool.borrow().allocated()
    }

    /// Number of free blocks ready for reuse.
    pub fn available_count(&self) -> usize {
        self.pool.borrow().available()
    }

    /// Returns true if `ptr` is a block of this pool.
    pub fn contains(&self, ptr: NonNull<T>) -> bool {
        self.pool.borrow().contains(ptr.cast())
    }

    fn engine_addr(&self) -> *const () {
        ptr::addr_of!(*self.pool).cast()
    }
}

impl<T> Default for PoolAllocator<T, SystemChunks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: ChunkSource + Clone> Clone for PoolAllocator<T, S> {
    fn clone(&self) -> Self {
        let pool = self.pool.borrow();
        Self::from_pool(FreeListPool::from_parts(
            pool.block_layout(),
            *pool.config(),
            pool.source().clone(),
        ))
    }
}

impl<T, S: ChunkSource> fmt::Debug for PoolAllocator<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("element", &core::any::type_name::<T>())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T, U, S: ChunkSource, R: ChunkSource> PartialEq<PoolAllocator<U, R>> for PoolAllocator<T, S> {
    fn eq(&self, other: &PoolAllocator<U, R>) -> bool {
        self.engine_addr() == other.engine_addr()
    }
}

impl<T, S: ChunkSource> Eq for PoolAllocator<T, S> {}

impl<T, S: ChunkSource> Allocator<T> for PoolAllocator<T, S> {
    const PROPAGATION: Propagation = Propagation::NONE;

    fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        match n {
            0 => Err(AllocError::ZeroCount),
            1 => self.pool.borrow_mut().allocate().map(NonNull::cast),
            _ => match self.config().batch {
                BatchPolicy::Reject => Err(AllocError::UnsupportedBatch { requested: n }),
                BatchPolicy::SystemFallback => {
                    trace!(count = n, "pool batch served by system allocator");
                    system::allocate_array(n)
                }
            },
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) -> Result<Release, AllocError> {
        match n {
            0 => Err(AllocError::ZeroCount),
            1 => self.pool.borrow_mut().deallocate(ptr.cast()),
            _ => match self.config().batch {
                BatchPolicy::Reject => Err(AllocError::UnsupportedBatch { requested: n }),
                BatchPolicy::SystemFallback => {
                    system::deallocate_array(ptr, n);
                    Ok(Release::Recycled)
                }
            },
        }
    }

    unsafe fn construct(&self, ptr: NonNull<T>, value: T) {
        trace!(addr = ptr.as_ptr() as usize, "pool constructing value");
        ptr.as_ptr().write(value);
    }

    unsafe fn destroy(&self, ptr: NonNull<T>) {
        trace!(addr = ptr.as_ptr() as usize, "pool destroying value");
        ptr::drop_in_place(ptr.as_ptr());
    }
}

impl<T, S: ChunkSource> Recycles<T> for PoolAllocator<T, S> {}

impl<T, U, S: ChunkSource + Clone> Rebind<U> for PoolAllocator<T, S> {
    type Output = PoolAllocator<U, S>;

    fn rebind(&self) -> PoolAllocator<U, S> {
        let pool = self.pool.borrow();
        PoolAllocator::from_pool(FreeListPool::from_parts(
            BlockLayout::of::<U>(),
            *pool.config(),
            pool.source().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    fn pool_of(blocks: usize) -> FreeListPool {
        FreeListPool::new(
            BlockLayout::of::<u64>(),
            PoolConfig::default().with_blocks_per_chunk(blocks),
        )
        .unwrap()
    }

    #[test]
    fn test_pool_is_lazy() {
        let pool = pool_of(4);
        assert_eq!(pool.chunk_count(), 0);
        assert_eq!(pool.capacity(), 0);
    }

    #[test]
    fn test_chunk_blocks_handed_out_in_address_order() {
        let mut pool = pool_of(4);
        let blocks: Vec<_> = (0..4).map(|_| pool.allocate().unwrap()).collect();
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].as_ptr() as usize - pair[0].as_ptr() as usize, 8);
        }
        assert_eq!(pool.chunk_count(), 1);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_lifo_reuse_and_growth() {
        let mut pool = pool_of(4);
        let b: Vec<_> = (0..4).map(|_| pool.allocate().unwrap()).collect();

        assert_eq!(pool.deallocate(b[1]), Ok(Release::Recycled));
        assert_eq!(pool.deallocate(b[2]), Ok(Release::Recycled));
        assert_eq!(pool.allocate().unwrap(), b[2]);
        assert_eq!(pool.allocate().unwrap(), b[1]);

        let fifth = pool.allocate().unwrap();
        assert_eq!(pool.chunk_count(), 2);
        assert!(!b.contains(&fifth));
        assert!(pool.contains(fifth));
    }

    #[test]
    fn test_growth_prepends_batch_to_free_list() {
        let mut pool = pool_of(2);
        let a = pool.allocate().unwrap();
        let _b = pool.allocate().unwrap();
        let c = pool.allocate().unwrap(); // second chunk, first block
        pool.deallocate(a).unwrap();
        // Free list is now a -> (second chunk, second block).
        assert_eq!(pool.allocate().unwrap(), a);
        let d = pool.allocate().unwrap();
        assert_eq!(d.as_ptr() as usize - c.as_ptr() as usize, 8);
        assert_eq!(pool.chunk_count(), 2);
    }

    #[test]
    fn test_fixed_pool_exhaustion_and_recovery() {
        let mut pool = FreeListPool::new(BlockLayout::of::<u32>(), PoolConfig::fixed(3)).unwrap();
        let blocks: Vec<_> = (0..3).map(|_| pool.allocate().unwrap()).collect();
        assert!(matches!(pool.allocate(), Err(AllocError::Exhausted { .. })));
        pool.deallocate(blocks[0]).unwrap();
        assert_eq!(pool.allocate().unwrap(), blocks[0]);
        assert_eq!(pool.chunk_count(), 1);
    }

    #[test]
    fn test_foreign_pointer_policies() {
        let mut outside = 0u64;
        let foreign = NonNull::from(&mut outside).cast::<u8>();

        let mut pool = pool_of(4);
        let block = pool.allocate().unwrap();
        assert_eq!(pool.deallocate(foreign), Ok(Release::Ignored));

        let mut strict = FreeListPool::new(
            BlockLayout::of::<u64>(),
            PoolConfig::default()
                .with_blocks_per_chunk(4)
                .with_foreign_pointer(ForeignPointerPolicy::Fail),
        )
        .unwrap();
        let inside = strict.allocate().unwrap();
        let addr = foreign.as_ptr() as usize;
        assert_eq!(strict.deallocate(foreign), Err(AllocError::ForeignPointer { addr }));

        // Interior pointer is not a block boundary.
        let interior = unsafe { NonNull::new_unchecked(inside.as_ptr().add(1)) };
        assert!(matches!(
            strict.deallocate(interior),
            Err(AllocError::ForeignPointer { .. })
        ));

        strict.deallocate(inside).unwrap();
        let addr = inside.as_ptr() as usize;
        assert_eq!(strict.deallocate(inside), Err(AllocError::NotAllocated { addr }));
        assert_eq!(strict.available(), 4);

        pool.deallocate(block).unwrap();
    }

    #[test]
    fn test_ignore_policy_is_silent() {
        let mut outside = 0u64;
        let foreign = NonNull::from(&mut outside).cast::<u8>();
        let mut pool = FreeListPool::new(
            BlockLayout::of::<u64>(),
            PoolConfig::default()
                .with_blocks_per_chunk(4)
                .with_foreign_pointer(ForeignPointerPolicy::Ignore),
        )
        .unwrap();

        let block = pool.allocate().unwrap();
        assert_eq!(pool.deallocate(foreign), Ok(Release::Ignored));
        assert_eq!(pool.available(), 3);

        assert_eq!(pool.deallocate(block), Ok(Release::Recycled));
        assert_eq!(pool.deallocate(block), Ok(Release::Ignored));
        assert_eq!(pool.available(), 4);
        assert_eq!(pool.stats().total_deallocations, 1);
    }

    #[test]
    fn test_deallocate_across_many_chunks() {
        let mut pool = pool_of(1);
        let mut blocks: Vec<_> = (0..512).map(|_| pool.allocate().unwrap()).collect();
        assert_eq!(pool.chunk_count(), 512);

        // Return them in an order unrelated to chunk creation.
        blocks.sort_by_key(|p| (p.as_ptr() as usize).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        for &block in &blocks {
            assert!(pool.contains(block));
            let interior = unsafe { NonNull::new_unchecked(block.as_ptr().add(1)) };
            assert!(!pool.contains(interior));
            assert_eq!(pool.deallocate(block), Ok(Release::Recycled));
        }
        assert_eq!(pool.allocated(), 0);
        assert_eq!(pool.available(), 512);

        // LIFO: the last block returned is the first handed out again.
        assert_eq!(pool.allocate().unwrap(), blocks[511]);
    }

    #[derive(Default)]
    struct CountingChunks {
        obtained: Cell<usize>,
    }

    impl ChunkSource for CountingChunks {
        unsafe fn obtain(&self, layout: core::alloc::Layout) -> Option<NonNull<u8>> {
            self.obtained.set(self.obtained.get() + 1);
            SystemChunks.obtain(layout)
        }

        unsafe fn release(&self, ptr: NonNull<u8>, layout: core::alloc::Layout) {
            SystemChunks.release(ptr, layout);
        }
    }

    #[test]
    fn test_oversized_slot_table_reports_exhaustion() {
        let blocks = isize::MAX as usize / BlockLayout::of::<u8>().size();
        let mut pool = FreeListPool::with_source(
            BlockLayout::of::<u8>(),
            PoolConfig::default().with_blocks_per_chunk(blocks),
            CountingChunks::default(),
        )
        .unwrap();

        assert!(matches!(pool.allocate(), Err(AllocError::Exhausted { .. })));
        assert_eq!(pool.source().obtained.get(), 0);
        assert_eq!(pool.chunk_count(), 0);
    }

    #[test]
    fn test_stats() {
        let mut pool = pool_of(10);
        let a = pool.allocate().unwrap();
        let _b = pool.allocate().unwrap();
        pool.deallocate(a).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.chunks, 1);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.available, 9);
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_deallocations, 1);

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["block_size"], 8);
    }

    #[test]
    fn test_front_end_rejects_batches() {
        let pool = PoolAllocator::<u32>::new();
        assert_eq!(pool.allocate(2), Err(AllocError::UnsupportedBatch { requested: 2 }));
        assert_eq!(pool.allocate(0), Err(AllocError::ZeroCount));
        assert_eq!(pool.chunk_count(), 0);
    }

    #[test]
    fn test_front_end_batch_fallback() {
        let pool = PoolAllocator::<u32>::with_config(
            PoolConfig::default().with_batch(BatchPolicy::SystemFallback),
        )
        .unwrap();
        let many = pool.allocate(16).unwrap();
        assert!(!pool.contains(many));
        assert_eq!(pool.chunk_count(), 0);
        unsafe {
            assert_eq!(pool.deallocate(many, 16), Ok(Release::Recycled));
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let a = PoolAllocator::<u64>::with_config(PoolConfig::default().with_blocks_per_chunk(8)).unwrap();
        let b = a.clone();
        assert!(a == a);
        assert!(a != b);
        assert_eq!(b.config().blocks_per_chunk, 8);

        let p = a.allocate(1).unwrap();
        assert!(!b.contains(p));
        unsafe { a.deallocate(p, 1).unwrap() };
    }
}
