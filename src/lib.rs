//! # `stratum` - Pool, Arena and Stack Allocators
//!
//! A small family of custom allocators that generic containers can be
//! written against. Each allocator is split into an *engine* that owns the
//! memory and a typed *front-end* that implements the common
//! [`Allocator`] contract.
//!
//! ## Engines
//!
//! - **Pool** ([`FreeListPool`]): fixed-size blocks on a LIFO free list.
//!   Grows by whole chunks and releases every chunk when dropped.
//! - **Arena** ([`BumpArena`]): one fixed buffer consumed by an aligned
//!   offset. Nothing is freed individually; [`Marker`]s roll the offset back.
//! - **Stack** ([`StackAllocator`]): an arena shared by reference count, so
//!   views for different element types draw from the same buffer.
//!
//! ## Allocation shapes
//!
//! Front-ends whose `deallocate` makes storage reusable implement
//! [`Recycles`]. Arena-backed front-ends implement [`BulkReclaim`] instead,
//! and their `deallocate` reports [`Release::Deferred`] rather than
//! silently doing nothing.
//!
//! ## Equality
//!
//! Two front-ends compare equal when storage from one may be returned
//! through the other:
//!
//! | Front-end           | Equal when                 | Clone / rebind        |
//! |---------------------|----------------------------|-----------------------|
//! | [`PoolAllocator`]   | same pool instance         | builds a new pool     |
//! | [`ArenaAllocator`]  | same arena                 | shares the arena      |
//! | [`StackAllocator`]  | same shared buffer         | shares the buffer     |
//! | [`SystemAllocator`] | always                     | stateless             |
//!
//! ## Example
//!
//! ```rust
//! use stratum::{dispose, emplace, PoolAllocator, Release};
//!
//! let pool = PoolAllocator::<String>::new();
//! let greeting = emplace(&pool, String::from("hello")).unwrap();
//! assert_eq!(pool.allocated_count(), 1);
//!
//! let released = unsafe { dispose(&pool, greeting) }.unwrap();
//! assert_eq!(released, Release::Recycled);
//! assert_eq!(pool.allocated_count(), 0);
//! ```
//!
//! ## Logging
//!
//! Engines report chunk growth, teardown and rejected pointers through
//! `tracing`. Install any subscriber to see them.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod alloc;

pub use alloc::{
    dispose, emplace, rebind, AllocError, Allocator, ArenaAllocator, ArenaConfig, BulkReclaim, BumpArena,
    ConfigError, FreeListPool, Marker, PoolAllocator, PoolConfig, Propagation, Rebind, Recycles, Release,
    StackAllocator, SystemAllocator,
};

// Compile-time assertions for layout claims
const _: () = {
    use core::mem;
    use crate::alloc::block::BlockLayout;

    // Every block can hold a free-list link.
    assert!(BlockLayout::of::<u8>().size() == mem::size_of::<usize>());
    assert!(BlockLayout::of::<()>().size() == mem::size_of::<usize>());

    // Blocks keep the element's alignment.
    assert!(BlockLayout::of::<u128>().align() == mem::align_of::<u128>());
    assert!(BlockLayout::of::<[u8; 3]>().size() % BlockLayout::of::<[u8; 3]>().align() == 0);

    // Front-ends are thin handles.
    assert!(mem::size_of::<SystemAllocator<u64>>() == 0);
    assert!(mem::size_of::<ArenaAllocator<'static, u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<StackAllocator<u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<PoolAllocator<u64>>() == mem::size_of::<usize>());
};
