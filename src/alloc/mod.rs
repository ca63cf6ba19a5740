//! Allocator engines and the typed front-ends built on them.
//!
//! Three engines cover the supported allocation shapes:
//!
//! - [`FreeListPool`]: fixed-size blocks recycled one at a time, growing in chunks.
//! - [`BumpArena`]: a single buffer consumed by an offset, reclaimed by marker
//!   rollback or reset.
//! - A shared [`BumpArena`] behind [`StackAllocator`], whose views can be
//!   cloned and rebound across element types.
//!
//! Every front-end implements [`Allocator`]. Those whose `deallocate`
//! actually frees also implement [`Recycles`]; the arena-backed ones
//! implement [`BulkReclaim`] instead.

pub mod allocator;
pub mod block;
pub mod bump;
pub mod config;
pub mod constants;
pub mod error;
pub mod pool;
pub mod stack;
pub mod system;

pub use allocator::{dispose, emplace, rebind, Allocator, BulkReclaim, Propagation, Rebind, Recycles, Release};
pub use block::{BlockLayout, ChunkSource, SystemChunks};
pub use bump::{ArenaAllocator, ArenaStats, BumpArena, Marker};
pub use config::{ArenaConfig, BatchPolicy, ForeignPointerPolicy, Growth, PoolConfig};
pub use error::{AllocError, ConfigError};
pub use pool::{FreeListPool, PoolAllocator, PoolStats};
pub use stack::StackAllocator;
pub use system::SystemAllocator;
