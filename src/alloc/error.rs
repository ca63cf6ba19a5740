//! Error types shared by every engine and front-end.

use thiserror::Error;

/// The error type for allocation failures.
///
/// Every variant is recoverable: the engine that reported it is left exactly
/// as it was before the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The engine cannot satisfy the request without growing, and growth is
    /// disabled or impossible.
    #[error("allocator exhausted: requested {requested} bytes, {available} available")]
    Exhausted {
        /// Bytes requested, including alignment padding where known.
        requested: usize,
        /// Bytes (or blocks, for pools) still available.
        available: usize,
    },

    /// A pointer handed back to a pool does not belong to any of its blocks.
    #[error("pointer {addr:#x} is not owned by this allocator")]
    ForeignPointer {
        /// Address of the rejected pointer.
        addr: usize,
    },

    /// A pool block was returned while already on the free list.
    #[error("pointer {addr:#x} is not currently allocated")]
    NotAllocated {
        /// Address of the rejected pointer.
        addr: usize,
    },

    /// A marker was restored after the offset had already moved below it.
    #[error("marker {marker} is ahead of the current offset {offset}")]
    InvalidMarker {
        /// Offset recorded in the marker.
        marker: usize,
        /// Offset of the engine when the restore was attempted.
        offset: usize,
    },

    /// A single-object engine was asked for more than one element.
    #[error("batch of {requested} elements is not supported by this allocator")]
    UnsupportedBatch {
        /// Number of elements requested.
        requested: usize,
    },

    /// Zero elements were requested.
    #[error("cannot allocate zero elements")]
    ZeroCount,

    /// The requested alignment is zero or not a power of two.
    #[error("alignment {align} is not a power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },

    /// The request size overflows `usize` or `isize::MAX`.
    #[error("allocation size overflows")]
    LayoutOverflow,
}

/// The error type for invalid allocator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pool must hand out at least one block per chunk.
    #[error("blocks_per_chunk must be at least 1")]
    EmptyChunk,

    /// A fixed pool must be allowed at least one chunk.
    #[error("fixed growth must allow at least one chunk")]
    NoChunks,

    /// An arena buffer must have room for at least one byte.
    #[error("arena capacity must be at least 1 byte")]
    EmptyArena,

    /// The arena buffer is larger than any allocation can be.
    #[error("arena capacity {capacity} exceeds the maximum allocation size")]
    TooLarge {
        /// The rejected capacity.
        capacity: usize,
    },

    /// The configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
