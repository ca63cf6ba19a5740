//! Allocator configuration.
//!
//! Both config types deserialize from JSON with every field optional, so a
//! partial document such as `{"blocks_per_chunk": 64}` is enough.

use serde::{Deserialize, Serialize};

use crate::alloc::constants::{DEFAULT_ARENA_CAPACITY, DEFAULT_BLOCKS_PER_CHUNK};
use crate::alloc::error::ConfigError;

/// How a pool reacts when its free list runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    /// Keep obtaining new chunks.
    #[default]
    Unbounded,
    /// Stop after `max_chunks` chunks and report exhaustion.
    Fixed {
        /// Upper bound on the number of chunks.
        max_chunks: usize,
    },
}

/// What a pool does with a pointer it does not own, or one already free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignPointerPolicy {
    /// Leave the pool untouched and report success.
    Ignore,
    /// Emit a warning and leave the pool untouched.
    #[default]
    Log,
    /// Return an error to the caller.
    Fail,
}

/// What a single-object front-end does with requests for `n > 1` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Fail with `AllocError::UnsupportedBatch`.
    #[default]
    Reject,
    /// Serve the request from the global allocator instead.
    SystemFallback,
}

/// Pool engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Blocks carved out of each chunk.
    pub blocks_per_chunk: usize,
    /// Whether the pool may obtain further chunks.
    pub growth: Growth,
    /// Handling of pointers the pool does not own.
    pub foreign_pointer: ForeignPointerPolicy,
    /// Handling of multi-element requests.
    pub batch: BatchPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            blocks_per_chunk: DEFAULT_BLOCKS_PER_CHUNK,
            growth: Growth::Unbounded,
            foreign_pointer: ForeignPointerPolicy::Log,
            batch: BatchPolicy::Reject,
        }
    }
}

impl PoolConfig {
    /// A pool that holds exactly `blocks` blocks in a single chunk and never grows.
    pub fn fixed(blocks: usize) -> Self {
        Self {
            blocks_per_chunk: blocks,
            growth: Growth::Fixed { max_chunks: 1 },
            ..Self::default()
        }
    }

    /// Sets the number of blocks per chunk.
    pub fn with_blocks_per_chunk(mut self, blocks: usize) -> Self {
        self.blocks_per_chunk = blocks;
        self
    }

    /// Sets the growth policy.
    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    /// Sets the foreign-pointer policy.
    pub fn with_foreign_pointer(mut self, policy: ForeignPointerPolicy) -> Self {
        self.foreign_pointer = policy;
        self
    }

    /// Sets the batch policy.
    pub fn with_batch(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed input, or the validation error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a usable pool.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyChunk` or `ConfigError::NoChunks`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks_per_chunk == 0 {
            return Err(ConfigError::EmptyChunk);
        }
        if let Growth::Fixed { max_chunks: 0 } = self.growth {
            return Err(ConfigError::NoChunks);
        }
        Ok(())
    }

    /// Maximum number of blocks this configuration can ever hand out.
    pub fn max_blocks(&self) -> Option<usize> {
        match self.growth {
            Growth::Unbounded => None,
            Growth::Fixed { max_chunks } => Some(max_chunks.saturating_mul(self.blocks_per_chunk)),
        }
    }
}

/// Arena and stack engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Total buffer size in bytes.
    pub capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ARENA_CAPACITY,
        }
    }
}

impl ArenaConfig {
    /// A configuration for a buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed input, or the validation error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `ConfigError::EmptyArena` for a zero capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::EmptyArena);
        }
        Ok(())
    }
}
