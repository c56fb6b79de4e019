//! Standalone error types for nebula-vmem
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.
//!
//! Two classes of failure exist. Operational failures (the OS refusing a
//! mapping, a bad configuration, an uninitialized default arena) are returned
//! as [`MemoryError`]. Contract violations (overflowing an arena, popping past
//! its base, handing a pool a chunk of the wrong size) are programmer errors:
//! the plain operations abort through [`fatal`], and each has a `try_` twin
//! returning the same [`MemoryError`] for callers that want to branch.

use std::io;

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory management errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MemoryError {
    // --- Platform Errors ---
    #[error("{operation} of {size} bytes failed: {source}")]
    Os {
        operation: &'static str,
        size: usize,
        #[source]
        source: io::Error,
    },

    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: &'static str },

    // --- Arena Errors ---
    #[error("Arena exhausted: requested {requested} bytes, available {available}")]
    ArenaExhausted { requested: usize, available: usize },

    #[error("Invalid pop: target {target} is past the current position {used}")]
    InvalidPop { target: usize, used: usize },

    #[error("Pop underflow: cannot pop {amount} bytes with {used} in use")]
    PopUnderflow { amount: usize, used: usize },

    #[error("Position belongs to a different arena")]
    ForeignPosition,

    // --- Pool Errors ---
    #[error("Chunk size mismatch: pool holds {chunk_size}-byte chunks, caller expected {expected}")]
    ChunkSizeMismatch { chunk_size: usize, expected: usize },

    #[error("Chunk at {address:#x} does not belong to this pool")]
    ForeignChunk { address: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Default Arena Errors ---
    #[error("Default arena is not initialized")]
    NotInitialized,

    #[error("Default arena is already initialized")]
    AlreadyInitialized,
}

impl MemoryError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Os { .. } => "MEM:OS:FAILED",
            Self::SizeOverflow { .. } => "MEM:ALLOC:OVERFLOW",
            Self::ArenaExhausted { .. } => "MEM:ARENA:EXHAUSTED",
            Self::InvalidPop { .. } => "MEM:ARENA:POP",
            Self::PopUnderflow { .. } => "MEM:ARENA:UNDERFLOW",
            Self::ForeignPosition => "MEM:ARENA:FOREIGN",
            Self::ChunkSizeMismatch { .. } => "MEM:POOL:SIZE",
            Self::ForeignChunk { .. } => "MEM:POOL:FOREIGN",
            Self::InvalidConfig { .. } => "MEM:CONFIG:INVALID",
            Self::NotInitialized => "MEM:DEFAULT:UNINIT",
            Self::AlreadyInitialized => "MEM:DEFAULT:INIT",
        }
    }

    /// Whether this error signals a broken caller contract rather than an
    /// operational failure
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::ArenaExhausted { .. }
                | Self::InvalidPop { .. }
                | Self::PopUnderflow { .. }
                | Self::ForeignPosition
                | Self::ChunkSizeMismatch { .. }
                | Self::ForeignChunk { .. }
        )
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create an OS failure error
    pub fn os(operation: &'static str, size: usize, source: io::Error) -> Self {
        #[cfg(feature = "logging")]
        error!(operation, size, %source, "virtual memory call failed");

        Self::Os {
            operation,
            size,
            source,
        }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &'static str) -> Self {
        Self::SizeOverflow { operation }
    }

    /// Create arena exhausted error
    pub fn arena_exhausted(requested: usize, available: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(requested, available, "arena exhausted");

        Self::ArenaExhausted {
            requested,
            available,
        }
    }

    /// Create invalid pop error
    pub fn invalid_pop(target: usize, used: usize) -> Self {
        Self::InvalidPop { target, used }
    }

    /// Create pop underflow error
    pub fn pop_underflow(amount: usize, used: usize) -> Self {
        Self::PopUnderflow { amount, used }
    }

    /// Create chunk size mismatch error
    pub fn chunk_size_mismatch(chunk_size: usize, expected: usize) -> Self {
        Self::ChunkSizeMismatch {
            chunk_size,
            expected,
        }
    }

    /// Create foreign chunk error
    pub fn foreign_chunk(address: usize) -> Self {
        Self::ForeignChunk { address }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Fatal path
// ============================================================================

/// Abort the current operation on a broken allocator contract.
///
/// Logs the error and panics with its message. With the workspace release
/// profile (`panic = "abort"`) this terminates the process.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fatal(err: MemoryError) -> ! {
    #[cfg(feature = "logging")]
    error!(code = err.code(), "{err}");

    panic!("{err}")
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================
