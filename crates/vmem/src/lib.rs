//! # nebula-vmem
//!
//! Manual memory management over reserved virtual memory.
//!
//! This crate provides three layers:
//! - Virtual memory primitives: reserve, commit, decommit and release of
//!   address space, plus a zeroed heap fallback ([`syscalls`])
//! - Fixed-capacity bump arenas that commit pages lazily, nest as
//!   sub-arenas and rewind to saved positions ([`arena`])
//! - Fixed-chunk pools carved from an arena with an intrusive free list
//!   ([`pool`])
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_vmem::prelude::*;
//!
//! let mut arena = Arena::new(1 << 20)?;
//! let mark = arena.current_position();
//!
//! {
//!     let mut pool = Pool::with_config(&arena, 48, 32, PoolConfig::zeroed())?;
//!     let mut chunk = pool.alloc(48).expect("fresh pool");
//!     chunk[..5].copy_from_slice(b"hello");
//!     pool.free(chunk, 48);
//! }
//!
//! arena.pop_to(mark);
//! assert_eq!(arena.used(), 0);
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `reserve-commit` (default): arenas reserve their full capacity and
//!   commit pages lazily; without it each arena is one zeroed heap block
//! - `logging` (default): structured events via `tracing`
//! - `diagnostics`: per-arena nesting depth and cumulative commit amount
//!
//! ## Errors
//!
//! Operational failures return [`MemoryError`]. Broken allocator contracts
//! (overflowing an arena, popping past its base, a pool size mismatch) go
//! through [`error::fatal`] from the plain operations; every such operation
//! has a `try_` twin returning the error instead.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]
// Explicit lifetimes are clearer in unsafe/arena code even when elidable
#![allow(clippy::elidable_lifetime_names)]

// Error types
pub mod error;

// Core modules
pub mod arena;
pub mod backing;
pub mod pool;
pub mod syscalls;
pub mod units;
pub mod utils;

pub use crate::error::{MemoryError, MemoryResult, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::arena::{Arena, ArenaGuard, ArenaStats, Position, SubArena};
    pub use crate::backing::{DefaultBacking, HeapBacking, RegionBacking, VirtualBacking};
    pub use crate::error::{MemoryError, MemoryResult, Result};
    pub use crate::pool::{Pool, PoolChunk, PoolConfig, PoolStats};
    pub use crate::units::{DEFAULT_ARENA_SIZE, GB, KB, MB};
}

#[cfg(feature = "logging")]
use tracing::debug;

/// Initialize nebula-vmem: create the process-wide default arena.
///
/// Call once at startup. Use [`arena::global::init_with_capacity`] for a
/// size other than [`units::DEFAULT_ARENA_SIZE`].
///
/// # Examples
///
/// ```rust
/// fn main() -> nebula_vmem::MemoryResult<()> {
///     nebula_vmem::init()?;
///
///     let used = nebula_vmem::arena::global::with_default_arena(|arena| {
///         arena.push(64);
///         arena.used()
///     })?;
///     assert_eq!(used, 64);
///
///     nebula_vmem::shutdown()
/// }
/// ```
pub fn init() -> MemoryResult<()> {
    #[cfg(feature = "logging")]
    debug!(page_size = syscalls::page_size(), "initializing nebula-vmem");

    arena::global::init()
}

/// Tear down the default arena, releasing its memory.
///
/// Safe to call when [`init`] was never called.
pub fn shutdown() -> MemoryResult<()> {
    #[cfg(feature = "logging")]
    debug!("shutting down nebula-vmem");

    arena::global::shutdown()
}
