//! Fixed-chunk pool carved from an arena
//!
//! A [`Pool`] takes one block from an arena and splits it into equal chunks,
//! each preceded by a small link header. Free chunks form an intrusive
//! singly-linked list through those headers, so alloc and free are O(1) and
//! most-recently-freed chunks are reused first.
//!
//! ## Modules
//! - `allocator` - the pool and its free list
//! - `chunk` - move-only handle to an allocated chunk
//! - `config` - fill patterns and statistics switches
//! - `stats` - counter snapshot

mod allocator;
mod chunk;
mod config;
mod stats;

pub use allocator::{CHUNK_HEADER_SIZE, Pool};
pub use chunk::PoolChunk;
pub use config::PoolConfig;
pub use stats::PoolStats;
