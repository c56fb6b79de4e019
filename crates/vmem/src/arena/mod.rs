//! Bump arenas over reserved virtual memory
//!
//! An [`Arena`] owns one region of fixed capacity and hands out bytes by
//! moving a cursor. Everything is freed at once, by rewinding to a
//! [`Position`], by [`Arena::pop_by`], by [`Arena::clear`], or by dropping the
//! arena.
//!
//! - [`Arena`]: fixed-capacity bump arena, generic over its
//!   [`RegionBacking`](crate::backing::RegionBacking)
//! - [`SubArena`]: nested arena carved out of a parent's region
//! - [`ArenaGuard`]: pops back to a saved position on drop
//! - [`global`]: explicitly initialized process-wide default arena
//!
//! # Examples
//!
//! ```
//! use nebula_vmem::arena::Arena;
//!
//! let arena = Arena::new(1 << 20)?;
//! let header = arena.push(64);
//!
//! let scratch = arena.subarena(16 * 1024);
//! scratch.push(4096).fill(0xFF);
//!
//! assert!(header.iter().all(|&b| b == 0));
//! # Ok::<(), nebula_vmem::MemoryError>(())
//! ```

mod bump;
pub mod global;
pub mod scope;
mod stats;

pub use self::bump::{ARENA_HEADER_SIZE, Arena, Position, SubArena};
pub use self::scope::ArenaGuard;
pub use self::stats::ArenaStats;
