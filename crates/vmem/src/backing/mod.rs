//! Backing strategies for arenas
//!
//! An arena never calls the OS itself. It goes through a [`RegionBacking`]
//! strategy chosen at build time:
//!
//! - [`ReserveCommit`] reserves the full capacity up front and commits pages
//!   lazily as the arena grows. It is built from a [`PageProvider`], which
//!   must supply all four of reserve, commit, decommit and release.
//! - [`DirectAlloc`] takes one zeroed heap block sized to the capacity. It is
//!   built from a [`HeapProvider`]; commits are no-ops.
//!
//! [`DefaultBacking`] is `ReserveCommit<OsPages>` when the `reserve-commit`
//! feature is on (the default) and `DirectAlloc<ProcessHeap>` otherwise.
//! Both strategies can always be named explicitly.

use std::ptr::NonNull;

use crate::error::MemoryResult;

mod heap;
mod pages;

pub use heap::{DirectAlloc, HeapProvider, ProcessHeap};
pub use pages::{OsPages, PageProvider, ReserveCommit};

/// Two-phase virtual memory strategy over the OS primitives
pub type VirtualBacking = ReserveCommit<OsPages>;

/// Single heap block strategy over the Rust global allocator
pub type HeapBacking = DirectAlloc<ProcessHeap>;

cfg_if::cfg_if! {
    if #[cfg(feature = "reserve-commit")] {
        /// Strategy used by [`Arena::new`](crate::arena::Arena::new)
        pub type DefaultBacking = VirtualBacking;
    } else {
        /// Strategy used by [`Arena::new`](crate::arena::Arena::new)
        pub type DefaultBacking = HeapBacking;
    }
}

/// Where an arena's bytes come from
///
/// Implementations are zero-sized markers; all methods are associated
/// functions.
pub trait RegionBacking {
    /// Short name used in log events
    const NAME: &'static str;

    /// Whether [`commit`](Self::commit) does real work. Arenas skip commit
    /// bookkeeping calls entirely when this is `false`.
    const LAZY_COMMIT: bool;

    /// Obtain a region of at least `size` bytes.
    ///
    /// Under a lazy strategy the region is inaccessible until committed;
    /// otherwise it is readable, writable and zeroed.
    fn acquire(size: usize) -> MemoryResult<NonNull<u8>>;

    /// Make `[ptr, ptr + size)` readable and writable.
    ///
    /// # Safety
    ///
    /// The range must lie inside a region returned by [`acquire`](Self::acquire)
    /// that has not been released.
    unsafe fn commit(ptr: NonNull<u8>, size: usize) -> MemoryResult<()>;

    /// Drop the physical backing of every page lying fully inside
    /// `[ptr, ptr + size)`; a later [`commit`](Self::commit) reads zero.
    ///
    /// # Safety
    ///
    /// As for [`commit`](Self::commit), and no live reference may point into
    /// the range.
    unsafe fn decommit(ptr: NonNull<u8>, size: usize) -> MemoryResult<()>;

    /// Give a whole region back.
    ///
    /// # Safety
    ///
    /// `ptr` and `size` must describe exactly one region returned by
    /// [`acquire`](Self::acquire); nothing may touch it afterwards.
    unsafe fn release(ptr: NonNull<u8>, size: usize) -> MemoryResult<()>;
}
