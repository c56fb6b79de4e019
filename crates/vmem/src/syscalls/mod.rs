//! Low-level virtual memory primitives
//!
//! This module is the only place that talks to the operating system. It
//! exposes one contract regardless of the backing call:
//!
//! - **direct.rs** - reserve / commit / decommit / release of address space
//! - **heap.rs** - zeroed heap fallback for builds without reserve/commit
//! - **ops.rs** - zero / equal / copy on byte slices
//! - **info.rs** - cached page size
//!
//! Platform code lives in `unix.rs` (mmap/mprotect) and `windows.rs`
//! (VirtualAlloc/VirtualFree). Other targets only get the heap fallback.
//!
//! # Safety
//!
//! None of these primitives synchronize. Calling them concurrently on
//! overlapping ranges is a caller bug.

mod direct;
mod heap;
mod info;
mod ops;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        use unix as imp;
    } else if #[cfg(windows)] {
        mod windows;
        use windows as imp;
    } else {
        mod unsupported;
        use unsupported as imp;
    }
}

pub use direct::{commit, decommit, release, reserve};
pub use heap::{heap_alloc, heap_free};
pub use info::page_size;
pub use ops::{copy, equal, zero};
