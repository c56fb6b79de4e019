//! Reserve / commit / decommit / release
//!
//! # Safety
//!
//! These wrappers perform FFI calls that change what the process may touch:
//! - **Unix**: mmap, mprotect, munmap
//! - **Windows**: `VirtualAlloc`, `VirtualFree`
//!
//! ## Safety Contracts
//!
//! Callers of the `unsafe` functions must ensure:
//! 1. **Ownership**: ranges lie inside a reservation obtained from [`reserve`]
//! 2. **Liveness**: no Rust reference points into pages being decommitted or
//!    released
//! 3. **Lifecycle**: a reservation is released exactly once
//!
//! Requests are rounded to page granularity here, so callers may pass any
//! byte range.

use std::io;
use std::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::trace;

use super::imp;
use super::page_size;
use crate::utils::{align_down, align_up};

fn overflow(operation: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{operation}: address range overflows"),
    )
}

/// Reserve `size` bytes of address space without physical backing.
///
/// The size is rounded up to whole pages. Reading or writing the range
/// faults until it is committed. A `hint` is passed to the OS as a placement
/// request only; compare the returned address against it when exact placement
/// matters.
pub fn reserve(hint: Option<NonNull<u8>>, size: usize) -> io::Result<NonNull<u8>> {
    if size == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot reserve zero bytes",
        ));
    }
    let len = size
        .checked_next_multiple_of(page_size())
        .ok_or_else(|| overflow("reserve"))?;
    let hint = hint.map_or(std::ptr::null_mut(), NonNull::as_ptr);

    let ptr = imp::reserve_pages(hint, len)?;

    #[cfg(feature = "logging")]
    trace!(address = ptr as usize, len, "reserved address space");

    NonNull::new(ptr)
        .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "reserve returned null"))
}

/// Grant read/write access to every page overlapping `[ptr, ptr + size)`.
///
/// The range is widened to page boundaries before the OS call. Pages that
/// were never committed read as zero; pages already committed keep their
/// contents. A zero-sized request does nothing.
///
/// # Safety
///
/// The widened range must lie inside a live reservation from [`reserve`].
pub unsafe fn commit(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    if size == 0 {
        return Ok(());
    }
    let page = page_size();
    let addr = ptr.as_ptr().addr();
    let end = addr.checked_add(size).ok_or_else(|| overflow("commit"))?;
    let begin = align_down(addr, page);
    let end = end
        .checked_next_multiple_of(page)
        .ok_or_else(|| overflow("commit"))?;

    #[cfg(feature = "logging")]
    trace!(begin, len = end - begin, "committing pages");

    // SAFETY: [begin, end) covers the caller's range rounded to pages, which
    // the caller guarantees is part of a reservation.
    unsafe { imp::commit_pages(ptr.as_ptr().with_addr(begin), end - begin) }
}

/// Revoke physical backing of every page lying fully inside
/// `[ptr, ptr + size)`.
///
/// The range is narrowed to page boundaries so partially covered pages at
/// either edge stay committed. The address range remains reserved, and a
/// later [`commit`] observes zeroed pages.
///
/// # Safety
///
/// The range must lie inside a live reservation and no live reference may
/// point into the pages being dropped.
pub unsafe fn decommit(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    let page = page_size();
    let addr = ptr.as_ptr().addr();
    let end = addr.checked_add(size).ok_or_else(|| overflow("decommit"))?;
    let begin = align_up(addr, page);
    let end = align_down(end, page);
    if end <= begin {
        return Ok(());
    }

    #[cfg(feature = "logging")]
    trace!(begin, len = end - begin, "decommitting pages");

    // SAFETY: [begin, end) is a page-aligned sub-range of the caller's range.
    unsafe { imp::decommit_pages(ptr.as_ptr().with_addr(begin), end - begin) }
}

/// Return a reservation of `size` bytes starting at `ptr` to the OS.
///
/// # Safety
///
/// `ptr` must be the address returned by [`reserve`] for a reservation of
/// `size` bytes, and nothing may touch the range afterwards.
pub unsafe fn release(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    let len = size
        .checked_next_multiple_of(page_size())
        .ok_or_else(|| overflow("release"))?;

    #[cfg(feature = "logging")]
    trace!(address = ptr.as_ptr().addr(), len, "releasing address space");

    // SAFETY: forwarded caller contract.
    unsafe { imp::release_pages(ptr.as_ptr(), len) }
}
