//! mmap / mprotect backend
//!
//! Reserving maps anonymous `PROT_NONE` pages: the kernel hands out address
//! space but any access faults. Committing flips the pages to read/write and
//! the kernel backs them with zero pages on first touch.

use std::io;

use libc::{
    MAP_ANONYMOUS, MAP_FAILED, MAP_FIXED, MAP_PRIVATE, PROT_NONE, PROT_READ, PROT_WRITE, c_void,
};

#[cfg(any(target_os = "linux", target_os = "android"))]
const RESERVE_FLAGS: libc::c_int = MAP_PRIVATE | MAP_ANONYMOUS | libc::MAP_NORESERVE;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const RESERVE_FLAGS: libc::c_int = MAP_PRIVATE | MAP_ANONYMOUS;

pub(super) fn query_page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions. _SC_PAGESIZE is
    // always supported; a negative result is mapped to the common default.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as usize } else { 4096 }
}

pub(super) fn reserve_pages(hint: *mut u8, len: usize) -> io::Result<*mut u8> {
    // SAFETY: anonymous mapping without MAP_FIXED. The hint is only a
    // placement request, the kernel never replaces an existing mapping.
    let ptr = unsafe { libc::mmap(hint.cast::<c_void>(), len, PROT_NONE, RESERVE_FLAGS, -1, 0) };
    if ptr == MAP_FAILED {
        Err(io::Error::last_os_error())
    } else {
        Ok(ptr.cast::<u8>())
    }
}

/// # Safety
///
/// `[ptr, ptr + len)` must be page-aligned and inside a live reservation.
pub(super) unsafe fn commit_pages(ptr: *mut u8, len: usize) -> io::Result<()> {
    // SAFETY: caller guarantees the range is a page-aligned part of our own
    // reservation. Widening protection never invalidates existing data.
    let rc = unsafe { libc::mprotect(ptr.cast::<c_void>(), len, PROT_READ | PROT_WRITE) };
    if rc == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// # Safety
///
/// `[ptr, ptr + len)` must be page-aligned, inside a live reservation, and
/// hold no live references.
pub(super) unsafe fn decommit_pages(ptr: *mut u8, len: usize) -> io::Result<()> {
    // Mapping fresh PROT_NONE pages over the range drops the physical pages
    // and guarantees a later commit observes zeroes on every unix.
    // SAFETY: MAP_FIXED over a range the caller owns; nothing else can be
    // mapped there since it is part of our reservation.
    let remapped = unsafe {
        libc::mmap(
            ptr.cast::<c_void>(),
            len,
            PROT_NONE,
            RESERVE_FLAGS | MAP_FIXED,
            -1,
            0,
        )
    };
    if remapped == MAP_FAILED {
        Err(io::Error::last_os_error())
    } else {
        debug_assert_eq!(remapped.cast::<u8>(), ptr);
        Ok(())
    }
}

/// # Safety
///
/// `ptr` must start a reservation of `len` bytes that is not used afterwards.
pub(super) unsafe fn release_pages(ptr: *mut u8, len: usize) -> io::Result<()> {
    // SAFETY: caller guarantees the range came from reserve_pages and is dead.
    let rc = unsafe { libc::munmap(ptr.cast::<c_void>(), len) };
    if rc == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
