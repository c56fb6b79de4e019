//! VirtualAlloc / VirtualFree backend

use std::io;
use std::ptr;

use winapi::ctypes::c_void;
use winapi::um::memoryapi::{VirtualAlloc, VirtualFree};
use winapi::um::sysinfoapi::{GetSystemInfo, SYSTEM_INFO};
use winapi::um::winnt::{
    MEM_COMMIT, MEM_DECOMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_NOACCESS, PAGE_READWRITE,
};

pub(super) fn query_page_size() -> usize {
    // SAFETY: GetSystemInfo fills a caller-provided SYSTEM_INFO; the all-zero
    // bit pattern is a valid SYSTEM_INFO.
    unsafe {
        let mut info: SYSTEM_INFO = std::mem::zeroed();
        GetSystemInfo(&raw mut info);
        info.dwPageSize as usize
    }
}

pub(super) fn reserve_pages(hint: *mut u8, len: usize) -> io::Result<*mut u8> {
    // SAFETY: MEM_RESERVE never touches existing allocations; a hint that is
    // already taken makes the call fail instead.
    let mut ptr = unsafe { VirtualAlloc(hint.cast::<c_void>(), len, MEM_RESERVE, PAGE_NOACCESS) };
    if ptr.is_null() && !hint.is_null() {
        // SAFETY: same call without a placement request.
        ptr = unsafe { VirtualAlloc(ptr::null_mut(), len, MEM_RESERVE, PAGE_NOACCESS) };
    }
    if ptr.is_null() {
        Err(io::Error::last_os_error())
    } else {
        Ok(ptr.cast::<u8>())
    }
}

/// # Safety
///
/// `[ptr, ptr + len)` must be page-aligned and inside a live reservation.
pub(super) unsafe fn commit_pages(ptr: *mut u8, len: usize) -> io::Result<()> {
    // SAFETY: committing already committed pages is a no-op that keeps their
    // contents; fresh pages are zero-filled by the OS.
    let result = unsafe { VirtualAlloc(ptr.cast::<c_void>(), len, MEM_COMMIT, PAGE_READWRITE) };
    if result.is_null() {
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
    // SAFETY: MEM_DECOMMIT keeps the range reserved and drops its pages.
    let result = unsafe { VirtualFree(ptr.cast::<c_void>(), len, MEM_DECOMMIT) };
    if result == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// # Safety
///
/// `ptr` must start a reservation that is not used afterwards.
pub(super) unsafe fn release_pages(ptr: *mut u8, _len: usize) -> io::Result<()> {
    // SAFETY: MEM_RELEASE requires size 0 and the reservation base, which the
    // caller guarantees.
    let result = unsafe { VirtualFree(ptr.cast::<c_void>(), 0, MEM_RELEASE) };
    if result == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
