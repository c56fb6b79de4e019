//! Targets without a virtual memory API
//!
//! Only the heap strategy works here; every page operation reports
//! `Unsupported`.

use std::io;

fn unsupported(operation: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{operation} is not supported on this platform"),
    )
}

pub(super) fn query_page_size() -> usize {
    4096
}

pub(super) fn reserve_pages(_hint: *mut u8, _len: usize) -> io::Result<*mut u8> {
    Err(unsupported("reserve"))
}

pub(super) unsafe fn commit_pages(_ptr: *mut u8, _len: usize) -> io::Result<()> {
    Err(unsupported("commit"))
}

pub(super) unsafe fn decommit_pages(_ptr: *mut u8, _len: usize) -> io::Result<()> {
    Err(unsupported("decommit"))
}

pub(super) unsafe fn release_pages(_ptr: *mut u8, _len: usize) -> io::Result<()> {
    Err(unsupported("release"))
}
