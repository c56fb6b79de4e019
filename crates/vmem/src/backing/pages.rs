//! Reserve + commit strategy

use std::io;
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::RegionBacking;
use crate::error::{MemoryError, MemoryResult};
use crate::syscalls;

/// Source of reservable, committable pages
///
/// All four operations are required, so a provider cannot be half
/// configured.
pub trait PageProvider {
    /// Reserve address space without backing. See [`syscalls::reserve`].
    fn reserve(hint: Option<NonNull<u8>>, size: usize) -> io::Result<NonNull<u8>>;

    /// Back pages overlapping the range. See [`syscalls::commit`].
    ///
    /// # Safety
    ///
    /// The range must lie inside a live reservation.
    unsafe fn commit(ptr: NonNull<u8>, size: usize) -> io::Result<()>;

    /// Drop backing of pages inside the range. See [`syscalls::decommit`].
    ///
    /// # Safety
    ///
    /// The range must lie inside a live reservation and hold no live
    /// references.
    unsafe fn decommit(ptr: NonNull<u8>, size: usize) -> io::Result<()>;

    /// Return a reservation. See [`syscalls::release`].
    ///
    /// # Safety
    ///
    /// `ptr`/`size` must describe one reservation that is never used again.
    unsafe fn release(ptr: NonNull<u8>, size: usize) -> io::Result<()>;
}

/// Pages from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsPages;

impl PageProvider for OsPages {
    #[inline]
    fn reserve(hint: Option<NonNull<u8>>, size: usize) -> io::Result<NonNull<u8>> {
        syscalls::reserve(hint, size)
    }

    #[inline]
    unsafe fn commit(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
        // SAFETY: forwarded caller contract.
        unsafe { syscalls::commit(ptr, size) }
    }

    #[inline]
    unsafe fn decommit(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
        // SAFETY: forwarded caller contract.
        unsafe { syscalls::decommit(ptr, size) }
    }

    #[inline]
    unsafe fn release(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
        // SAFETY: forwarded caller contract.
        unsafe { syscalls::release(ptr, size) }
    }
}

/// Reserve the whole capacity once, commit lazily, decommit and release on
/// teardown
#[derive(Debug, Clone, Copy, Default)]
pub struct ReserveCommit<P = OsPages>(PhantomData<P>);

impl<P: PageProvider> RegionBacking for ReserveCommit<P> {
    const NAME: &'static str = "reserve-commit";
    const LAZY_COMMIT: bool = true;

    fn acquire(size: usize) -> MemoryResult<NonNull<u8>> {
        P::reserve(None, size).map_err(|e| MemoryError::os("reserve", size, e))
    }

    unsafe fn commit(ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        // SAFETY: forwarded caller contract.
        unsafe { P::commit(ptr, size) }.map_err(|e| MemoryError::os("commit", size, e))
    }

    unsafe fn decommit(ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        // SAFETY: forwarded caller contract.
        unsafe { P::decommit(ptr, size) }.map_err(|e| MemoryError::os("decommit", size, e))
    }

    unsafe fn release(ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        // SAFETY: forwarded caller contract; the region is dead, so dropping
        // its pages first is allowed.
        unsafe {
            P::decommit(ptr, size).map_err(|e| MemoryError::os("decommit", size, e))?;
            P::release(ptr, size).map_err(|e| MemoryError::os("release", size, e))
        }
    }
}
