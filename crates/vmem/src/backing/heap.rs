//! Direct heap allocation strategy

use std::io;
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::RegionBacking;
use crate::error::{MemoryError, MemoryResult};
use crate::syscalls;

/// Source of zeroed heap blocks
pub trait HeapProvider {
    /// Allocate `size` zeroed bytes.
    fn alloc(size: usize) -> io::Result<NonNull<u8>>;

    /// Free a block returned by [`alloc`](Self::alloc).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `alloc` and must not be used afterwards.
    unsafe fn free(ptr: NonNull<u8>);
}

/// Blocks from the Rust global allocator
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessHeap;

impl HeapProvider for ProcessHeap {
    #[inline]
    fn alloc(size: usize) -> io::Result<NonNull<u8>> {
        syscalls::heap_alloc(size)
    }

    #[inline]
    unsafe fn free(ptr: NonNull<u8>) {
        // SAFETY: forwarded caller contract.
        unsafe { syscalls::heap_free(ptr) }
    }
}

/// One heap block sized to the arena capacity; nothing is committed lazily
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAlloc<H = ProcessHeap>(PhantomData<H>);

impl<H: HeapProvider> RegionBacking for DirectAlloc<H> {
    const NAME: &'static str = "direct-alloc";
    const LAZY_COMMIT: bool = false;

    fn acquire(size: usize) -> MemoryResult<NonNull<u8>> {
        H::alloc(size).map_err(|e| MemoryError::os("heap alloc", size, e))
    }

    #[inline]
    unsafe fn commit(_ptr: NonNull<u8>, _size: usize) -> MemoryResult<()> {
        Ok(())
    }

    #[inline]
    unsafe fn decommit(_ptr: NonNull<u8>, _size: usize) -> MemoryResult<()> {
        Ok(())
    }

    unsafe fn release(ptr: NonNull<u8>, _size: usize) -> MemoryResult<()> {
        // SAFETY: forwarded caller contract.
        unsafe { H::free(ptr) };
        Ok(())
    }
}
