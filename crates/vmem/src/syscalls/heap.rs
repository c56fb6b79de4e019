//! Heap fallback
//!
//! Used by builds that do not want the reserve/commit strategy. Blocks come
//! from the Rust global allocator, zero-filled. The block length is stored in
//! a hidden prefix so [`heap_free`] only needs the pointer.

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::io;
use std::ptr::NonNull;

/// Size of the hidden length prefix; also the alignment of returned blocks.
const PREFIX: usize = 16;

/// Allocate `size` zeroed bytes from the process heap.
///
/// The returned pointer is 16-byte aligned.
pub fn heap_alloc(size: usize) -> io::Result<NonNull<u8>> {
    let total = size
        .checked_add(PREFIX)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "heap block size overflows"))?;
    let layout = Layout::from_size_align(total, PREFIX)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: layout has non-zero size (at least PREFIX bytes).
    let base = unsafe { alloc_zeroed(layout) };
    let base = NonNull::new(base)
        .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "heap allocation failed"))?;

    // SAFETY: the block is at least PREFIX bytes and PREFIX-aligned, so the
    // length fits at its start and the body starts PREFIX bytes in.
    unsafe {
        base.cast::<usize>().write(total);
        Ok(base.add(PREFIX))
    }
}

/// Free a block returned by [`heap_alloc`].
///
/// # Safety
///
/// `ptr` must come from [`heap_alloc`] and must not be used or freed again.
pub unsafe fn heap_free(ptr: NonNull<u8>) {
    // SAFETY: heap_alloc placed the block length PREFIX bytes before ptr and
    // allocated with exactly this layout.
    unsafe {
        let base = ptr.sub(PREFIX);
        let total = base.cast::<usize>().read();
        dealloc(base.as_ptr(), Layout::from_size_align_unchecked(total, PREFIX));
    }
}
