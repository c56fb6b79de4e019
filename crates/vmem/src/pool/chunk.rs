//! Handle to an allocated pool chunk

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

/// Exclusive handle to one allocated chunk
///
/// Move-only: giving it back to [`Pool::free`](super::Pool::free) consumes
/// it, so a chunk cannot be freed twice through safe code. Dropping the
/// handle without freeing leaks the chunk until the arena behind the pool is
/// reset. Derefs to the chunk's bytes.
pub struct PoolChunk<'a> {
    ptr: NonNull<u8>,
    len: usize,
    _arena: PhantomData<&'a mut [u8]>,
}

impl<'a> PoolChunk<'a> {
    /// # Safety
    ///
    /// `ptr..ptr + len` must be a chunk body exclusively owned by the caller.
    #[inline]
    pub(super) unsafe fn new(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            ptr,
            len,
            _arena: PhantomData,
        }
    }

    /// Rebuild a handle from [`into_raw`](Self::into_raw).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` on a chunk of `len` bytes from a pool
    /// whose arena outlives `'a`, and no other handle to that chunk may
    /// exist.
    #[inline]
    pub unsafe fn from_raw(ptr: NonNull<u8>, len: usize) -> Self {
        // SAFETY: forwarded caller contract.
        unsafe { Self::new(ptr, len) }
    }

    /// Give up the handle, keeping the chunk allocated.
    #[inline]
    pub fn into_raw(self) -> NonNull<u8> {
        self.ptr
    }

    /// Start of the chunk body
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Start of the chunk body
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Chunk size in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for chunks from a pool; chunk sizes are non-zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Deref for PoolChunk<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        // SAFETY: the handle exclusively owns `len` initialized bytes at ptr
        // for as long as the arena lives.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for PoolChunk<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in deref; &mut self gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl fmt::Debug for PoolChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolChunk")
            .field("address", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
