//! Fixed-chunk pool with an intrusive free list
//!
//! # Safety
//!
//! - The pool's block is pushed from an arena and borrowed for `'a`, so it
//!   stays mapped while the pool or any of its chunks is alive
//! - Chunk `i` starts at `start + i * stride` with
//!   `stride = CHUNK_HEADER_SIZE + chunk_size`; the header holds the address
//!   of the next free chunk (null ends the list)
//! - The stride is not rounded, so link headers may be unaligned and are
//!   only accessed with `read_unaligned` / `write_unaligned`
//!
//! ## Invariants
//!
//! - Every free-list entry is a chunk header inside the block, listed once
//! - `free_count` equals the length of the free list
//! - A chunk is either on the free list or held by exactly one `PoolChunk`

use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

use super::{PoolChunk, PoolConfig, PoolStats};
use crate::arena::Arena;
use crate::backing::RegionBacking;
use crate::error::{MemoryError, MemoryResult, fatal};

/// Bytes of link header in front of every chunk
pub const CHUNK_HEADER_SIZE: usize = size_of::<*mut u8>();

/// Pool of equally sized chunks carved from one arena block
///
/// # Memory Layout
/// ```text
/// [hdr|chunk0][hdr|chunk1][hdr|chunk2] ... [hdr|chunkN]
///   |            |            ^
///   +------------|------------+     free list: 0 -> 2 -> null
///                +-- allocated
/// ```
///
/// # Examples
///
/// ```
/// use nebula_vmem::arena::Arena;
/// use nebula_vmem::pool::{Pool, PoolConfig};
///
/// let arena = Arena::new(1 << 20)?;
/// let mut pool = Pool::with_config(&arena, 64, 16, PoolConfig::zeroed())?;
///
/// let mut chunk = pool.alloc(64).expect("pool has free chunks");
/// chunk[0] = 1;
/// pool.free(chunk, 64);
/// assert_eq!(pool.available(), 16);
/// # Ok::<(), nebula_vmem::MemoryError>(())
/// ```
pub struct Pool<'a> {
    /// First chunk header
    start: NonNull<u8>,

    /// Usable bytes per chunk
    chunk_size: usize,

    /// Header plus chunk
    stride: usize,

    /// Total number of chunks
    chunk_count: usize,

    /// Head of the free list, null when exhausted
    free_head: *mut u8,

    /// Length of the free list
    free_count: usize,

    config: PoolConfig,

    total_allocs: u64,
    total_frees: u64,
    exhausted_hits: u64,
    peak_in_use: usize,

    _arena: PhantomData<&'a mut [u8]>,
}

impl<'a> Pool<'a> {
    /// Carve a pool of `chunk_count` chunks of `chunk_size` bytes from
    /// `arena`, with the default configuration.
    ///
    /// Exhausting the arena is fatal; see [`try_new`](Self::try_new).
    #[track_caller]
    pub fn new<B: RegionBacking>(
        arena: &'a Arena<B>,
        chunk_size: usize,
        chunk_count: usize,
    ) -> Self {
        match Self::try_new(arena, chunk_size, chunk_count) {
            Ok(pool) => pool,
            Err(err) => fatal(err),
        }
    }

    /// [`new`](Self::new) that reports errors instead of aborting.
    pub fn try_new<B: RegionBacking>(
        arena: &'a Arena<B>,
        chunk_size: usize,
        chunk_count: usize,
    ) -> MemoryResult<Self> {
        Self::with_config(arena, chunk_size, chunk_count, PoolConfig::default())
    }

    /// Carve a pool with a custom configuration.
    ///
    /// Pushes one block of `chunk_count * (CHUNK_HEADER_SIZE + chunk_size)`
    /// bytes from `arena` and threads every chunk onto the free list in
    /// address order.
    pub fn with_config<B: RegionBacking>(
        arena: &'a Arena<B>,
        chunk_size: usize,
        chunk_count: usize,
        config: PoolConfig,
    ) -> MemoryResult<Self> {
        if chunk_size == 0 {
            return Err(MemoryError::invalid_config("pool chunk size must be non-zero"));
        }
        let stride = chunk_size
            .checked_add(CHUNK_HEADER_SIZE)
            .ok_or_else(|| MemoryError::size_overflow("pool stride"))?;
        let total = stride
            .checked_mul(chunk_count)
            .ok_or_else(|| MemoryError::size_overflow("pool block"))?;

        let block = arena.try_push(total)?;
        let start = NonNull::from(block).cast::<u8>();

        for i in 0..chunk_count {
            let next = if i + 1 < chunk_count {
                // SAFETY: (i + 1) * stride < total, inside the block.
                unsafe { start.add((i + 1) * stride).as_ptr() }
            } else {
                ptr::null_mut()
            };
            // SAFETY: chunk i's header lies inside the block we own.
            unsafe { write_link(start.add(i * stride), next) };
        }

        #[cfg(feature = "logging")]
        debug!(chunk_size, chunk_count, bytes = total, "pool created");

        Ok(Self {
            start,
            chunk_size,
            stride,
            chunk_count,
            free_head: if chunk_count == 0 {
                ptr::null_mut()
            } else {
                start.as_ptr()
            },
            free_count: chunk_count,
            config,
            total_allocs: 0,
            total_frees: 0,
            exhausted_hits: 0,
            peak_in_use: 0,
            _arena: PhantomData,
        })
    }

    /// Take a chunk from the free list.
    ///
    /// `expected_size` must equal the pool's chunk size; a mismatch is
    /// fatal. Returns `None` when every chunk is out, leaving the pool
    /// unchanged. See [`try_alloc`](Self::try_alloc).
    #[track_caller]
    pub fn alloc(&mut self, expected_size: usize) -> Option<PoolChunk<'a>> {
        match self.try_alloc(expected_size) {
            Ok(chunk) => chunk,
            Err(err) => fatal(err),
        }
    }

    /// [`alloc`](Self::alloc) that reports a size mismatch instead of
    /// aborting.
    pub fn try_alloc(&mut self, expected_size: usize) -> MemoryResult<Option<PoolChunk<'a>>> {
        if expected_size != self.chunk_size {
            return Err(MemoryError::chunk_size_mismatch(self.chunk_size, expected_size));
        }

        let Some(header) = NonNull::new(self.free_head) else {
            if self.config.track_stats {
                self.exhausted_hits += 1;
            }
            #[cfg(feature = "logging")]
            warn!(chunk_size = self.chunk_size, chunk_count = self.chunk_count, "pool exhausted");
            return Ok(None);
        };

        // SAFETY: free-list entries are chunk headers inside the block.
        self.free_head = unsafe { read_link(header) };
        self.free_count -= 1;

        // SAFETY: the body follows its header inside the block.
        let body = unsafe { header.add(CHUNK_HEADER_SIZE) };
        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: the body is chunk_size bytes we now own exclusively.
            unsafe { ptr::write_bytes(body.as_ptr(), pattern, self.chunk_size) };
        }

        if self.config.track_stats {
            self.total_allocs += 1;
            self.peak_in_use = self.peak_in_use.max(self.in_use());
        }

        #[cfg(feature = "logging")]
        trace!(address = body.as_ptr().addr(), "pool alloc");

        // SAFETY: the chunk just left the free list, so nobody else holds it.
        Ok(Some(unsafe { PoolChunk::new(body, self.chunk_size) }))
    }

    /// Return a chunk to the front of the free list in O(1).
    ///
    /// `expected_size` must equal the pool's chunk size and the chunk must
    /// come from this pool; anything else is fatal. See
    /// [`try_free`](Self::try_free).
    #[track_caller]
    pub fn free(&mut self, chunk: PoolChunk<'a>, expected_size: usize) {
        if let Err((err, _chunk)) = self.try_free(chunk, expected_size) {
            fatal(err);
        }
    }

    /// [`free`](Self::free) that hands the chunk back with the error instead
    /// of aborting.
    #[allow(clippy::result_large_err)]
    pub fn try_free(
        &mut self,
        chunk: PoolChunk<'a>,
        expected_size: usize,
    ) -> Result<(), (MemoryError, PoolChunk<'a>)> {
        if expected_size != self.chunk_size {
            return Err((
                MemoryError::chunk_size_mismatch(self.chunk_size, expected_size),
                chunk,
            ));
        }
        if !self.owns(chunk.as_ptr()) || chunk.len() != self.chunk_size {
            return Err((MemoryError::foreign_chunk(chunk.as_ptr().addr()), chunk));
        }

        let body = chunk.into_raw();
        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: the handle was the sole owner of chunk_size bytes.
            unsafe { ptr::write_bytes(body.as_ptr(), pattern, self.chunk_size) };
        }

        // SAFETY: owns() proved the header is a chunk header in the block.
        let header = unsafe { body.sub(CHUNK_HEADER_SIZE) };
        // SAFETY: as above.
        unsafe { write_link(header, self.free_head) };
        self.free_head = header.as_ptr();
        self.free_count += 1;

        if self.config.track_stats {
            self.total_frees += 1;
        }

        #[cfg(feature = "logging")]
        trace!(address = body.as_ptr().addr(), "pool free");

        Ok(())
    }

    /// Whether `ptr` is the body start of one of this pool's chunks
    pub fn owns(&self, ptr: *const u8) -> bool {
        let start = self.start.as_ptr().addr() + CHUNK_HEADER_SIZE;
        let Some(offset) = ptr.addr().checked_sub(start) else {
            return false;
        };
        offset < self.stride * self.chunk_count && offset % self.stride == 0
    }

    /// Usable bytes per chunk
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Bytes from one chunk header to the next
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total number of chunks
    #[inline]
    pub fn capacity(&self) -> usize {
        self.chunk_count
    }

    /// Chunks on the free list
    #[inline]
    pub fn available(&self) -> usize {
        self.free_count
    }

    /// Chunks currently handed out
    #[inline]
    pub fn in_use(&self) -> usize {
        self.chunk_count - self.free_count
    }

    /// No chunk left to hand out
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.free_head.is_null()
    }

    /// Configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_allocs: self.total_allocs,
            total_frees: self.total_frees,
            exhausted_hits: self.exhausted_hits,
            peak_in_use: self.peak_in_use,
            in_use: self.in_use(),
            chunk_size: self.chunk_size,
            chunk_count: self.chunk_count,
        }
    }
}

impl fmt::Debug for Pool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_count", &self.chunk_count)
            .field("available", &self.free_count)
            .finish_non_exhaustive()
    }
}

/// # Safety
///
/// `header` must point at a chunk header inside a live pool block.
#[inline]
unsafe fn read_link(header: NonNull<u8>) -> *mut u8 {
    // SAFETY: forwarded caller contract; the header may be unaligned.
    unsafe { header.cast::<*mut u8>().read_unaligned() }
}

/// # Safety
///
/// `header` must point at a chunk header inside a live pool block.
#[inline]
unsafe fn write_link(header: NonNull<u8>, next: *mut u8) {
    // SAFETY: forwarded caller contract; the header may be unaligned.
    unsafe { header.cast::<*mut u8>().write_unaligned(next) }
}
