//! Fixed-capacity bump arena over one backing region
//!
//! # Safety
//!
//! This module implements a single-threaded bump arena whose bookkeeping
//! lives inside the memory it manages:
//! - The `ArenaHeader` sits at offset zero of the region; usable bytes
//!   start right after it
//! - Cursors are `Cell<usize>` offsets from the header, so allocation works
//!   through `&self`
//! - Reclaiming (`pop_to`, `pop_by`, `clear`) takes `&mut self`, so no slice
//!   handed out earlier can still be alive when its bytes are reused
//! - A sub-arena is a second header carved out of the parent's region; it
//!   borrows the parent, so the parent cannot pop or drop while it lives
//!
//! ## Invariants
//!
//! - `HEADER <= position <= committed_end <= end`
//! - `[position, committed_end)` is committed and reads as zero unless the
//!   arena was cleared
//! - Every offset in `[carve_floor, committed_end)` may be uncommitted; this
//!   stretch only ever lies below `position` and is committed again before
//!   any pop or clear hands it out
//!
//! ## Memory Management
//!
//! - The region comes from the arena's [`RegionBacking`]
//! - Under a lazy backing, pages are committed as `position` first crosses
//!   them and `committed_end` never moves back before teardown
//! - A pop over a carved stretch swaps its whole pages for fresh zero pages
//!   instead of writing them, so untouched carve space stays unbacked
//! - Only the arena that acquired the region releases it

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::NonNull;
use std::slice;

#[cfg(feature = "logging")]
use tracing::{debug, error, trace};

use super::scope::ArenaGuard;
use super::stats::ArenaStats;
use crate::backing::{DefaultBacking, RegionBacking};
use crate::error::{MemoryError, MemoryResult, fatal};
use crate::syscalls;
use crate::units::DEFAULT_ARENA_SIZE;
use crate::utils::{align_down, align_up, checked_align_up, is_power_of_two};

/// Marks an arena with no possibly-uncommitted stretch.
const NO_FLOOR: usize = usize::MAX;

/// Bookkeeping stored at the start of every arena region
#[repr(C)]
struct ArenaHeader {
    /// Next free offset
    position: Cell<usize>,
    /// Everything below this offset has been committed (see `carve_floor`)
    committed_end: Cell<usize>,
    /// Lowest offset advanced over without committing, or `NO_FLOOR`
    carve_floor: Cell<usize>,
    /// One past the last usable offset; also the total region size
    end: usize,
    #[cfg(feature = "diagnostics")]
    depth: u32,
    #[cfg(feature = "diagnostics")]
    commit_amount: Cell<usize>,
}

impl ArenaHeader {
    #[cfg_attr(not(feature = "diagnostics"), allow(unused_variables))]
    fn new(end: usize, depth: u32, committed: usize) -> Self {
        Self {
            position: Cell::new(ARENA_HEADER_SIZE),
            committed_end: Cell::new(ARENA_HEADER_SIZE),
            carve_floor: Cell::new(NO_FLOOR),
            end,
            #[cfg(feature = "diagnostics")]
            depth,
            #[cfg(feature = "diagnostics")]
            commit_amount: Cell::new(committed),
        }
    }
}

/// Bytes taken by the in-region header of every arena and sub-arena
pub const ARENA_HEADER_SIZE: usize = size_of::<ArenaHeader>();

const HEADER_ALIGN: usize = align_of::<ArenaHeader>();

/// Position marker for arena state
///
/// Captured with [`Arena::current_position`] or [`Arena::position_of`] and
/// consumed by [`Arena::pop_to`]. A position remembers which arena it came
/// from; handing it to another arena is rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Offset from the arena header
    offset: usize,
    /// Header address, to verify arena identity
    arena: usize,
}

impl Position {
    /// Bytes in use when this position was captured
    #[inline]
    pub const fn used(&self) -> usize {
        self.offset - ARENA_HEADER_SIZE
    }
}

/// Fixed-capacity bump arena
///
/// Allocation moves a cursor forward; memory is only reclaimed by rewinding
/// that cursor. The capacity is fixed at creation and never grows. Fresh
/// bytes always read as zero, except after [`clear`](Self::clear).
///
/// # Examples
///
/// ```
/// use nebula_vmem::arena::Arena;
///
/// let mut arena = Arena::new(64 * 1024)?;
/// let mark = arena.current_position();
///
/// let bytes = arena.push(128);
/// assert!(bytes.iter().all(|&b| b == 0));
/// bytes[0] = 7;
///
/// arena.pop_to(mark);
/// assert_eq!(arena.used(), 0);
/// # Ok::<(), nebula_vmem::MemoryError>(())
/// ```
pub struct Arena<B: RegionBacking = DefaultBacking> {
    header: NonNull<ArenaHeader>,
    /// Only the arena that acquired the region releases it
    owned: bool,
    _backing: PhantomData<fn() -> B>,
}

// SAFETY: An owned arena is the only handle to its region and the Cell
// cursors are only reached through it, so moving it to another thread moves
// all access with it. Non-owning views exist only inside `SubArena`, which
// borrows the parent and is therefore !Send. Arena stays !Sync.
unsafe impl<B: RegionBacking> Send for Arena<B> {}

impl Arena {
    /// Create an arena with `capacity` usable bytes on the default backing.
    ///
    /// Under reserve/commit this reserves `capacity` plus the header and
    /// commits only the header.
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_backing(capacity)
    }

    /// Create an arena of [`DEFAULT_ARENA_SIZE`] bytes on the default
    /// backing.
    pub fn with_default_capacity() -> MemoryResult<Self> {
        Self::new(DEFAULT_ARENA_SIZE)
    }
}

impl<B: RegionBacking> Arena<B> {
    /// Create an arena with `capacity` usable bytes on backing `B`.
    pub fn with_backing(capacity: usize) -> MemoryResult<Self> {
        let total = capacity
            .checked_add(ARENA_HEADER_SIZE)
            .ok_or_else(|| MemoryError::size_overflow("arena capacity"))?;
        let region = B::acquire(total)?;

        if B::LAZY_COMMIT {
            // SAFETY: the region was just acquired with at least `total`
            // bytes, which covers the header.
            if let Err(err) = unsafe { B::commit(region, ARENA_HEADER_SIZE) } {
                // SAFETY: nothing has touched the region yet.
                let _ = unsafe { B::release(region, total) };
                return Err(err);
            }
        }

        let header = region.cast::<ArenaHeader>();
        // SAFETY: The region start is page aligned (reserve) or 16-byte
        // aligned (heap), which satisfies HEADER_ALIGN, and its first
        // ARENA_HEADER_SIZE bytes are committed.
        unsafe { header.write(ArenaHeader::new(total, 0, ARENA_HEADER_SIZE)) };

        #[cfg(feature = "logging")]
        debug!(backing = B::NAME, capacity, address = region.as_ptr().addr(), "arena created");

        Ok(Self {
            header,
            owned: true,
            _backing: PhantomData,
        })
    }

    #[inline]
    fn header(&self) -> &ArenaHeader {
        // SAFETY: the header is initialized at creation and lives as long as
        // the region, which outlives self.
        unsafe { self.header.as_ref() }
    }

    /// Pointer `offset` bytes past the header start.
    #[inline]
    fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.header().end);
        // SAFETY: offset never exceeds `end`, so the result stays inside (or
        // one past) this arena's span of the region.
        unsafe { self.header.cast::<u8>().add(offset) }
    }

    #[inline]
    fn debug_check(&self) {
        let h = self.header();
        debug_assert!(ARENA_HEADER_SIZE <= h.position.get());
        debug_assert!(h.position.get() <= h.committed_end.get());
        debug_assert!(h.committed_end.get() <= h.end);
    }

    /// Commit `[from, to)` of this arena's span.
    fn commit_range(&self, from: usize, to: usize) -> MemoryResult<()> {
        if !B::LAZY_COMMIT || to <= from {
            return Ok(());
        }
        // SAFETY: [from, to) lies inside this arena's span, which lies
        // inside the region acquired from B.
        unsafe { B::commit(self.ptr_at(from), to - from)? };

        #[cfg(feature = "diagnostics")]
        {
            let h = self.header();
            h.commit_amount.set(h.commit_amount.get() + (to - from));
        }
        Ok(())
    }

    /// Record that `[from, ..)` was advanced over without committing.
    #[inline]
    fn lower_floor(&self, from: usize) {
        let h = self.header();
        h.carve_floor.set(h.carve_floor.get().min(from));
    }

    /// Offsets `[start, start + size)` for the next allocation.
    fn next_span(&self, start: usize, size: usize, operation: &'static str) -> MemoryResult<usize> {
        let h = self.header();
        let new = start
            .checked_add(size)
            .ok_or_else(|| MemoryError::size_overflow(operation))?;
        if new > h.end {
            let position = h.position.get();
            return Err(MemoryError::arena_exhausted(new - position, h.end - position));
        }
        Ok(new)
    }

    // ------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------

    /// Allocate `size` zero-filled bytes.
    ///
    /// Commits just the pages the new bytes cross that were not committed
    /// before. Exhausting the arena is fatal; see [`try_push`](Self::try_push).
    #[inline]
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push(&self, size: usize) -> &mut [u8] {
        match self.try_push(size) {
            Ok(bytes) => bytes,
            Err(err) => fatal(err),
        }
    }

    /// [`push`](Self::push) that reports exhaustion and OS failures instead
    /// of aborting. On error the arena is unchanged.
    #[allow(clippy::mut_from_ref)]
    pub fn try_push(&self, size: usize) -> MemoryResult<&mut [u8]> {
        let h = self.header();
        let start = h.position.get();
        let new = self.next_span(start, size, "arena push")?;

        let committed = h.committed_end.get();
        if new > committed {
            self.commit_range(committed, new)?;
            h.committed_end.set(new);
        }
        h.position.set(new);
        self.debug_check();

        #[cfg(feature = "logging")]
        trace!(offset = start, size, "arena push");

        // SAFETY: [start, new) is committed and inside the span. It was below
        // no earlier allocation that is still alive: positions only move back
        // through &mut self, which ends every borrow handed out before.
        Ok(unsafe { slice::from_raw_parts_mut(self.ptr_at(start).as_ptr(), size) })
    }

    /// Allocate `size` bytes starting at an address aligned to `align`.
    ///
    /// Padding bytes are consumed from the arena and count towards
    /// [`used`](Self::used).
    #[allow(clippy::mut_from_ref)]
    pub fn try_push_aligned(&self, size: usize, align: usize) -> MemoryResult<&mut [u8]> {
        if !is_power_of_two(align) {
            return Err(MemoryError::invalid_config(format!(
                "alignment {align} is not a power of two"
            )));
        }
        let addr = self.ptr_at(self.header().position.get()).as_ptr().addr();
        let padding = checked_align_up(addr, align, "arena push aligned")? - addr;
        let total = padding
            .checked_add(size)
            .ok_or_else(|| MemoryError::size_overflow("arena push aligned"))?;

        let bytes = self.try_push(total)?;
        Ok(&mut bytes[padding..])
    }

    /// Copy `src` into freshly pushed bytes.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_copy(&self, src: &[u8]) -> &mut [u8] {
        let dst = self.push(src.len());
        syscalls::copy(dst, src);
        dst
    }

    /// Move a plain value into the arena.
    ///
    /// The value is never dropped; the arena only ever forgets bytes.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T: Copy>(&self, value: T) -> MemoryResult<&mut T> {
        let bytes = self.try_push_aligned(size_of::<T>(), align_of::<T>())?;
        let ptr = bytes.as_mut_ptr().cast::<T>();
        // SAFETY: bytes is exactly size_of::<T>() long, aligned for T and
        // exclusively ours.
        unsafe {
            ptr.write(value);
            Ok(&mut *ptr)
        }
    }

    /// Copy a slice of plain values into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice<T: Copy>(&self, src: &[T]) -> MemoryResult<&mut [T]> {
        let size = size_of_val(src);
        let bytes = self.try_push_aligned(size, align_of::<T>())?;
        let ptr = bytes.as_mut_ptr().cast::<T>();
        // SAFETY: bytes covers src.len() aligned, exclusively owned T slots
        // and cannot overlap src, which lives outside the fresh range.
        unsafe {
            ptr.copy_from_nonoverlapping(src.as_ptr(), src.len());
            Ok(slice::from_raw_parts_mut(ptr, src.len()))
        }
    }

    /// Advance the cursor by `size` bytes without committing anything.
    ///
    /// For callers that know the range is already committed, typically
    /// because it was pushed and popped before. The bytes are only reachable
    /// through the returned pointer; reading or writing uncommitted pages
    /// faults. Exhausting the arena is fatal; see
    /// [`try_place`](Self::try_place).
    #[track_caller]
    pub fn place(&self, size: usize) -> NonNull<u8> {
        match self.try_place(size) {
            Ok(ptr) => ptr,
            Err(err) => fatal(err),
        }
    }

    /// [`place`](Self::place) that reports exhaustion instead of aborting.
    pub fn try_place(&self, size: usize) -> MemoryResult<NonNull<u8>> {
        let h = self.header();
        let start = h.position.get();
        let new = self.next_span(start, size, "arena place")?;

        let committed = h.committed_end.get();
        if new > committed {
            self.lower_floor(committed);
            h.committed_end.set(new);
        }
        h.position.set(new);
        self.debug_check();

        Ok(self.ptr_at(start))
    }

    /// Carve a nested arena with `size` usable bytes out of this one.
    ///
    /// The parent advances by the child's header plus `size` (plus at most a
    /// few bytes aligning the child header). Only the child header is
    /// committed; the child commits its own bytes as it grows. The child
    /// borrows the parent, so the parent can keep allocating but cannot
    /// rewind or be dropped until the child is gone. Exhaustion is fatal;
    /// see [`try_subarena`](Self::try_subarena).
    #[track_caller]
    pub fn subarena(&self, size: usize) -> SubArena<'_, B> {
        match self.try_subarena(size) {
            Ok(sub) => sub,
            Err(err) => fatal(err),
        }
    }

    /// [`subarena`](Self::subarena) that reports exhaustion and OS failures
    /// instead of aborting. On error the parent is unchanged.
    pub fn try_subarena(&self, size: usize) -> MemoryResult<SubArena<'_, B>> {
        let h = self.header();
        let position = h.position.get();
        let start = checked_align_up(position, HEADER_ALIGN, "subarena carve")?;
        let span = size
            .checked_add(ARENA_HEADER_SIZE)
            .ok_or_else(|| MemoryError::size_overflow("subarena carve"))?;
        let new = self.next_span(start, span, "subarena carve")?;

        self.commit_range(start, start + ARENA_HEADER_SIZE)?;
        let committed = h.committed_end.get();
        if new > committed {
            self.lower_floor(committed);
            h.committed_end.set(new);
        }
        h.position.set(new);
        self.debug_check();

        let child = self.ptr_at(start).cast::<ArenaHeader>();
        #[cfg(feature = "diagnostics")]
        let depth = h.depth + 1;
        #[cfg(not(feature = "diagnostics"))]
        let depth = 0;
        // SAFETY: `start` is HEADER_ALIGN aligned relative to a HEADER_ALIGN
        // aligned header, the header bytes were just committed, and the
        // carved range belongs to nobody else.
        unsafe { child.write(ArenaHeader::new(span, depth, 0)) };

        #[cfg(feature = "logging")]
        debug!(offset = start, size, depth, "subarena carved");

        Ok(SubArena {
            arena: Arena {
                header: child,
                owned: false,
                _backing: PhantomData,
            },
            _parent: PhantomData,
        })
    }

    // ------------------------------------------------------------------
    // Positions and reclaiming
    // ------------------------------------------------------------------

    /// Current cursor, for a later [`pop_to`](Self::pop_to)
    #[inline]
    pub fn current_position(&self) -> Position {
        Position {
            offset: self.header().position.get(),
            arena: self.header.as_ptr().addr(),
        }
    }

    /// Position of an address previously returned by this arena.
    ///
    /// Popping to it releases that allocation and everything after it.
    pub fn position_of(&self, ptr: *const u8) -> MemoryResult<Position> {
        let h = self.header();
        let offset = ptr.addr().wrapping_sub(self.header.as_ptr().addr());
        if !(ARENA_HEADER_SIZE..=h.end).contains(&offset) {
            return Err(MemoryError::ForeignPosition);
        }
        let position = h.position.get();
        if offset > position {
            return Err(MemoryError::invalid_pop(
                offset - ARENA_HEADER_SIZE,
                position - ARENA_HEADER_SIZE,
            ));
        }
        Ok(Position {
            offset,
            arena: self.header.as_ptr().addr(),
        })
    }

    /// Rewind to `position`, zero-filling everything released.
    ///
    /// A position ahead of the cursor or from another arena is fatal; see
    /// [`try_pop_to`](Self::try_pop_to).
    #[track_caller]
    pub fn pop_to(&mut self, position: Position) {
        if let Err(err) = self.try_pop_to(position) {
            fatal(err);
        }
    }

    /// [`pop_to`](Self::pop_to) that reports bad positions instead of
    /// aborting. On error the arena is unchanged.
    pub fn try_pop_to(&mut self, position: Position) -> MemoryResult<()> {
        if position.arena != self.header.as_ptr().addr() {
            return Err(MemoryError::ForeignPosition);
        }
        let current = self.header().position.get();
        if position.offset > current {
            return Err(MemoryError::invalid_pop(
                position.used(),
                current - ARENA_HEADER_SIZE,
            ));
        }
        self.rewind(position.offset)
    }

    /// Rewind by `amount` bytes, zero-filling them.
    ///
    /// Popping more than is in use is fatal; see
    /// [`try_pop_by`](Self::try_pop_by).
    #[track_caller]
    pub fn pop_by(&mut self, amount: usize) {
        if let Err(err) = self.try_pop_by(amount) {
            fatal(err);
        }
    }

    /// [`pop_by`](Self::pop_by) that reports underflow instead of aborting.
    pub fn try_pop_by(&mut self, amount: usize) -> MemoryResult<()> {
        let used = self.used();
        if amount > used {
            return Err(MemoryError::pop_underflow(amount, used));
        }
        self.rewind(self.header().position.get() - amount)
    }

    fn rewind(&mut self, offset: usize) -> MemoryResult<()> {
        let h = self.header();
        let current = h.position.get();
        if offset == current {
            return Ok(());
        }

        let floor = h.carve_floor.get();
        let stretch = if floor < current {
            offset.max(floor)
        } else {
            current
        };
        if stretch < current {
            self.reset_stretch(stretch, current)?;
            if offset <= floor {
                h.carve_floor.set(NO_FLOOR);
            }
        }
        // Everything below the floor is committed.
        self.zero_range(offset, stretch);
        h.position.set(offset);
        self.debug_check();

        #[cfg(feature = "logging")]
        trace!(from = current, to = offset, "arena pop");

        Ok(())
    }

    /// Return `[from, to)`, which may hold uncommitted pages, as committed
    /// zeroed memory.
    ///
    /// Whole pages are decommitted and committed again rather than written,
    /// so a carve the child barely touched never gets physical backing. Only
    /// the partial pages at either edge are zero-filled.
    fn reset_stretch(&self, from: usize, to: usize) -> MemoryResult<()> {
        if !B::LAZY_COMMIT {
            self.zero_range(from, to);
            return Ok(());
        }

        let page = syscalls::page_size();
        let base = self.header.as_ptr().addr();
        let inner_start = align_up(base + from, page).min(base + to);
        let inner_end = align_down(base + to, page).max(inner_start);
        let (inner_from, inner_to) = (inner_start - base, inner_end - base);

        if inner_from < inner_to {
            // SAFETY: the whole pages lie inside [from, to), which is below
            // the cursor being rewound and inside this arena's span; `&mut
            // self` on the caller rules out live slices into it.
            unsafe { B::decommit(self.ptr_at(inner_from), inner_to - inner_from)? };
        }
        self.commit_range(from, to)?;
        self.zero_range(from, inner_from);
        self.zero_range(inner_to, to);
        Ok(())
    }

    /// Zero-fill `[from, to)`, which must be committed and not borrowed.
    fn zero_range(&self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        // SAFETY: callers pass committed offsets inside the span while
        // holding `&mut self`, so no slice handed out from it is alive.
        let bytes = unsafe { slice::from_raw_parts_mut(self.ptr_at(from).as_ptr(), to - from) };
        syscalls::zero(bytes);
    }

    /// Rewind to the base without zero-filling.
    ///
    /// Committed pages stay committed. Bytes pushed after a clear may still
    /// hold old data.
    #[track_caller]
    pub fn clear(&mut self) {
        let h = self.header();
        let floor = h.carve_floor.get();
        if floor != NO_FLOOR {
            if let Err(err) = self.commit_range(floor, h.committed_end.get()) {
                fatal(err);
            }
            h.carve_floor.set(NO_FLOOR);
        }
        h.position.set(ARENA_HEADER_SIZE);
        self.debug_check();

        #[cfg(feature = "logging")]
        trace!("arena cleared");
    }

    /// Guard that rewinds to the current position when dropped
    pub fn guard(&mut self) -> ArenaGuard<'_, B> {
        ArenaGuard::new(self)
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Release the region and report OS failures.
    ///
    /// Dropping an arena does the same but treats a failed release as fatal.
    pub fn destroy(self) -> MemoryResult<()> {
        let this = ManuallyDrop::new(self);
        this.release_region()
    }

    fn release_region(&self) -> MemoryResult<()> {
        if !self.owned {
            return Ok(());
        }
        let size = self.header().end;

        #[cfg(feature = "logging")]
        debug!(backing = B::NAME, size, "arena released");

        // SAFETY: An owned arena's header is the start of a region of `end`
        // bytes acquired from B. Callers reach here once, from destroy or
        // drop, and sub-arenas borrowing the region are gone by then.
        unsafe { B::release(self.header.cast(), size) }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// First usable byte; the first push of a fresh arena starts here
    #[inline]
    pub fn base(&self) -> *const u8 {
        self.ptr_at(ARENA_HEADER_SIZE).as_ptr()
    }

    /// Usable bytes, excluding the header
    #[inline]
    pub fn capacity(&self) -> usize {
        self.header().end - ARENA_HEADER_SIZE
    }

    /// Bytes currently handed out
    #[inline]
    pub fn used(&self) -> usize {
        self.header().position.get() - ARENA_HEADER_SIZE
    }

    /// Bytes still available
    #[inline]
    pub fn remaining(&self) -> usize {
        let h = self.header();
        h.end - h.position.get()
    }

    /// Usable bytes below the committed high-water mark
    #[inline]
    pub fn committed(&self) -> usize {
        self.header().committed_end.get() - ARENA_HEADER_SIZE
    }

    /// Nothing handed out
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// Nesting depth: zero for a root arena, parent depth plus one for a
    /// sub-arena
    #[cfg(feature = "diagnostics")]
    #[inline]
    pub fn depth(&self) -> u32 {
        self.header().depth
    }

    /// Bytes this arena has asked its backing to commit, header included
    #[cfg(feature = "diagnostics")]
    #[inline]
    pub fn commit_amount(&self) -> usize {
        self.header().commit_amount.get()
    }

    /// Snapshot of the cursors
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity: self.capacity(),
            used: self.used(),
            committed: self.committed(),
            remaining: self.remaining(),
            #[cfg(feature = "diagnostics")]
            depth: Some(self.depth()),
            #[cfg(not(feature = "diagnostics"))]
            depth: None,
            #[cfg(feature = "diagnostics")]
            commit_amount: Some(self.commit_amount()),
            #[cfg(not(feature = "diagnostics"))]
            commit_amount: None,
        }
    }
}

impl<B: RegionBacking> Drop for Arena<B> {
    fn drop(&mut self) {
        if let Err(err) = self.release_region() {
            if !std::thread::panicking() {
                fatal(err);
            }
            #[cfg(feature = "logging")]
            error!(code = err.code(), "{err}");
        }
    }
}

impl<B: RegionBacking> fmt::Debug for Arena<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("backing", &B::NAME)
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("committed", &self.committed())
            .field("owned", &self.owned)
            .finish()
    }
}

/// Arena carved out of a parent arena
///
/// Derefs to [`Arena`] for allocation and introspection. Rewinding goes
/// through the methods here. Dropping it releases nothing; the parent
/// reclaims the carved bytes by popping past them.
pub struct SubArena<'p, B: RegionBacking = DefaultBacking> {
    arena: Arena<B>,
    _parent: PhantomData<&'p Arena<B>>,
}

impl<B: RegionBacking> SubArena<'_, B> {
    /// See [`Arena::pop_to`]
    #[track_caller]
    pub fn pop_to(&mut self, position: Position) {
        self.arena.pop_to(position);
    }

    /// See [`Arena::try_pop_to`]
    pub fn try_pop_to(&mut self, position: Position) -> MemoryResult<()> {
        self.arena.try_pop_to(position)
    }

    /// See [`Arena::pop_by`]
    #[track_caller]
    pub fn pop_by(&mut self, amount: usize) {
        self.arena.pop_by(amount);
    }

    /// See [`Arena::try_pop_by`]
    pub fn try_pop_by(&mut self, amount: usize) -> MemoryResult<()> {
        self.arena.try_pop_by(amount)
    }

    /// See [`Arena::clear`]
    #[track_caller]
    pub fn clear(&mut self) {
        self.arena.clear();
    }

    /// See [`Arena::guard`]
    pub fn guard(&mut self) -> ArenaGuard<'_, B> {
        ArenaGuard::new(&mut self.arena)
    }
}

impl<B: RegionBacking> Deref for SubArena<'_, B> {
    type Target = Arena<B>;

    #[inline]
    fn deref(&self) -> &Arena<B> {
        &self.arena
    }
}

impl<B: RegionBacking> fmt::Debug for SubArena<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubArena").field(&self.arena).finish()
    }
}
