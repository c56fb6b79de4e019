//! RAII helper for scoped arena allocations

use std::ops::Deref;

#[cfg(feature = "logging")]
use tracing::error;

use super::{Arena, Position};
use crate::backing::{DefaultBacking, RegionBacking};
use crate::error::{MemoryResult, fatal};

/// RAII guard for scoped allocations within an arena
///
/// This guard saves the current position of an arena and pops back to it
/// when dropped, zero-filling everything allocated in between. Allocate
/// through the guard; it derefs to the arena.
///
/// # Examples
///
/// ```
/// use nebula_vmem::arena::Arena;
///
/// let mut arena = Arena::new(4096)?;
/// arena.push(16);
///
/// {
///     let guard = arena.guard();
///     guard.push(1024).fill(0xAB);
///     assert_eq!(guard.used(), 16 + 1024);
/// }
///
/// assert_eq!(arena.used(), 16);
/// # Ok::<(), nebula_vmem::MemoryError>(())
/// ```
#[must_use = "ArenaGuard does nothing unless held"]
pub struct ArenaGuard<'a, B: RegionBacking = DefaultBacking> {
    arena: &'a mut Arena<B>,
    position: Position,
    active: bool,
}

impl<'a, B: RegionBacking> ArenaGuard<'a, B> {
    /// Creates a new arena guard that will pop to the current position on drop
    pub fn new(arena: &'a mut Arena<B>) -> Self {
        let position = arena.current_position();
        Self {
            arena,
            position,
            active: true,
        }
    }

    /// Pops back to the saved position now
    ///
    /// After calling this, the guard will not pop again on drop.
    pub fn reset(&mut self) -> MemoryResult<()> {
        if self.active {
            self.arena.try_pop_to(self.position)?;
            self.active = false;
        }
        Ok(())
    }

    /// Leaks the guard, keeping everything allocated within its scope
    pub fn leak(mut self) {
        self.active = false;
    }

    /// Returns the saved position
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Nested guard over the same arena
    pub fn guard(&mut self) -> ArenaGuard<'_, B> {
        ArenaGuard::new(self.arena)
    }
}

impl<B: RegionBacking> Deref for ArenaGuard<'_, B> {
    type Target = Arena<B>;

    #[inline]
    fn deref(&self) -> &Arena<B> {
        self.arena
    }
}

impl<B: RegionBacking> Drop for ArenaGuard<'_, B> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        // The saved position is ours and nothing can have popped below it
        // while the guard held the arena, so only a failed commit is left.
        if let Err(err) = self.arena.try_pop_to(self.position) {
            if !std::thread::panicking() {
                fatal(err);
            }
            #[cfg(feature = "logging")]
            error!(code = err.code(), "{err}");
        }
    }
}
