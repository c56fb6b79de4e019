//! Process-wide default arena
//!
//! Explicitly initialized and torn down; there is no lazy creation. The arena
//! sits behind a mutex, and [`with_default_arena`] holds that lock for the
//! duration of the closure, so calling it again from inside the closure
//! deadlocks.

use parking_lot::{Mutex, const_mutex};

#[cfg(feature = "logging")]
use tracing::info;

use super::Arena;
use crate::error::{MemoryError, MemoryResult};
use crate::units::DEFAULT_ARENA_SIZE;

static DEFAULT_ARENA: Mutex<Option<Arena>> = const_mutex(None);

/// Create the default arena with [`DEFAULT_ARENA_SIZE`] bytes.
pub fn init() -> MemoryResult<()> {
    init_with_capacity(DEFAULT_ARENA_SIZE)
}

/// Create the default arena with `capacity` bytes.
///
/// Fails with [`MemoryError::AlreadyInitialized`] if one exists.
pub fn init_with_capacity(capacity: usize) -> MemoryResult<()> {
    let mut slot = DEFAULT_ARENA.lock();
    if slot.is_some() {
        return Err(MemoryError::AlreadyInitialized);
    }
    *slot = Some(Arena::new(capacity)?);

    #[cfg(feature = "logging")]
    info!(capacity, "default arena initialized");

    Ok(())
}

/// Whether the default arena currently exists
pub fn is_initialized() -> bool {
    DEFAULT_ARENA.lock().is_some()
}

/// Run `f` against the default arena.
///
/// Anything `f` allocates stays in the arena after it returns, but no
/// reference into it can escape the closure.
pub fn with_default_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> MemoryResult<R> {
    let mut slot = DEFAULT_ARENA.lock();
    let arena = slot.as_mut().ok_or(MemoryError::NotInitialized)?;
    Ok(f(arena))
}

/// Destroy the default arena. Doing so when none exists is a no-op.
pub fn shutdown() -> MemoryResult<()> {
    let arena = DEFAULT_ARENA.lock().take();
    match arena {
        Some(arena) => {
            arena.destroy()?;

            #[cfg(feature = "logging")]
            info!("default arena shut down");

            Ok(())
        }
        None => Ok(()),
    }
}
