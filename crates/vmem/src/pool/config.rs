//! Pool configuration

/// Configuration for [`Pool`](super::Pool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Count allocations, frees, exhaustion hits and the in-use peak
    pub track_stats: bool,

    /// Fill pattern byte for chunks handed out by `alloc`
    ///
    /// `Some(0)` makes every chunk start zeroed. `None` leaves whatever the
    /// chunk held when it was last freed.
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for chunks returned by `free` (for debugging)
    pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
        }
    }
}

impl PoolConfig {
    /// Production configuration - no fills, no counters
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }

    /// Debug configuration - poison both directions and count everything
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
        }
    }

    /// Every allocated chunk starts zero-filled
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: Some(0),
            dealloc_pattern: None,
        }
    }

    /// Same configuration with statistics tracking switched on or off
    #[must_use]
    pub fn with_stats(mut self, track_stats: bool) -> Self {
        self.track_stats = track_stats;
        self
    }
}
