//! Pool statistics

use std::fmt;

/// Snapshot of a pool's counters
///
/// `total_allocs`, `total_frees`, `exhausted_hits` and `peak_in_use` stay at
/// zero unless the pool was built with
/// [`track_stats`](super::PoolConfig::track_stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful allocations
    pub total_allocs: u64,
    /// Chunks returned
    pub total_frees: u64,
    /// Allocations refused because no chunk was free
    pub exhausted_hits: u64,
    /// Highest number of chunks out at once
    pub peak_in_use: usize,
    /// Chunks currently out
    pub in_use: usize,
    /// Usable bytes per chunk
    pub chunk_size: usize,
    /// Total number of chunks
    pub chunk_count: usize,
}

impl PoolStats {
    /// Chunks currently free
    pub fn free_chunks(&self) -> usize {
        self.chunk_count - self.in_use
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} chunks of {} B in use (peak {}), {} allocs, {} frees, {} exhausted",
            self.in_use,
            self.chunk_count,
            self.chunk_size,
            self.peak_in_use,
            self.total_allocs,
            self.total_frees,
            self.exhausted_hits,
        )
    }
}
