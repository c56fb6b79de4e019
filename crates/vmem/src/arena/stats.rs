//! Arena cursor snapshot

use std::fmt;

use crate::utils::format_bytes;

/// Point-in-time view of an arena's cursors
///
/// All sizes exclude the arena header. `depth` and `commit_amount` are only
/// tracked with the `diagnostics` feature and are `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Usable bytes
    pub capacity: usize,
    /// Bytes handed out
    pub used: usize,
    /// Bytes below the committed high-water mark
    pub committed: usize,
    /// Bytes still available
    pub remaining: usize,
    /// Nesting depth (root is zero)
    pub depth: Option<u32>,
    /// Bytes this arena asked its backing to commit, header included
    pub commit_amount: Option<usize>,
}

impl ArenaStats {
    /// Fraction of the capacity in use, from 0.0 to 1.0
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.used as f64 / self.capacity as f64
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "used {} of {} ({:.1}%), committed {}",
            format_bytes(self.used),
            format_bytes(self.capacity),
            self.utilization() * 100.0,
            format_bytes(self.committed),
        )?;
        if let Some(depth) = self.depth {
            write!(f, ", depth {depth}")?;
        }
        Ok(())
    }
}
