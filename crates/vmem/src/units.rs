//! Byte-unit constants and the default arena size

/// 1 Kilobyte
pub const KB: usize = 1024;

/// 1 Megabyte
pub const MB: usize = 1024 * KB;

/// 1 Gigabyte
pub const GB: usize = 1024 * MB;

/// 1 Terabyte (address space this large only exists on 64-bit targets)
#[cfg(target_pointer_width = "64")]
pub const TB: usize = 1024 * GB;

/// Capacity used by [`Arena::with_default_capacity`](crate::arena::Arena::with_default_capacity)
/// and the process-wide default arena
pub const DEFAULT_ARENA_SIZE: usize = 4 * MB;

/// `n` kilobytes in bytes
#[inline]
pub const fn kilobytes(n: usize) -> usize {
    n * KB
}

/// `n` megabytes in bytes
#[inline]
pub const fn megabytes(n: usize) -> usize {
    n * MB
}

/// `n` gigabytes in bytes
#[inline]
pub const fn gigabytes(n: usize) -> usize {
    n * GB
}

/// `n` terabytes in bytes
#[cfg(target_pointer_width = "64")]
#[inline]
pub const fn terabytes(n: usize) -> usize {
    n * TB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ladder() {
        assert_eq!(kilobytes(1), 1024);
        assert_eq!(megabytes(1), 1024 * 1024);
        assert_eq!(gigabytes(2), 2 * 1024 * 1024 * 1024);
        assert_eq!(DEFAULT_ARENA_SIZE, megabytes(4));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_terabytes() {
        assert_eq!(terabytes(1), 1 << 40);
    }
}
