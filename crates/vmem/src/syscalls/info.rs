//! Page size query
//!
//! The page size is architecture-constant for the lifetime of the process,
//! so it is asked from the OS once and cached.

use once_cell::sync::Lazy;

static PAGE_SIZE: Lazy<usize> = Lazy::new(super::imp::query_page_size);

/// Page size in bytes
///
/// Always a power of two.
#[inline]
pub fn page_size() -> usize {
    *PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        let size = page_size();
        assert!(size.is_power_of_two());
        assert!(size >= 4096);
        assert_eq!(size, page_size());
    }
}
