//! Byte-slice helpers

/// Fill `buf` with zero bytes
#[inline]
pub fn zero(buf: &mut [u8]) {
    buf.fill(0);
}

/// Whether two buffers hold the same bytes
///
/// Buffers of different length are never equal.
#[inline]
pub fn equal(a: &[u8], b: &[u8]) -> bool {
    a == b
}

/// Copy `src` into `dst`
///
/// # Panics
///
/// Panics if the lengths differ.
#[inline]
pub fn copy(dst: &mut [u8], src: &[u8]) {
    dst.copy_from_slice(src);
}
