//! Non-volatile storage abstraction
//!
//! The persisted record lives in a small byte-addressable non-volatile
//! memory. The boundary is the `embedded-storage` byte interface:
//!
//! - [`ReadStorage::read`] at any offset, any length
//! - [`Storage::write`] at any offset; each byte write is atomic but slow and
//!   the medium has a bounded number of write cycles per address
//!
//! Drivers are expected to wait for the medium to be ready before returning
//! from `write`, so callers may issue the next write immediately.

pub use embedded_storage::{ReadStorage, Storage};

/// Offset of the first byte past `len` bytes starting at `offset`, or `None`
/// if that range does not fit inside `capacity`.
pub fn range_end(offset: u32, len: usize, capacity: usize) -> Option<usize> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(len)?;
    (end <= capacity).then_some(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_end_inside_capacity() {
        assert_eq!(range_end(0, 10, 256), Some(10));
        assert_eq!(range_end(246, 10, 256), Some(256));
    }

    #[test]
    fn test_range_end_past_capacity() {
        assert_eq!(range_end(250, 10, 256), None);
        assert_eq!(range_end(u32::MAX, 1, 256), None);
    }
}
