//! Replicated record with majority-vote reads and differential writes.
//!
//! # Layout
//!
//! `R` copies of a `SIZE`-byte record, replica-major, starting at `base`:
//!
//! ```text
//! base + 0*SIZE .. base + 1*SIZE   replica 0
//! base + 1*SIZE .. base + 2*SIZE   replica 1
//! ...
//! base + (R-1)*SIZE .. base + R*SIZE
//! ```
//!
//! # Read
//!
//! Each output bit is set iff strictly more than `R / 2` replicas have it set.
//! Up to `floor(R / 2)` replicas (odd `R`) may be wrong in any bit position
//! and the record still decodes. Past that the result is silently wrong: there
//! is no checksum, and none is wanted.
//!
//! # Write
//!
//! Every stored byte is read first and only rewritten if it differs, because
//! each EEPROM cell survives a bounded number of write cycles. Writing the
//! same record twice costs zero physical writes the second time.
//!
//! # Concurrency
//!
//! Both operations run entirely inside a critical section. The storage
//! primitives are not re-entrant, and a power-loss handler firing halfway
//! through a replica set would leave it torn.

use embedded_storage::Storage;

use crate::record::{RECORD_BASE, RECORD_SIZE, REDUNDANCY};

/// Errors from [`RedundantStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// The underlying medium reported an error
    Storage(E),
    /// The replica set does not fit in the medium
    OutOfBounds,
}

impl<E: core::fmt::Debug> core::fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(_) => f.write_str("non-volatile storage error"),
            Self::OutOfBounds => f.write_str("replica set exceeds storage capacity"),
        }
    }
}

/// Majority vote across replicas of one byte.
///
/// Ties (only possible with an even count) resolve to 0.
#[allow(clippy::arithmetic_side_effects)] // divisor is a non-zero literal
pub fn vote(replicas: &[u8]) -> u8 {
    let threshold = replicas.len() / 2;
    let mut out = 0u8;
    for bit in 0..8 {
        let mask = 1u8 << bit;
        let set = replicas.iter().filter(|&&b| b & mask != 0).count();
        if set > threshold {
            out |= mask;
        }
    }
    out
}

/// `R` mirrored copies of a `SIZE`-byte record on a byte-addressable medium.
pub struct RedundantStore<S, const SIZE: usize = RECORD_SIZE, const R: usize = REDUNDANCY> {
    storage: S,
    base: u32,
}

impl<S, const SIZE: usize, const R: usize> RedundantStore<S, SIZE, R>
where
    S: Storage,
{
    const LAYOUT_OK: () = assert!(
        SIZE > 0 && R > 0,
        "record and replica count must be non-zero"
    );

    /// Place the replica set at the board's fixed offset.
    pub fn new(storage: S) -> Result<Self, StoreError<S::Error>> {
        Self::with_base(storage, RECORD_BASE)
    }

    /// Place the replica set at `base`. Fails if it would run past the end of
    /// the medium.
    pub fn with_base(storage: S, base: u32) -> Result<Self, StoreError<S::Error>> {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_OK;

        let span = SIZE.checked_mul(R).ok_or(StoreError::OutOfBounds)?;
        let end = usize::try_from(base)
            .ok()
            .and_then(|b| b.checked_add(span))
            .ok_or(StoreError::OutOfBounds)?;
        if end > storage.capacity() || u32::try_from(end).is_err() {
            return Err(StoreError::OutOfBounds);
        }
        Ok(Self { storage, base })
    }

    /// Decode the record by per-bit majority vote.
    pub fn read(&mut self) -> Result<[u8; SIZE], StoreError<S::Error>> {
        critical_section::with(|_cs| {
            let mut out = [0u8; SIZE];
            let mut replicas = [0u8; R];
            for (byte, slot) in out.iter_mut().enumerate() {
                for (replica, value) in replicas.iter_mut().enumerate() {
                    let offset = self.offset(replica, byte)?;
                    let mut cell = [0u8; 1];
                    self.storage
                        .read(offset, &mut cell)
                        .map_err(StoreError::Storage)?;
                    *value = cell[0];
                }
                *slot = vote(&replicas);
            }
            Ok(out)
        })
    }

    /// Store `data` into every replica, writing only bytes that differ.
    ///
    /// Returns the number of physical byte writes issued.
    pub fn write(&mut self, data: &[u8; SIZE]) -> Result<usize, StoreError<S::Error>> {
        critical_section::with(|_cs| {
            let mut writes = 0usize;
            for replica in 0..R {
                for (byte, &target) in data.iter().enumerate() {
                    let offset = self.offset(replica, byte)?;
                    let mut current = [0u8; 1];
                    self.storage
                        .read(offset, &mut current)
                        .map_err(StoreError::Storage)?;
                    if current[0] != target {
                        self.storage
                            .write(offset, &[target])
                            .map_err(StoreError::Storage)?;
                        writes = writes.saturating_add(1);
                    }
                }
            }
            #[cfg(feature = "defmt")]
            defmt::debug!("record flush: {=usize} byte writes", writes);
            Ok(writes)
        })
    }

    /// Borrow the medium.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the medium.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give the medium back.
    pub fn release(self) -> S {
        self.storage
    }

    fn offset(&self, replica: usize, byte: usize) -> Result<u32, StoreError<S::Error>> {
        replica
            .checked_mul(SIZE)
            .and_then(|o| o.checked_add(byte))
            .and_then(|o| u32::try_from(o).ok())
            .and_then(|o| self.base.checked_add(o))
            .ok_or(StoreError::OutOfBounds)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use platform::mocks::MockEeprom;

    type Store = RedundantStore<MockEeprom>;

    #[test]
    fn test_vote_strict_majority() {
        assert_eq!(vote(&[0xFF, 0xFF, 0xFF, 0x00, 0x00]), 0xFF);
        assert_eq!(vote(&[0xFF, 0xFF, 0x00, 0x00, 0x00]), 0x00);
        assert_eq!(vote(&[0b1010, 0b1000, 0b0010]), 0b1010);
    }

    #[test]
    fn test_vote_tie_resolves_to_zero() {
        assert_eq!(vote(&[0xFF, 0xFF, 0x00, 0x00]), 0x00);
        assert_eq!(vote(&[0xFF, 0x00]), 0x00);
    }

    #[test]
    fn test_round_trip() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        store.write(&[0x25, 0x00]).unwrap();
        assert_eq!(store.read().unwrap(), [0x25, 0x00]);
    }

    #[test]
    fn test_layout_is_replica_major_from_zero() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        store.write(&[0xAA, 0xBB]).unwrap();
        let cells = store.storage().cells();
        assert_eq!(&cells[..10], &[0xAA, 0xBB, 0xAA, 0xBB, 0xAA, 0xBB, 0xAA, 0xBB, 0xAA, 0xBB]);
        assert_eq!(cells[10], 0xFF);
    }

    #[test]
    fn test_second_identical_write_is_free() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        assert_eq!(store.write(&[0x01, 0x02]).unwrap(), 10);
        assert_eq!(store.write(&[0x01, 0x02]).unwrap(), 0);
        assert_eq!(store.storage().byte_writes(), 10);
    }

    #[test]
    fn test_only_changed_bytes_are_written() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        store.write(&[0x01, 0x00]).unwrap();
        // Low byte changes, high byte does not: one write per replica.
        assert_eq!(store.write(&[0x02, 0x00]).unwrap(), REDUNDANCY);
        assert_eq!(store.storage().writes_at(1), 1);
    }

    #[test]
    fn test_repairs_corrupted_replica_on_write() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        store.write(&[0x10, 0x20]).unwrap();
        store.storage_mut().corrupt(4, 0x00);
        assert_eq!(store.write(&[0x10, 0x20]).unwrap(), 1);
        assert_eq!(store.storage().cells()[4], 0x10);
    }

    #[test]
    fn test_tolerates_floor_half_corrupted_replicas() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        store.write(&[0x5A, 0xC3]).unwrap();
        // Two of five replicas fully inverted.
        for replica in [1usize, 3] {
            for byte in 0..RECORD_SIZE {
                store.storage_mut().flip_bits(replica * RECORD_SIZE + byte, 0xFF);
            }
        }
        assert_eq!(store.read().unwrap(), [0x5A, 0xC3]);
    }

    #[test]
    fn test_corruption_past_tolerance_decodes_wrong() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        store.write(&[0x5A, 0xC3]).unwrap();
        // Three of five replicas flip bit 0 of byte 0: the vote follows them.
        for replica in 0..3usize {
            store.storage_mut().flip_bits(replica * RECORD_SIZE, 0x01);
        }
        assert_eq!(store.read().unwrap(), [0x5B, 0xC3]);
    }

    #[test]
    fn test_fresh_memory_reads_erased_pattern() {
        let mut store = Store::new(MockEeprom::new()).unwrap();
        assert_eq!(store.read().unwrap(), [0xFF, 0xFF]);
    }

    #[test]
    fn test_base_offset() {
        let mut store =
            RedundantStore::<MockEeprom, 2, 3>::with_base(MockEeprom::new(), 100).unwrap();
        store.write(&[7, 8]).unwrap();
        assert_eq!(&store.storage().cells()[100..106], &[7, 8, 7, 8, 7, 8]);
        assert_eq!(store.read().unwrap(), [7, 8]);
    }

    #[test]
    fn test_layout_past_capacity_is_rejected() {
        let result = RedundantStore::<MockEeprom, 2, 5>::with_base(MockEeprom::new(), 250);
        assert!(matches!(result, Err(StoreError::OutOfBounds)));
    }
}
