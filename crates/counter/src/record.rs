//! Byte layout of the persisted counter.

/// Bytes per replica.
pub const RECORD_SIZE: usize = 2;

/// Number of replicas. Odd, so the per-bit vote can never tie.
pub const REDUNDANCY: usize = 5;

/// Offset of replica 0 in non-volatile memory.
pub const RECORD_BASE: u32 = 0;

/// The confirmed counter as stored: `u16`, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterRecord(pub u16);

impl CounterRecord {
    /// Encode for storage.
    pub const fn to_bytes(self) -> [u8; RECORD_SIZE] {
        self.0.to_le_bytes()
    }

    /// Decode from storage. Any bit pattern is a value; out-of-range values
    /// are left for the display's ERR state and the tally overflow guard.
    pub const fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// The counter value.
    pub const fn value(self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        assert_eq!(CounterRecord(0x0325).to_bytes(), [0x25, 0x03]);
        assert_eq!(CounterRecord::from_bytes([0xE7, 0x03]).value(), 999);
    }

    #[test]
    fn test_erased_memory_decodes_out_of_range() {
        // A never-written EEPROM reads 0xFF; that must not look like a count.
        assert!(CounterRecord::from_bytes([0xFF; RECORD_SIZE]).value() > 999);
    }
}
