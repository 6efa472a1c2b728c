//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests and in the host simulator.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use core::convert::Infallible;

use crate::config::EEPROM_CAPACITY;
use crate::storage::range_end;
use crate::*;

/// Error returned by [`MockEeprom`] for out-of-range access or while offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockStorageError;

/// In-memory EEPROM that counts physical byte writes.
///
/// Fresh chips read 0xFF, like real erased EEPROM cells.
pub struct MockEeprom {
    cells: [u8; EEPROM_CAPACITY],
    byte_writes: usize,
    writes_per_cell: [u32; EEPROM_CAPACITY],
    offline: bool,
}

impl MockEeprom {
    /// Create an erased mock EEPROM
    pub fn new() -> Self {
        Self {
            cells: [0xFF; EEPROM_CAPACITY],
            byte_writes: 0,
            writes_per_cell: [0; EEPROM_CAPACITY],
            offline: false,
        }
    }

    /// Total physical byte writes since creation
    pub fn byte_writes(&self) -> usize {
        self.byte_writes
    }

    /// Physical writes to one address (wear)
    pub fn writes_at(&self, offset: usize) -> u32 {
        self.writes_per_cell[offset]
    }

    /// Raw cell contents
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Overwrite a cell without counting it as a write (fault injection).
    pub fn corrupt(&mut self, offset: usize, value: u8) {
        self.cells[offset] = value;
    }

    /// XOR a cell with `mask` without counting it as a write (bit flips).
    pub fn flip_bits(&mut self, offset: usize, mask: u8) {
        self.cells[offset] ^= mask;
    }

    /// While offline every access fails (unpowered or disconnected chip).
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStorage for MockEeprom {
    type Error = MockStorageError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if self.offline {
            return Err(MockStorageError);
        }
        let end = range_end(offset, bytes.len(), EEPROM_CAPACITY).ok_or(MockStorageError)?;
        let start = end - bytes.len();
        bytes.copy_from_slice(&self.cells[start..end]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        EEPROM_CAPACITY
    }
}

impl Storage for MockEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.offline {
            return Err(MockStorageError);
        }
        let end = range_end(offset, bytes.len(), EEPROM_CAPACITY).ok_or(MockStorageError)?;
        let start = end - bytes.len();
        for (i, &byte) in bytes.iter().enumerate() {
            self.cells[start + i] = byte;
            self.writes_per_cell[start + i] += 1;
            self.byte_writes += 1;
        }
        Ok(())
    }
}

/// One frame handed to a [`MockSegmentSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// `show(digit, segments, aux)`, recombined as `segments | aux << 6`
    Digit(Digit, u8),
    /// `blank()`
    Blank,
}

/// Display sink that records every frame.
pub struct MockSegmentSink {
    frames: Vec<Frame>,
    latched: [u8; 3],
    lit: bool,
}

impl MockSegmentSink {
    /// Create new mock display
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            latched: [0; 3],
            lit: false,
        }
    }

    /// Every frame in order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Last pattern driven onto each digit position since the last blank.
    ///
    /// After three loop iterations this is what a viewer sees.
    pub fn latched(&self) -> [u8; 3] {
        self.latched
    }

    /// `false` after `blank()` until the next `show()`
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Forget recorded frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for MockSegmentSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSink for MockSegmentSink {
    type Error = Infallible;

    fn show(&mut self, digit: Digit, segments: u8, aux: u8) -> Result<(), Self::Error> {
        let pattern = (segments & 0b0011_1111) | ((aux & 0b11) << 6);
        self.frames.push(Frame::Digit(digit, pattern));
        self.latched[digit.index()] = pattern;
        self.lit = true;
        Ok(())
    }

    fn blank(&mut self) -> Result<(), Self::Error> {
        self.frames.push(Frame::Blank);
        self.latched = [0; 3];
        self.lit = false;
        Ok(())
    }
}

/// Button whose level the test sets directly.
pub struct MockButton {
    held: bool,
    reads: usize,
}

impl MockButton {
    /// Create a released button
    pub fn new() -> Self {
        Self {
            held: false,
            reads: 0,
        }
    }

    /// Hold or release the button
    pub fn set_held(&mut self, held: bool) {
        self.held = held;
    }

    /// Number of times the line was sampled
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Default for MockButton {
    fn default() -> Self {
        Self::new()
    }
}

impl RawButton for MockButton {
    type Error = Infallible;

    fn is_active(&mut self) -> Result<bool, Self::Error> {
        self.reads += 1;
        Ok(self.held)
    }
}

/// Watchdog that counts feeds.
#[derive(Default)]
pub struct MockWatchdog {
    feeds: usize,
}

impl MockWatchdog {
    /// Create new mock watchdog
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of feeds so far
    pub fn feeds(&self) -> usize {
        self.feeds
    }
}

impl Watchdog for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_eeprom_reads_erased() {
        let mut eeprom = MockEeprom::new();
        let mut buf = [0u8; 4];
        eeprom.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 4]);
    }

    #[test]
    fn test_mock_eeprom_counts_writes() {
        let mut eeprom = MockEeprom::new();
        eeprom.write(3, &[1, 2]).unwrap();
        eeprom.write(3, &[1]).unwrap();
        assert_eq!(eeprom.byte_writes(), 3);
        assert_eq!(eeprom.writes_at(3), 2);
        assert_eq!(eeprom.writes_at(4), 1);
        assert_eq!(&eeprom.cells()[3..5], &[1, 2]);
    }

    #[test]
    fn test_mock_eeprom_rejects_out_of_range() {
        let mut eeprom = MockEeprom::new();
        assert_eq!(eeprom.write(255, &[0, 0]), Err(MockStorageError));
    }

    #[test]
    fn test_mock_eeprom_offline() {
        let mut eeprom = MockEeprom::new();
        eeprom.set_offline(true);
        let mut buf = [0u8; 1];
        assert_eq!(eeprom.read(0, &mut buf), Err(MockStorageError));
        assert_eq!(eeprom.write(0, &[1]), Err(MockStorageError));
        assert_eq!(eeprom.byte_writes(), 0);
        eeprom.set_offline(false);
        assert!(eeprom.read(0, &mut buf).is_ok());
    }

    #[test]
    fn test_mock_segment_sink_latches_per_digit() {
        let mut sink = MockSegmentSink::new();
        sink.show(Digit::Units, 0x3F, 0b01).unwrap();
        sink.show(Digit::Hundreds, 0x06, 0).unwrap();
        assert_eq!(sink.latched(), [0x06, 0, 0x7F]);
        assert!(sink.is_lit());

        sink.blank().unwrap();
        assert_eq!(sink.latched(), [0; 3]);
        assert!(!sink.is_lit());
        assert_eq!(sink.frames().len(), 3);
    }

    #[test]
    fn test_mock_button_and_watchdog() {
        let mut button = MockButton::new();
        assert!(!button.is_active().unwrap());
        button.set_held(true);
        assert!(button.is_active().unwrap());
        assert_eq!(button.reads(), 2);

        let mut wdt = MockWatchdog::new();
        wdt.feed();
        wdt.feed();
        assert_eq!(wdt.feeds(), 2);
    }
}
