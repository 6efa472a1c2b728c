//! I2C EEPROM driver for the AT24C01/AT24C02 family.
//!
//! Implements [`embedded_storage::Storage`] so the redundant store can sit
//! directly on top of it.
//!
//! # Write cycle
//!
//! Every byte is written with its own `[word address, data]` transaction.
//! After the STOP condition the chip runs an internal write cycle (tWR, up to
//! 5 ms) during which it does not acknowledge its address. The driver polls
//! the address (acknowledge polling) until it answers again, so `write`
//! returns only once the byte is committed. Polling is bounded by
//! [`EEPROM_READY_POLL_LIMIT`](crate::config::EEPROM_READY_POLL_LIMIT);
//! exceeding it yields [`EepromError::WriteTimeout`].
//!
//! Single-byte writes trade speed for simplicity: the redundant store only
//! rewrites bytes that changed, so a flush is typically one or two bytes per
//! replica.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use embedded_storage::{ReadStorage, Storage};

use crate::config::{EEPROM_CAPACITY, EEPROM_I2C_ADDRESS, EEPROM_READY_POLL_LIMIT};
use crate::storage::range_end;

/// Errors from [`At24Eeprom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError<E> {
    /// The I2C transaction failed for a reason other than a busy chip
    Bus(E),
    /// The chip did not finish its internal write cycle within the poll limit
    WriteTimeout,
    /// The requested range is outside the chip
    OutOfBounds,
}

impl<E: core::fmt::Debug> core::fmt::Display for EepromError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(_) => f.write_str("EEPROM I2C bus error"),
            Self::WriteTimeout => f.write_str("EEPROM write cycle did not complete"),
            Self::OutOfBounds => f.write_str("EEPROM access out of bounds"),
        }
    }
}

/// AT24Cxx EEPROM with 8-bit word addressing.
pub struct At24Eeprom<I2C> {
    i2c: I2C,
    address: u8,
    capacity: usize,
    poll_limit: u32,
}

impl<I2C: I2c> At24Eeprom<I2C> {
    /// Driver at the board's default address and capacity.
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: EEPROM_I2C_ADDRESS,
            capacity: EEPROM_CAPACITY,
            poll_limit: EEPROM_READY_POLL_LIMIT,
        }
    }

    /// Override the 7-bit device address.
    #[must_use]
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Override the acknowledge-polling budget.
    #[must_use]
    pub fn with_poll_limit(mut self, poll_limit: u32) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn word_address(&self, offset: u32, len: usize) -> Result<u8, EepromError<I2C::Error>> {
        range_end(offset, len, self.capacity).ok_or(EepromError::OutOfBounds)?;
        u8::try_from(offset).map_err(|_| EepromError::OutOfBounds)
    }

    /// Poll until the chip acknowledges its address again.
    fn wait_ready(&mut self, word: u8) -> Result<(), EepromError<I2C::Error>> {
        for _ in 0..self.poll_limit {
            match self.i2c.write(self.address, &[word]) {
                Ok(()) => return Ok(()),
                Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {}
                Err(e) => return Err(EepromError::Bus(e)),
            }
        }
        Err(EepromError::WriteTimeout)
    }
}

impl<I2C: I2c> ReadStorage for At24Eeprom<I2C> {
    type Error = EepromError<I2C::Error>;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        let word = self.word_address(offset, bytes.len())?;
        self.i2c
            .write_read(self.address, &[word], bytes)
            .map_err(EepromError::Bus)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<I2C: I2c> Storage for At24Eeprom<I2C> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.word_address(offset, bytes.len())?;
        let mut word = offset;
        for &byte in bytes {
            let addr = self.word_address(word, 1)?;
            self.i2c
                .write(self.address, &[addr, byte])
                .map_err(EepromError::Bus)?;
            self.wait_ready(addr)?;
            word = word.wrapping_add(1);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = EEPROM_I2C_ADDRESS;

    fn nack() -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }

    #[test]
    fn test_read_is_one_sequential_transaction() {
        let expectations = [Transaction::write_read(ADDR, vec![0x04], vec![0x25, 0x00])];
        let mut eeprom = At24Eeprom::new(I2cMock::new(&expectations));

        let mut buf = [0u8; 2];
        eeprom.read(4, &mut buf).unwrap();
        assert_eq!(buf, [0x25, 0x00]);

        eeprom.release().done();
    }

    #[test]
    fn test_write_polls_until_acknowledged() {
        let expectations = [
            Transaction::write(ADDR, vec![0x10, 0xAB]),
            Transaction::write(ADDR, vec![0x10]).with_error(nack()),
            Transaction::write(ADDR, vec![0x10]).with_error(nack()),
            Transaction::write(ADDR, vec![0x10]),
            Transaction::write(ADDR, vec![0x11, 0xCD]),
            Transaction::write(ADDR, vec![0x11]),
        ];
        let mut eeprom = At24Eeprom::new(I2cMock::new(&expectations));

        eeprom.write(0x10, &[0xAB, 0xCD]).unwrap();

        eeprom.release().done();
    }

    #[test]
    fn test_write_times_out_when_chip_never_answers() {
        let expectations = [
            Transaction::write(ADDR, vec![0x00, 0x01]),
            Transaction::write(ADDR, vec![0x00]).with_error(nack()),
            Transaction::write(ADDR, vec![0x00]).with_error(nack()),
        ];
        let mut eeprom = At24Eeprom::new(I2cMock::new(&expectations)).with_poll_limit(2);

        assert_eq!(eeprom.write(0, &[0x01]), Err(EepromError::WriteTimeout));

        eeprom.release().done();
    }

    #[test]
    fn test_bus_error_during_poll_is_not_busy() {
        let expectations = [
            Transaction::write(ADDR, vec![0x00, 0x01]),
            Transaction::write(ADDR, vec![0x00]).with_error(ErrorKind::ArbitrationLoss),
        ];
        let mut eeprom = At24Eeprom::new(I2cMock::new(&expectations));

        assert_eq!(
            eeprom.write(0, &[0x01]),
            Err(EepromError::Bus(ErrorKind::ArbitrationLoss))
        );

        eeprom.release().done();
    }

    #[test]
    fn test_out_of_bounds_never_touches_the_bus() {
        let mut eeprom = At24Eeprom::new(I2cMock::new(&[]));

        let mut buf = [0u8; 4];
        assert_eq!(eeprom.read(254, &mut buf), Err(EepromError::OutOfBounds));
        assert_eq!(eeprom.write(256, &[0]), Err(EepromError::OutOfBounds));
        assert_eq!(eeprom.capacity(), EEPROM_CAPACITY);

        eeprom.release().done();
    }
}
