//! Application configuration and constants
//!
//! Central configuration values shared by the counter engine, the firmware and
//! the host simulator. Board-level values (addresses, timeouts) live here so the
//! hardware binding and the tests agree on them.

/// The application name
pub const APP_NAME: &str = "Pulse Counter";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest value the 3-digit display can show. Tallies above this are reset.
pub const COUNTER_MAX: u16 = 999;

/// Number of multiplexed digit positions (hundreds, tens, units).
pub const DIGIT_COUNT: usize = 3;

/// Watchdog window in milliseconds.
///
/// The control loop feeds the watchdog once per iteration; an iteration is a
/// few microseconds, so missing this window means the loop is hung and the
/// board must restart.
pub const WATCHDOG_TIMEOUT_MS: u32 = 2_000;

/// 7-bit I2C address of the AT24-family EEPROM holding the persisted record
/// (A0..A2 strapped low).
pub const EEPROM_I2C_ADDRESS: u8 = 0x50;

/// Maximum acknowledge-polling attempts while the EEPROM finishes an internal
/// write cycle. AT24C02 tWR is 5 ms; at 100 kHz one poll is ~0.1 ms.
pub const EEPROM_READY_POLL_LIMIT: u32 = 200;

/// Capacity of the AT24C02 in bytes.
pub const EEPROM_CAPACITY: usize = 256;
