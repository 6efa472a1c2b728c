//! Hardware Abstraction Layer (HAL) for the pulse counter
//!
//! This crate provides trait-based abstractions for every peripheral the
//! counter firmware touches, so the counter engine and the control loop run
//! unchanged on the board and on the host.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: control loop, power-loss handler)
//!         ↓
//! Engine (counter crate: debounce, sampler, glyphs, redundant store)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Peripherals
//!
//! - [`PulseTally`] - free-running pulse counter (read / reset / preset)
//! - [`RawButton`] - reset button line, active low at the pin
//! - [`SegmentSink`] - multiplexed 7-segment display output
//! - [`Watchdog`] - liveness supervisor
//! - [`storage`] - byte-addressable non-volatile memory (`embedded-storage`)
//!
//! # Features
//!
//! - `std`: Expose [`mocks`] to other crates (host tests, simulator)
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```
//! use platform::{PulseTally, AtomicTally};
//!
//! let tally = AtomicTally::new();
//! tally.increment();
//! assert_eq!(tally.count(), 1);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // part numbers and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod display;
pub mod input;
pub mod storage;
pub mod storage_eeprom;
pub mod tally;
pub mod watchdog;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main traits
pub use display::{Digit, GpioSegmentDisplay, SegmentError, SegmentSink};
pub use input::{ActiveLow, RawButton};
pub use storage::{ReadStorage, Storage};
pub use storage_eeprom::{At24Eeprom, EepromError};
pub use tally::{AtomicTally, PulseTally};
pub use watchdog::Watchdog;
