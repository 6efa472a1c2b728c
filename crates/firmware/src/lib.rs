//! Pulse Counter Firmware
//!
//! Control loop, power-loss flush and boot restore for a 3-digit pulse
//! counter on STM32H7.
//!
//! # Architecture
//!
//! ```text
//! Entry point (main.rs, hardware tasks)
//!         ↓
//! Application (app, power_loss, boot)
//!         ↓
//! Counter engine (counter crate: debounce, sampler, glyph, redundant)
//!         ↓
//! Platform HAL (platform crate: tally, display, button, EEPROM, watchdog)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy, defmt)
//! - `emulator` - Build the desktop simulator (tracing, platform mocks)
//! - `std` - Enable standard library (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Simulator
//!
//! ```bash
//! cargo run --example counter_simulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // every error is a firmware::Error variant
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod app;
pub mod boot;
pub mod error;
pub mod power_loss;
pub mod shared;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use app::ControlLoop;
pub use error::Error;
pub use power_loss::PowerLossHandler;
pub use shared::{Shared, SharedState};
