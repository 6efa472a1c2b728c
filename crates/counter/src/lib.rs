//! Persistent counter state engine
//!
//! Pure, hardware-independent pieces of the pulse counter. Nothing in this
//! crate touches a register; peripherals arrive through `embedded-storage`
//! or as plain values.
//!
//! | Module        | Role                                                     |
//! |---------------|----------------------------------------------------------|
//! | [`debounce`]  | saturating integrator turning a noisy line into a state  |
//! | [`sampler`]   | settle window between the live tally and the confirmed value |
//! | [`glyph`]     | 0..=999 to three 7-segment glyphs, ERR on overflow       |
//! | [`redundant`] | replicated record with majority-vote reads, differential writes |
//! | [`record`]    | byte layout of the persisted counter                     |

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod debounce;
pub mod glyph;
pub mod record;
pub mod redundant;
pub mod sampler;

pub use debounce::{ButtonState, Debouncer, DEBOUNCE_MAX};
pub use glyph::{render, render_blank, Glyph};
pub use record::{CounterRecord, RECORD_BASE, RECORD_SIZE, REDUNDANCY};
pub use redundant::{RedundantStore, StoreError};
pub use sampler::{CounterSampler, SETTLE_TICKS};
