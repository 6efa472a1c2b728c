//! Architecture boundary tests: run with `cargo test -p firmware --test arch_boundaries`
//!
//! These tests enforce the layering rules of the workspace:
//!   Rule 1: counter (engine) depends on no HAL crate; storage arrives through
//!           `embedded-storage`, everything else as plain values
//!   Rule 2: platform (HAL) must not depend on firmware (app layer)
//!   Rule 3: firmware reaches peripherals only through platform traits
//!
//! # How enforcement works
//!
//! The rules are compile-time properties of the workspace dependency graph.
//! The tests below name types across the boundaries; if a boundary broke
//! (a cycle, or a trait moving layers) this binary would stop compiling.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::assertions_on_constants
)]

use embedded_storage::Storage;

/// The engine is usable with nothing but a value and a storage medium.
#[test]
fn counter_engine_is_hal_free() {
    fn _store_over_any_medium<S: Storage>(
        s: S,
    ) -> Result<counter::RedundantStore<S>, counter::StoreError<S::Error>> {
        counter::RedundantStore::new(s)
    }

    let mut sampler = counter::CounterSampler::<1>::new(0);
    assert_eq!(sampler.sample(3), 3);
    let mut debouncer = counter::Debouncer::<1>::new();
    assert_eq!(debouncer.update(true), counter::ButtonState::Pressed);
    assert_eq!(counter::render(7)[2], counter::Glyph::from_digit(7));
}

/// Core HAL traits are reachable without any firmware application types.
#[test]
fn platform_hal_is_independent() {
    fn _assert_tally<T: platform::PulseTally>() {}
    fn _assert_sink<T: platform::SegmentSink>() {}
    fn _assert_button<T: platform::RawButton>() {}
    fn _assert_watchdog<T: platform::Watchdog>() {}

    _assert_tally::<platform::AtomicTally>();
    _assert_sink::<platform::mocks::MockSegmentSink>();
    _assert_button::<platform::mocks::MockButton>();
    _assert_watchdog::<platform::mocks::MockWatchdog>();
}

/// The control loop is generic over the platform traits, so host mocks and
/// board drivers plug into the same type.
#[test]
fn firmware_uses_platform_traits_only() {
    use platform::mocks::{MockButton, MockSegmentSink, MockWatchdog};

    let tally = platform::AtomicTally::new();
    let shared = firmware::Shared::new(MockSegmentSink::new());
    let mut app =
        firmware::ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());
    app.tick().unwrap();
    assert_eq!(app.watchdog().feeds(), 1);
}

/// Board constants agree with the engine's layout.
#[test]
fn record_layout_fits_board_eeprom() {
    let span = counter::RECORD_SIZE * counter::REDUNDANCY;
    assert!(counter::RECORD_BASE as usize + span <= platform::config::EEPROM_CAPACITY);
    assert!(counter::REDUNDANCY % 2 == 1, "odd replica count avoids vote ties");
    assert_eq!(counter::glyph::DISPLAY_MAX, platform::config::COUNTER_MAX);
}
