//! Pulse Counter Simulator
//!
//! Runs the real control loop, power-loss handler and boot restore against
//! mock peripherals and logs what the display shows.
//!
//! Run with: cargo run --example counter_simulator --features emulator -- [pulses]
//! Log level: RUST_LOG=debug (default info)

#![allow(clippy::arithmetic_side_effects)]

use counter::{Glyph, RedundantStore, DEBOUNCE_MAX, SETTLE_TICKS};
use firmware::{boot, ControlLoop, PowerLossHandler, Shared};
use platform::config;
use platform::mocks::{MockButton, MockEeprom, MockSegmentSink, MockWatchdog};
use platform::AtomicTally;
use tracing_subscriber::EnvFilter;

type SimLoop<'a> = ControlLoop<'a, &'a AtomicTally, MockButton, MockWatchdog, MockSegmentSink>;

fn glyph_char(bits: u8) -> char {
    if bits == Glyph::BLANK.bits() {
        return ' ';
    }
    if bits == Glyph::E.bits() {
        return 'E';
    }
    if bits == Glyph::R.bits() {
        return 'r';
    }
    (0..10u8)
        .find(|&d| Glyph::from_digit(d).bits() == bits)
        .and_then(|d| char::from_digit(u32::from(d), 10))
        .unwrap_or('?')
}

fn panel(shared: &Shared<MockSegmentSink>) -> Result<String, firmware::Error> {
    let latched = shared.with(|s| s.display.latched())?;
    Ok(latched.iter().map(|&b| glyph_char(b)).collect())
}

fn run(app: &mut SimLoop<'_>, ticks: usize) -> Result<(), firmware::Error> {
    for _ in 0..ticks {
        app.tick()?;
    }
    Ok(())
}

/// One power cycle: restore, count `pulses`, optionally hold reset, lose power.
fn power_cycle(
    eeprom: MockEeprom,
    pulses: u16,
    press_reset: bool,
) -> Result<MockEeprom, Box<dyn std::error::Error>> {
    let tally = AtomicTally::new();
    let shared = Shared::new(MockSegmentSink::new());
    let mut store = RedundantStore::new(eeprom).map_err(|e| format!("{e}"))?;

    let restored = boot::restore(&mut store, &tally, &shared)?;
    tracing::info!(restored, "boot");

    let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());
    run(&mut app, 3)?;
    tracing::info!(display = %panel(&shared)?, "after boot");

    for _ in 0..pulses {
        tally.increment();
    }
    tracing::debug!(pulses, "pulses injected");
    run(&mut app, usize::from(SETTLE_TICKS) + 3)?;
    tracing::info!(
        confirmed = shared.confirmed()?,
        display = %panel(&shared)?,
        "settled"
    );

    if press_reset {
        app.button_mut().set_held(true);
        run(&mut app, usize::from(DEBOUNCE_MAX) + 1)?;
        app.button_mut().set_held(false);
        run(&mut app, usize::from(DEBOUNCE_MAX) + usize::from(SETTLE_TICKS) + 3)?;
        tracing::info!(
            confirmed = shared.confirmed()?,
            display = %panel(&shared)?,
            "after reset press"
        );
    }

    tracing::debug!(feeds = app.watchdog().feeds(), "watchdog");

    let mut handler = PowerLossHandler::new(store);
    let writes = handler.on_power_loss(&shared)?;
    tracing::info!(writes, display = %panel(&shared)?, "power loss");

    Ok(handler.release().release())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pulses: u16 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 37,
    };

    tracing::info!("{} v{} - simulator", config::APP_NAME, config::APP_VERSION);

    let eeprom = power_cycle(MockEeprom::new(), pulses, false)?;
    tracing::info!(byte_writes = eeprom.byte_writes(), "first cycle done");

    let eeprom = power_cycle(eeprom, 0, true)?;
    tracing::info!(byte_writes = eeprom.byte_writes(), "second cycle done");

    let eeprom = power_cycle(eeprom, 0, false)?;
    tracing::info!(byte_writes = eeprom.byte_writes(), "third cycle done");

    Ok(())
}
