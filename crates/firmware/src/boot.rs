//! Boot sequence and counter restore.
//!
//! Initialization order (MUST be respected):
//!   1. Clocks (HSI -> PLL1, 400 MHz system clock)
//!   2. Watchdog armed
//!   3. Redundant store read and majority-decoded
//!   4. Confirmed counter and pulse tally both set to the restored value
//!   5. Power-sense edge armed
//!   6. Control loop started
//!
//! Step 4 seeds the tally as well as the confirmed counter. The tally is a
//! fresh register after reset; left at zero, the settle window would accept
//! that zero one window after boot and the restored count would be lost.
//! Step 5 comes after 4 so a power-loss flush cannot see a half-restored
//! state.

use counter::{CounterRecord, RedundantStore};
use embedded_storage::Storage;
use platform::config::WATCHDOG_TIMEOUT_MS;
use platform::PulseTally;

use crate::{Error, Shared};

/// Ordered list of boot sequence steps for documentation and testing.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Clocks: HSI 64 MHz -> PLL1 400 MHz system clock",
    "2. Watchdog: arm IWDG before anything can block",
    "3. Storage: majority-decode the persisted record",
    "4. Restore: set confirmed counter and preset the pulse tally",
    "5. Power sense: arm the EXTI line for the power-loss flush",
    "6. Embassy executor: spawn tasks, start the control loop",
];

/// IWDG timeout in microseconds.
pub const fn watchdog_timeout_us() -> u32 {
    WATCHDOG_TIMEOUT_MS.saturating_mul(1_000)
}

/// Restore the confirmed counter from non-volatile storage.
///
/// Whatever the vote decodes is taken as-is, including values above 999:
/// the display shows ERR and the overflow guard brings the tally back to
/// zero, which the settle window then confirms. A read failure starts the
/// counter at zero and is returned after the state has been set.
///
/// Returns the restored value.
pub fn restore<S, T, D>(
    store: &mut RedundantStore<S>,
    tally: &T,
    shared: &Shared<D>,
) -> Result<u16, Error>
where
    S: Storage,
    S::Error: core::fmt::Debug,
    T: PulseTally,
{
    let (value, read) = match store.read() {
        Ok(bytes) => (CounterRecord::from_bytes(bytes).value(), Ok(())),
        Err(e) => (0, Err(Error::from_store(e))),
    };

    shared.set_confirmed(value)?;
    tally.preset(value);

    #[cfg(feature = "defmt")]
    match read {
        Ok(()) => defmt::info!("restored counter={=u16}", value),
        Err(e) => defmt::warn!("restore failed ({}), starting from 0", e),
    }

    read.map(|()| value)
}

/// Build the `embassy_stm32::Config` with the board's RCC settings.
///
/// | Clock      | Source        | Frequency |
/// |------------|---------------|-----------|
/// | SYSCLK     | PLL1_P        | 400 MHz   |
/// | HCLK (AHB) | SYSCLK / 2    | 200 MHz   |
/// | APB1..4    | HCLK / 2      | 100 MHz   |
///
/// I2C1 runs from its default kernel clock (PCLK1).
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // HSI: 64 MHz internal oscillator (no prescaler)
    config.rcc.hsi = Some(HSIPrescaler::DIV1);

    // HSI (64 MHz) / prediv(4) = 16 MHz -> x mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz -> system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV2;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.apb3_pre = APBPrescaler::DIV2;
    config.rcc.apb4_pre = APBPrescaler::DIV2;
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}
