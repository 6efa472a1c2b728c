//! STM32H743 board binding.
//!
//! # Pin assignments
//!
//! | Signal            | MCU pin   | Notes                                  |
//! |-------------------|-----------|----------------------------------------|
//! | Reset button      | PA0       | Active-low, internal pull-up           |
//! | Pulse input       | PE0       | TIM4_ETR (AF2), external pull-down     |
//! | Power sense       | PA2       | EXTI2 falling edge (supply collapsing) |
//! | Digit commons     | PC0..PC2  | Hundreds, tens, units; active high     |
//! | Segments a..f     | PD0..PD5  | Segment port, active high              |
//! | Segment g, dp     | PD6, PD7  | Auxiliary lines, active high           |
//! | EEPROM SCL / SDA  | PB8 / PB9 | I2C1, AT24C02 at 0x50                  |
//!
//! # Tasks
//!
//! Pulses never go through software: [`TimerTally`] runs TIM4 in external
//! clock mode 2, so edges on PE0 advance the counter register while the
//! executor is busy or interrupts are masked.
//!
//! Both tasks run on the thread-mode executor:
//!
//! - [`power_loss_task`] flushes the confirmed counter on a power-sense edge
//! - [`control_task`] runs the control loop and yields after every iteration
//!
//! The loop yields each iteration, so a power-sense edge is serviced within
//! one loop iteration. The flush itself runs inside the shared-state critical
//! section and cannot be interleaved with a loop access.

use embassy_stm32::dma::NoDma;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{AnyPin, Input, Output};
use embassy_stm32::i2c::I2c;
use embassy_stm32::pac;
use embassy_stm32::peripherals::{I2C1, IWDG1, PE0, TIM4};
use embassy_stm32::wdg::IndependentWatchdog;

use platform::{ActiveLow, At24Eeprom, GpioSegmentDisplay, PulseTally, Watchdog};

use crate::{ControlLoop, Error, PowerLossHandler, Shared};

/// Blocking I2C1 (no DMA; a flush is ten single-byte writes).
pub type BoardI2c = I2c<'static, I2C1, NoDma, NoDma>;
/// Record storage.
pub type BoardEeprom = At24Eeprom<BoardI2c>;
/// 3-digit multiplexed LED display.
pub type BoardDisplay = GpioSegmentDisplay<Output<'static, AnyPin>>;
/// Reset button line.
pub type BoardButton = ActiveLow<Input<'static, AnyPin>>;
/// The control loop as wired on the board.
pub type BoardLoop = ControlLoop<'static, TimerTally, BoardButton, IwdgWatchdog, BoardDisplay>;

/// Alternate function routing PE0 to TIM4_ETR.
const PE0_AF_TIM4_ETR: u8 = 2;

/// [`PulseTally`] backed by the TIM4 counter register.
///
/// Owns the TIM4 and PE0 singletons so nothing else can reconfigure them.
/// The register is 16 bits wide and wraps like [`platform::AtomicTally`].
pub struct TimerTally {
    _tim: TIM4,
    _pin: PE0,
}

impl TimerTally {
    /// Route PE0 to TIM4_ETR and start counting rising edges from zero.
    pub fn new(tim: TIM4, pin: PE0) -> Self {
        pac::RCC.apb1lenr().modify(|w| w.set_tim4en(true));

        pac::GPIOE
            .moder()
            .modify(|w| w.set_moder(0, pac::gpio::vals::Moder::ALTERNATE));
        pac::GPIOE.afr(0).modify(|w| w.set_afr(0, PE0_AF_TIM4_ETR));

        let tim4 = pac::TIM4;
        tim4.cr1().modify(|w| w.set_cen(false));
        // External clock mode 2: ETR, non-inverted, no prescaler, no filter.
        tim4.smcr().modify(|w| w.set_ece(true));
        tim4.cnt().write(|w| w.set_cnt(0));
        tim4.cr1().modify(|w| w.set_cen(true));

        Self {
            _tim: tim,
            _pin: pin,
        }
    }
}

impl PulseTally for TimerTally {
    fn count(&self) -> u16 {
        pac::TIM4.cnt().read().cnt()
    }

    fn reset(&self) {
        self.preset(0);
    }

    fn preset(&self, value: u16) {
        pac::TIM4.cnt().write(|w| w.set_cnt(value));
    }
}

/// [`Watchdog`] over the independent watchdog. Must already be unleashed.
pub struct IwdgWatchdog(IndependentWatchdog<'static, IWDG1>);

impl IwdgWatchdog {
    /// Wrap an armed IWDG.
    pub fn new(iwdg: IndependentWatchdog<'static, IWDG1>) -> Self {
        Self(iwdg)
    }
}

impl Watchdog for IwdgWatchdog {
    fn feed(&mut self) {
        self.0.pet();
    }
}

/// Flush the confirmed counter whenever the supply starts to collapse.
///
/// If the supply recovers without a reset the task simply waits for the
/// next edge; the differential write makes a repeat flush free.
#[embassy_executor::task]
pub async fn power_loss_task(
    mut sense: ExtiInput<'static, AnyPin>,
    mut handler: PowerLossHandler<BoardEeprom>,
    shared: &'static Shared<BoardDisplay>,
) {
    loop {
        sense.wait_for_falling_edge().await;
        match handler.on_power_loss(shared) {
            Ok(writes) => defmt::info!("power loss flush done: {=usize} writes", writes),
            Err(e) => defmt::error!("power loss flush failed: {}", e),
        }
    }
}

/// Run the control loop forever.
///
/// Errors are logged when they first appear and again whenever the kind
/// changes, so a stuck line does not flood RTT at loop rate.
#[embassy_executor::task]
pub async fn control_task(mut app: BoardLoop) {
    let mut last: Option<Error> = None;
    loop {
        let result = app.tick();
        let now = result.err();
        if now != last {
            match now {
                Some(e) => defmt::warn!("control loop: {}", e),
                None => defmt::info!("control loop: recovered"),
            }
            last = now;
        }
        embassy_futures::yield_now().await;
    }
}
