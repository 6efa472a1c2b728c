//! Pulse Counter Firmware - Main Entry Point
//!
//! Hardware-only entry point for STM32H743ZI. Follows
//! `firmware::boot::BOOT_SEQUENCE_STEPS` in order.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_stm32::dma::NoDma;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{AnyPin, Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::time::Hertz;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use counter::RedundantStore;
use firmware::hardware::{
    control_task, power_loss_task, BoardDisplay, IwdgWatchdog, TimerTally,
};
use firmware::{boot, ControlLoop, PowerLossHandler, Shared};
use platform::config::{APP_NAME, APP_VERSION, EEPROM_I2C_ADDRESS};
use platform::{ActiveLow, At24Eeprom, GpioSegmentDisplay};

// Logging transport + panic handler
use defmt_rtt as _;
use panic_probe as _;

bind_interrupts!(struct Irqs {
    I2C1_EV => i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

static SHARED: StaticCell<Shared<BoardDisplay>> = StaticCell::new();

/// Park without feeding the watchdog; the IWDG restarts the board.
async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);

    // Step 1: clocks
    let p = embassy_stm32::init(boot::build_embassy_config());

    // Step 2: watchdog. Once unleashed it cannot be stopped; the control
    // loop feeds it every iteration.
    let mut iwdg = IndependentWatchdog::new(p.IWDG1, boot::watchdog_timeout_us());
    iwdg.unleash();
    defmt::info!(
        "IWDG watchdog armed: timeout={=u32}us",
        boot::watchdog_timeout_us()
    );

    // Display stays dark until the first loop iteration drives a digit.
    let display: BoardDisplay = GpioSegmentDisplay::new(
        [
            Output::new(p.PC0, Level::Low, Speed::Low).degrade(),
            Output::new(p.PC1, Level::Low, Speed::Low).degrade(),
            Output::new(p.PC2, Level::Low, Speed::Low).degrade(),
        ],
        [
            Output::new(p.PD0, Level::Low, Speed::Low).degrade(),
            Output::new(p.PD1, Level::Low, Speed::Low).degrade(),
            Output::new(p.PD2, Level::Low, Speed::Low).degrade(),
            Output::new(p.PD3, Level::Low, Speed::Low).degrade(),
            Output::new(p.PD4, Level::Low, Speed::Low).degrade(),
            Output::new(p.PD5, Level::Low, Speed::Low).degrade(),
        ],
        [
            Output::new(p.PD6, Level::Low, Speed::Low).degrade(),
            Output::new(p.PD7, Level::Low, Speed::Low).degrade(),
        ],
    );
    let shared: &'static Shared<BoardDisplay> = SHARED.init(Shared::new(display));

    // Step 3: storage
    let i2c = I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        NoDma,
        NoDma,
        Hertz(100_000),
        Default::default(),
    );
    let eeprom = At24Eeprom::new(i2c).with_address(EEPROM_I2C_ADDRESS);
    let mut store = match RedundantStore::new(eeprom) {
        Ok(store) => store,
        Err(_) => {
            defmt::error!("record layout does not fit the EEPROM");
            halt().await
        }
    };

    // Step 4: restore confirmed counter + preset tally
    let tally = TimerTally::new(p.TIM4, p.PE0);
    match boot::restore(&mut store, &tally, shared) {
        Ok(value) => defmt::info!("boot: counter={=u16}", value),
        Err(e) => defmt::warn!("boot: {}, counting from 0", e),
    }

    // Step 5: power sense (the tally has counted since step 4)
    let sense: ExtiInput<'static, AnyPin> =
        ExtiInput::new(Input::new(p.PA2, Pull::None).degrade(), p.EXTI2.degrade());
    if let Err(e) = spawner.spawn(power_loss_task(
        sense,
        PowerLossHandler::new(store),
        shared,
    )) {
        defmt::error!("power loss task spawn failed: {}", e);
    }

    // Step 6: control loop
    let button = ActiveLow::new(Input::new(p.PA0, Pull::Up).degrade());
    let app = ControlLoop::new(shared, tally, button, IwdgWatchdog::new(iwdg));
    if let Err(e) = spawner.spawn(control_task(app)) {
        defmt::error!("control task spawn failed: {}", e);
        halt().await;
    }
    defmt::info!("Entering control loop");
}
