//! Reset button input abstraction
//!
//! The button is wired to ground with the MCU's internal pull-up enabled, so
//! the line reads low while pressed. [`ActiveLow`] handles that inversion at
//! the boundary; everything above it speaks in logical "active".
//!
//! No debouncing happens here. The raw level is sampled once per control
//! loop iteration and fed to the integrator in the `counter` crate.

use embedded_hal::digital::InputPin;

/// A raw (undebounced) logical input line.
pub trait RawButton {
    /// Error type
    type Error: core::fmt::Debug;

    /// `true` while the button is physically held.
    fn is_active(&mut self) -> Result<bool, Self::Error>;
}

/// Adapter for a pulled-up input whose active level is low.
pub struct ActiveLow<P> {
    pin: P,
}

impl<P: InputPin> ActiveLow<P> {
    /// Wrap a pin that is already configured as input with pull-up.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> RawButton for ActiveLow<P> {
    type Error = P::Error;

    fn is_active(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}
