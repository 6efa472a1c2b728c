//! Integrating debouncer.
//!
//! The integral climbs while the raw line is active and drains while it is
//! not, saturating at both ends. The reported state only flips at the rails:
//! `Pressed` when the integral hits `MAX`, `Released` when it hits zero.
//! Bounce and short glitches move the integral around the middle band and
//! never reach a rail, so they never change the state.
//!
//! The delay is `MAX` loop iterations, not a wall-clock timer; it scales with
//! whatever rate the loop happens to run at.

/// Integral ceiling used by the board (one full `u8`).
pub const DEBOUNCE_MAX: u8 = u8::MAX;

/// Debounced button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    /// Not held (or not held long enough)
    #[default]
    Released,
    /// Held for at least `MAX` net iterations
    Pressed,
}

/// Saturating-integrator debouncer with ceiling `MAX`.
#[derive(Debug, Clone)]
pub struct Debouncer<const MAX: u8 = DEBOUNCE_MAX> {
    integral: u8,
    state: ButtonState,
}

impl<const MAX: u8> Debouncer<MAX> {
    /// Released, integral at zero.
    pub const fn new() -> Self {
        Self {
            integral: 0,
            state: ButtonState::Released,
        }
    }

    /// Feed one raw sample and return the (possibly updated) state.
    pub fn update(&mut self, raw_active: bool) -> ButtonState {
        if raw_active {
            if self.integral < MAX {
                self.integral = self.integral.saturating_add(1);
            }
            if self.integral >= MAX && self.state == ButtonState::Released {
                self.state = ButtonState::Pressed;
                #[cfg(feature = "defmt")]
                defmt::debug!("button pressed");
            }
        } else {
            self.integral = self.integral.saturating_sub(1);
            if self.integral == 0 && self.state == ButtonState::Pressed {
                self.state = ButtonState::Released;
                #[cfg(feature = "defmt")]
                defmt::debug!("button released");
            }
        }
        self.state
    }

    /// Current state without sampling.
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Current integral, `0..=MAX`.
    pub fn integral(&self) -> u8 {
        self.integral
    }
}

impl<const MAX: u8> Default for Debouncer<MAX> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_released() {
        let d = Debouncer::<DEBOUNCE_MAX>::new();
        assert_eq!(d.state(), ButtonState::Released);
        assert_eq!(d.integral(), 0);
    }

    #[test]
    fn test_press_needs_max_consecutive_active_samples() {
        let mut d = Debouncer::<DEBOUNCE_MAX>::new();
        for _ in 0..DEBOUNCE_MAX - 1 {
            assert_eq!(d.update(true), ButtonState::Released);
        }
        assert_eq!(d.update(true), ButtonState::Pressed);
        assert_eq!(d.integral(), DEBOUNCE_MAX);
    }

    #[test]
    fn test_integral_saturates_at_max() {
        let mut d = Debouncer::<10>::new();
        for _ in 0..100 {
            d.update(true);
        }
        assert_eq!(d.integral(), 10);
        assert_eq!(d.state(), ButtonState::Pressed);
    }

    #[test]
    fn test_release_needs_full_drain() {
        let mut d = Debouncer::<10>::new();
        for _ in 0..10 {
            d.update(true);
        }
        for _ in 0..9 {
            assert_eq!(d.update(false), ButtonState::Pressed);
        }
        assert_eq!(d.update(false), ButtonState::Released);
        assert_eq!(d.integral(), 0);
    }

    #[test]
    fn test_integral_never_underflows() {
        let mut d = Debouncer::<10>::new();
        for _ in 0..5 {
            assert_eq!(d.update(false), ButtonState::Released);
        }
        assert_eq!(d.integral(), 0);
    }

    #[test]
    fn test_bounce_in_middle_band_holds_state() {
        let mut d = Debouncer::<10>::new();
        for _ in 0..5 {
            d.update(true);
        }
        // Alternating samples: integral oscillates 5 ↔ 6, never reaches a rail.
        for i in 0..1000 {
            assert_eq!(d.update(i % 2 == 0), ButtonState::Released);
        }

        for _ in 0..10 {
            d.update(true);
        }
        assert_eq!(d.state(), ButtonState::Pressed);
        for i in 0..1000 {
            assert_eq!(d.update(i % 2 == 0), ButtonState::Pressed);
        }
    }

    #[test]
    fn test_glitch_delays_press() {
        let mut d = Debouncer::<10>::new();
        for _ in 0..9 {
            d.update(true);
        }
        d.update(false); // integral 8
        assert_eq!(d.update(true), ButtonState::Released); // 9
        assert_eq!(d.update(true), ButtonState::Pressed); // 10
    }
}
