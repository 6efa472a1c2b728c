//! Main control loop.
//!
//! One call to [`ControlLoop::tick`] is one iteration, always in this order:
//!
//! 1. debounced press held: clear the tally
//! 2. tally above [`COUNTER_MAX`]: clear the tally
//! 3. sampler folds the tally into the confirmed counter
//! 4. advance one digit and drive it with the rendered confirmed value
//! 5. sample and debounce the raw button line
//! 6. feed the watchdog
//!
//! Step 1 acts on the state left by step 5 of the previous iteration. The
//! tally is cleared on every iteration while the button stays pressed, so
//! pulses arriving during a held press are discarded.
//!
//! A boundary failure in steps 4 or 5 does not cut the iteration short: the
//! remaining steps still run and the watchdog is still fed. The first error
//! is returned for logging.

use counter::{render, ButtonState, Debouncer, Glyph};
use platform::config::COUNTER_MAX;
use platform::{Digit, PulseTally, RawButton, SegmentSink, Watchdog};

use crate::{Error, Shared};

/// The control loop and everything only it owns.
pub struct ControlLoop<'a, T, B, W, D> {
    shared: &'a Shared<D>,
    tally: T,
    button: B,
    watchdog: W,
    debouncer: Debouncer,
    digit: Digit,
}

impl<'a, T, B, W, D> ControlLoop<'a, T, B, W, D>
where
    T: PulseTally,
    B: RawButton,
    W: Watchdog,
    D: SegmentSink,
{
    /// Wire the loop. The first iteration drives the tens digit.
    pub fn new(shared: &'a Shared<D>, tally: T, button: B, watchdog: W) -> Self {
        Self {
            shared,
            tally,
            button,
            watchdog,
            debouncer: Debouncer::new(),
            digit: Digit::Hundreds,
        }
    }

    /// Run one iteration.
    pub fn tick(&mut self) -> Result<(), Error> {
        // 1. reset on press
        if self.debouncer.state() == ButtonState::Pressed {
            self.tally.reset();
        }

        // 2. overflow guard
        if self.tally.count() > COUNTER_MAX {
            self.tally.reset();
            #[cfg(feature = "defmt")]
            defmt::debug!("tally overflow, cleared");
        }

        // 3. settle window
        let tally = self.tally.count();
        let confirmed = self.shared.with(|s| s.sampler.sample(tally))?;

        // 4. multiplex one digit
        self.digit = self.digit.next();
        let digit = self.digit;
        let glyph = render(confirmed)
            .get(digit.index())
            .copied()
            .unwrap_or(Glyph::BLANK);
        let shown = self
            .shared
            .with(|s| {
                s.display
                    .show(digit, glyph.segments(), glyph.aux())
                    .map_err(|_| Error::Display)
            })
            .and_then(|r| r);
        #[cfg(feature = "defmt")]
        defmt::trace!("digit {=usize} <- {=u8:#04x}", digit.index(), glyph.bits());

        // 5. debounce
        // A failed read counts as an inactive sample.
        let raw = self.button.is_active();
        self.debouncer.update(matches!(raw, Ok(true)));
        let sampled = raw.map(drop).map_err(|_| Error::Button);

        // 6. liveness
        self.watchdog.feed();

        shown.and(sampled)
    }

    /// Debounced button state after the last iteration.
    pub fn button_state(&self) -> ButtonState {
        self.debouncer.state()
    }

    /// Digit driven by the last iteration.
    pub fn digit(&self) -> Digit {
        self.digit
    }

    /// The pulse tally.
    pub fn tally(&self) -> &T {
        &self.tally
    }

    /// The raw button line.
    pub fn button_mut(&mut self) -> &mut B {
        &mut self.button
    }

    /// The watchdog.
    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use counter::{Glyph, DEBOUNCE_MAX, SETTLE_TICKS};
    use platform::mocks::{Frame, MockButton, MockSegmentSink, MockWatchdog};
    use platform::AtomicTally;

    type Loop<'a, D = MockSegmentSink> = ControlLoop<'a, &'a AtomicTally, MockButton, MockWatchdog, D>;

    fn run<D: SegmentSink>(app: &mut Loop<'_, D>, n: usize) {
        for _ in 0..n {
            app.tick().unwrap();
        }
    }

    fn pulses(tally: &AtomicTally, n: u16) {
        for _ in 0..n {
            tally.increment();
        }
    }

    #[test]
    fn test_digit_scan_order() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        let mut seen = Vec::new();
        for _ in 0..6 {
            app.tick().unwrap();
            seen.push(app.digit());
        }
        assert_eq!(
            seen,
            [
                Digit::Tens,
                Digit::Units,
                Digit::Hundreds,
                Digit::Tens,
                Digit::Units,
                Digit::Hundreds
            ]
        );
    }

    #[test]
    fn test_one_frame_per_iteration() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());
        run(&mut app, 3);
        let frames = shared.with(|s| s.display.frames().to_vec()).unwrap();
        let zero = Glyph::from_digit(0).bits();
        assert_eq!(
            frames,
            [
                Frame::Digit(Digit::Tens, 0),
                Frame::Digit(Digit::Units, zero),
                Frame::Digit(Digit::Hundreds, 0),
            ]
        );
    }

    #[test]
    fn test_watchdog_fed_every_iteration() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());
        run(&mut app, 10);
        assert_eq!(app.watchdog().feeds(), 10);
    }

    #[test]
    fn test_pulses_settle_then_display() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        pulses(&tally, 37);
        run(&mut app, usize::from(SETTLE_TICKS) - 1);
        assert_eq!(shared.confirmed().unwrap(), 0);
        run(&mut app, 1);
        assert_eq!(shared.confirmed().unwrap(), 37);

        run(&mut app, 3);
        let latched = shared.with(|s| s.display.latched()).unwrap();
        assert_eq!(
            latched,
            [0, Glyph::from_digit(3).bits(), Glyph::from_digit(7).bits()]
        );
    }

    #[test]
    fn test_held_press_clears_tally() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        pulses(&tally, 12);
        app.button_mut().set_held(true);
        run(&mut app, usize::from(DEBOUNCE_MAX));
        assert_eq!(app.button_state(), ButtonState::Pressed);
        assert_eq!(tally.count(), 12);

        run(&mut app, 1);
        assert_eq!(tally.count(), 0);

        // Pulses during the press are discarded.
        pulses(&tally, 5);
        run(&mut app, 1);
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn test_short_press_does_nothing() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        pulses(&tally, 12);
        app.button_mut().set_held(true);
        run(&mut app, 100);
        app.button_mut().set_held(false);
        run(&mut app, 300);
        assert_eq!(app.button_state(), ButtonState::Released);
        assert_eq!(tally.count(), 12);
    }

    #[test]
    fn test_overflow_clears_tally() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        tally.preset(COUNTER_MAX);
        run(&mut app, 1);
        assert_eq!(tally.count(), COUNTER_MAX);
        tally.increment();
        run(&mut app, 1);
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn test_out_of_range_confirmed_shows_err_until_settled() {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        shared.set_confirmed(4321).unwrap();
        tally.preset(4321);
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        run(&mut app, 3);
        let err = [Glyph::E.bits(), Glyph::R.bits(), Glyph::R.bits()];
        assert_eq!(shared.with(|s| s.display.latched()).unwrap(), err);

        run(&mut app, usize::from(SETTLE_TICKS));
        assert_eq!(shared.confirmed().unwrap(), 0);
    }

    /// Records the raw port arguments of every `show`.
    #[derive(Default)]
    struct PortSink(Vec<(Digit, u8, u8)>);

    impl SegmentSink for PortSink {
        type Error = core::convert::Infallible;

        fn show(&mut self, digit: Digit, segments: u8, aux: u8) -> Result<(), Self::Error> {
            self.0.push((digit, segments, aux));
            Ok(())
        }

        fn blank(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_glyph_split_across_segment_port_and_aux() {
        let tally = AtomicTally::new();
        let shared = Shared::new(PortSink::default());
        shared.set_confirmed(18).unwrap();
        tally.preset(18);
        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());

        run(&mut app, 3);
        let calls = shared.with(|s| s.display.0.clone()).unwrap();
        assert_eq!(
            calls,
            [
                // "1": b, c only.
                (Digit::Tens, 0b00_0110, 0b00),
                // "8": a..f on the port, g on aux line 0.
                (Digit::Units, 0b11_1111, 0b01),
                (Digit::Hundreds, 0, 0),
            ]
        );
    }
}
