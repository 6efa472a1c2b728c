//! Settle window between the live tally and the confirmed counter.
//!
//! The tally register is advanced by the same physical edge that may also
//! trip the power-sense line. Reading it straight into the persisted value
//! could capture an increment that raced the shutdown and produce an
//! off-by-one on the next boot. The sampler therefore only accepts a new
//! tally value once it has read the same value for `SETTLE` consecutive
//! ticks.

/// Ticks a new tally value must hold before it is confirmed.
pub const SETTLE_TICKS: u8 = u8::MAX;

/// Tracks the confirmed counter and how long a differing tally has held.
#[derive(Debug, Clone)]
pub struct CounterSampler<const SETTLE: u8 = SETTLE_TICKS> {
    confirmed: u16,
    candidate: u16,
    stability: u8,
}

impl<const SETTLE: u8> CounterSampler<SETTLE> {
    /// Start from a known confirmed value (restored from storage).
    pub const fn new(confirmed: u16) -> Self {
        Self {
            confirmed,
            candidate: confirmed,
            stability: 0,
        }
    }

    /// Feed one tally reading; returns the confirmed value after this tick.
    ///
    /// - Tally equals the confirmed value: stability clears, nothing changes.
    /// - Tally differs: stability advances while the tally keeps the same
    ///   value and restarts at one whenever it moves. When stability reaches
    ///   `SETTLE` the tally becomes the confirmed value and stability clears.
    pub fn sample(&mut self, hardware_tally: u16) -> u16 {
        if hardware_tally == self.confirmed {
            self.candidate = hardware_tally;
            self.stability = 0;
            return self.confirmed;
        }

        if hardware_tally == self.candidate {
            self.stability = self.stability.saturating_add(1);
        } else {
            self.candidate = hardware_tally;
            self.stability = 1;
        }

        if self.stability >= SETTLE {
            self.confirmed = hardware_tally;
            self.stability = 0;
            #[cfg(feature = "defmt")]
            defmt::trace!("confirmed counter={=u16}", hardware_tally);
        }
        self.confirmed
    }

    /// Last confirmed value.
    pub fn confirmed(&self) -> u16 {
        self.confirmed
    }

    /// Consecutive ticks the current candidate has held.
    pub fn stability(&self) -> u8 {
        self.stability
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_tally_keeps_confirmed() {
        let mut s = CounterSampler::<SETTLE_TICKS>::new(37);
        for _ in 0..1000 {
            assert_eq!(s.sample(37), 37);
            assert_eq!(s.stability(), 0);
        }
    }

    #[test]
    fn test_new_value_confirms_after_full_window() {
        let mut s = CounterSampler::<SETTLE_TICKS>::new(0);
        for tick in 1..SETTLE_TICKS {
            assert_eq!(s.sample(5), 0, "confirmed early at tick {tick}");
            assert_eq!(s.stability(), tick);
        }
        assert_eq!(s.sample(5), 5);
        assert_eq!(s.stability(), 0);
        assert_eq!(s.confirmed(), 5);
    }

    #[test]
    fn test_moving_tally_restarts_window() {
        let mut s = CounterSampler::<4>::new(0);
        s.sample(1);
        s.sample(1);
        s.sample(1); // stability 3
        assert_eq!(s.sample(2), 0); // moved: stability 1
        assert_eq!(s.stability(), 1);
        s.sample(2);
        s.sample(2);
        assert_eq!(s.sample(2), 2);
    }

    #[test]
    fn test_tally_changing_every_tick_never_confirms() {
        let mut s = CounterSampler::<SETTLE_TICKS>::new(0);
        for tally in 1..=5000u16 {
            assert_eq!(s.sample(tally), 0);
        }
    }

    #[test]
    fn test_returning_to_confirmed_cancels_pending_value() {
        let mut s = CounterSampler::<4>::new(10);
        s.sample(11);
        s.sample(11);
        s.sample(11);
        assert_eq!(s.sample(10), 10);
        assert_eq!(s.stability(), 0);
        // 11 must settle again from scratch
        s.sample(11);
        s.sample(11);
        s.sample(11);
        assert_eq!(s.confirmed(), 10);
        assert_eq!(s.sample(11), 11);
    }
}
