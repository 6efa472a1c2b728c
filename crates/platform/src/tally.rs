//! Hardware pulse tally abstraction
//!
//! The tally is a free-running counter advanced by external pulses,
//! asynchronously with respect to the control loop. The loop may read it,
//! clear it (reset button, overflow guard) and preset it (boot restore).

use core::sync::atomic::{AtomicU16, Ordering};

/// Read/reset-able pulse counter register.
pub trait PulseTally {
    /// Current raw count.
    fn count(&self) -> u16;

    /// Clear the count to zero.
    fn reset(&self);

    /// Load an arbitrary value into the count.
    fn preset(&self, value: u16);
}

/// Pulse tally backed by an atomic word.
///
/// Stands in for the counter register on the host: the test harness or the
/// simulator calls [`AtomicTally::increment`]; the control loop owns the
/// [`PulseTally`] side. Every access is a single atomic operation, so a read
/// can never observe half of an increment.
pub struct AtomicTally {
    count: AtomicU16,
}

impl AtomicTally {
    /// Create a tally at zero. `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            count: AtomicU16::new(0),
        }
    }

    /// Register one pulse. Wraps at `u16::MAX` like a 16-bit timer register.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for AtomicTally {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseTally for AtomicTally {
    fn count(&self) -> u16 {
        self.count.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.count.store(0, Ordering::Release);
    }

    fn preset(&self, value: u16) {
        self.count.store(value, Ordering::Release);
    }
}

impl<T: PulseTally + ?Sized> PulseTally for &T {
    fn count(&self) -> u16 {
        (**self).count()
    }

    fn reset(&self) {
        (**self).reset();
    }

    fn preset(&self, value: u16) {
        (**self).preset(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_starts_at_zero() {
        assert_eq!(AtomicTally::new().count(), 0);
    }

    #[test]
    fn test_tally_increment_and_reset() {
        let tally = AtomicTally::new();
        for _ in 0..42 {
            tally.increment();
        }
        assert_eq!(tally.count(), 42);
        tally.reset();
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn test_tally_preset() {
        let tally = AtomicTally::new();
        tally.preset(37);
        tally.increment();
        assert_eq!(tally.count(), 38);
    }

    #[test]
    fn test_tally_wraps_like_a_timer_register() {
        let tally = AtomicTally::new();
        tally.preset(u16::MAX);
        tally.increment();
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn test_tally_through_shared_reference() {
        let tally = AtomicTally::new();
        let by_ref = &tally;
        by_ref.preset(5);
        assert_eq!(PulseTally::count(&by_ref), 5);
    }
}
