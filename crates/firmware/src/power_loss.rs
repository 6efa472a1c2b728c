//! Power-loss flush.
//!
//! Runs on the falling edge of the power-sense line, with whatever charge is
//! left in the supply capacitors. Inside one critical section it darkens the
//! display (the largest load on the rail) and writes the confirmed counter
//! to the redundant store. It never touches the loop's private state.

use counter::{CounterRecord, RedundantStore};
use embedded_storage::Storage;
use platform::SegmentSink;

use crate::{Error, Shared};

/// Owns the store the confirmed counter is flushed to.
pub struct PowerLossHandler<S> {
    store: RedundantStore<S>,
}

impl<S> PowerLossHandler<S>
where
    S: Storage,
    S::Error: core::fmt::Debug,
{
    /// Wrap a store already validated against its medium.
    pub fn new(store: RedundantStore<S>) -> Self {
        Self { store }
    }

    /// Blank the display and persist the confirmed counter.
    ///
    /// Returns the number of physical byte writes; zero when the stored
    /// record already matches. The write is attempted even if blanking
    /// fails, and a storage failure takes precedence in the result.
    pub fn on_power_loss<D: SegmentSink>(&mut self, shared: &Shared<D>) -> Result<usize, Error> {
        let store = &mut self.store;
        shared.with(|state| {
            let blanked = state.display.blank().map_err(|_| Error::Display);
            let record = CounterRecord(state.sampler.confirmed());
            let writes = store.write(&record.to_bytes()).map_err(Error::from_store)?;
            #[cfg(feature = "defmt")]
            defmt::info!("power loss: flushed {} ({=usize} writes)", record, writes);
            blanked.map(|()| writes)
        })?
    }

    /// The store being flushed to.
    pub fn store(&self) -> &RedundantStore<S> {
        &self.store
    }

    /// Give the store back.
    pub fn release(self) -> RedundantStore<S> {
        self.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{Frame, MockEeprom, MockSegmentSink};

    fn handler() -> PowerLossHandler<MockEeprom> {
        PowerLossHandler::new(RedundantStore::new(MockEeprom::new()).unwrap())
    }

    #[test]
    fn test_blanks_then_persists() {
        let shared = Shared::new(MockSegmentSink::new());
        shared.set_confirmed(37).unwrap();
        let mut h = handler();

        assert_eq!(h.on_power_loss(&shared).unwrap(), 10);
        let (frames, lit) = shared
            .with(|s| (s.display.frames().to_vec(), s.display.is_lit()))
            .unwrap();
        assert_eq!(frames, [Frame::Blank]);
        assert!(!lit);

        let mut store = h.release();
        assert_eq!(CounterRecord::from_bytes(store.read().unwrap()), CounterRecord(37));
    }

    #[test]
    fn test_repeat_flush_writes_nothing() {
        let shared = Shared::new(MockSegmentSink::new());
        shared.set_confirmed(250).unwrap();
        let mut h = handler();
        h.on_power_loss(&shared).unwrap();
        assert_eq!(h.on_power_loss(&shared).unwrap(), 0);
    }

    #[test]
    fn test_flush_while_state_borrowed_is_refused() {
        let shared = Shared::new(MockSegmentSink::new());
        let mut h = handler();
        let nested = shared.with(|_| h.on_power_loss(&shared)).unwrap();
        assert_eq!(nested, Err(Error::Reentrant));
        assert_eq!(h.store().storage().byte_writes(), 0);
    }
}
