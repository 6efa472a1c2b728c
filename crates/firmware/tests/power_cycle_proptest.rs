//! Property: whatever the loop has confirmed when power fails is what the
//! next boot restores, for any starting count and burst of pulses.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use counter::{CounterRecord, RedundantStore, SETTLE_TICKS};
use firmware::{boot, ControlLoop, PowerLossHandler, Shared};
use platform::mocks::{MockButton, MockEeprom, MockSegmentSink, MockWatchdog};
use platform::AtomicTally;
use proptest::prelude::*;

fn eeprom_with(value: u16) -> MockEeprom {
    let mut store = RedundantStore::<MockEeprom>::new(MockEeprom::new()).unwrap();
    store.write(&CounterRecord(value).to_bytes()).unwrap();
    store.release()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn confirmed_count_survives_reboot(start in 0u16..=999, pulses in 0u16..=999) {
        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut store = RedundantStore::new(eeprom_with(start)).unwrap();
        prop_assert_eq!(boot::restore(&mut store, &tally, &shared).unwrap(), start);

        let mut app = ControlLoop::new(&shared, &tally, MockButton::new(), MockWatchdog::new());
        for _ in 0..pulses {
            tally.increment();
        }
        for _ in 0..usize::from(SETTLE_TICKS) + 2 {
            app.tick().unwrap();
        }
        drop(app);

        // Past 999 the overflow guard zeroes the tally before it settles.
        let total = start + pulses;
        let expected = if total > 999 { 0 } else { total };
        prop_assert_eq!(shared.confirmed().unwrap(), expected);

        let mut handler = PowerLossHandler::new(store);
        handler.on_power_loss(&shared).unwrap();
        let eeprom = handler.release().release();

        let tally = AtomicTally::new();
        let shared = Shared::new(MockSegmentSink::new());
        let mut store = RedundantStore::new(eeprom).unwrap();
        prop_assert_eq!(boot::restore(&mut store, &tally, &shared).unwrap(), expected);
    }
}
