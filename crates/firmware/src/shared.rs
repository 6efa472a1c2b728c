//! State shared between the control loop and the power-loss handler.
//!
//! The confirmed counter (owned by the sampler) and the display sink are the
//! only things both contexts touch. They sit behind a blocking mutex whose
//! raw mutex is a critical section, so every access masks the power-loss
//! interrupt for its duration.
//!
//! The inner `RefCell` turns a nested access from the same context (a flush
//! started from inside another access) into [`Error::Reentrant`] instead of
//! an aliased `&mut`.

use core::cell::RefCell;

use counter::CounterSampler;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::Error;

/// Everything behind the lock.
pub struct SharedState<D> {
    /// Settle window and the confirmed counter it owns.
    pub sampler: CounterSampler,
    /// Display sink.
    pub display: D,
}

/// Critical-section guarded [`SharedState`].
pub struct Shared<D> {
    state: Mutex<CriticalSectionRawMutex, RefCell<SharedState<D>>>,
}

impl<D> Shared<D> {
    /// Confirmed counter starts at zero until boot restore replaces it.
    pub const fn new(display: D) -> Self {
        Self {
            state: Mutex::new(RefCell::new(SharedState {
                sampler: CounterSampler::new(0),
                display,
            })),
        }
    }

    /// Run `f` inside a critical section with exclusive access to the state.
    pub fn with<R>(&self, f: impl FnOnce(&mut SharedState<D>) -> R) -> Result<R, Error> {
        self.state.lock(|cell| {
            let mut state = cell.try_borrow_mut().map_err(|_| Error::Reentrant)?;
            Ok(f(&mut state))
        })
    }

    /// Current confirmed counter.
    pub fn confirmed(&self) -> Result<u16, Error> {
        self.with(|s| s.sampler.confirmed())
    }

    /// Replace the confirmed counter and clear any pending settle window.
    pub fn set_confirmed(&self, value: u16) -> Result<(), Error> {
        self.with(|s| s.sampler = CounterSampler::new(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockSegmentSink;

    #[test]
    fn test_starts_at_zero() {
        let shared = Shared::new(MockSegmentSink::new());
        assert_eq!(shared.confirmed().unwrap(), 0);
    }

    #[test]
    fn test_set_confirmed() {
        let shared = Shared::new(MockSegmentSink::new());
        shared.set_confirmed(412).unwrap();
        assert_eq!(shared.confirmed().unwrap(), 412);
        assert_eq!(shared.with(|s| s.sampler.stability()).unwrap(), 0);
    }

    #[test]
    fn test_nested_access_is_refused() {
        let shared = Shared::new(MockSegmentSink::new());
        let inner = shared.with(|_| shared.confirmed()).unwrap();
        assert_eq!(inner, Err(Error::Reentrant));
        // The outer borrow is released afterwards.
        assert!(shared.confirmed().is_ok());
    }
}
