//! Watchdog abstraction
//!
//! The watchdog is an external supervisor: once armed it restarts the whole
//! board unless it is fed within [`crate::config::WATCHDOG_TIMEOUT_MS`]. The
//! core's only obligation is to feed it once per loop iteration. A missed
//! deadline is the system's crash-recovery path, not an error to handle.

/// Liveness signal sink.
pub trait Watchdog {
    /// Signal "still alive". Must be cheap: called every loop iteration.
    fn feed(&mut self);
}

impl<W: Watchdog + ?Sized> Watchdog for &mut W {
    fn feed(&mut self) {
        (**self).feed();
    }
}
