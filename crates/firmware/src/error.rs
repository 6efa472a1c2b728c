//! Firmware-level error type.
//!
//! Peripheral drivers each carry their own generic error; at this layer the
//! loop only needs to know which boundary failed so it can log it and carry
//! on. Detail that matters is logged at the conversion site.

use counter::StoreError;

/// Boundary failures surfaced by the control loop, power-loss handler and
/// boot restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A display line could not be driven
    Display,
    /// The raw button line could not be read
    Button,
    /// The non-volatile medium reported an I/O error
    Storage,
    /// The replica set does not fit the non-volatile medium
    StorageLayout,
    /// Shared state was already borrowed by the current context
    Reentrant,
}

impl Error {
    /// Collapse a redundant-store error into the firmware error.
    pub fn from_store<E: core::fmt::Debug>(err: StoreError<E>) -> Self {
        match err {
            StoreError::Storage(_) => Self::Storage,
            StoreError::OutOfBounds => Self::StorageLayout,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Display => f.write_str("display write failed"),
            Self::Button => f.write_str("button read failed"),
            Self::Storage => f.write_str("non-volatile storage I/O failed"),
            Self::StorageLayout => f.write_str("record layout exceeds storage"),
            Self::Reentrant => f.write_str("shared state already in use"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_by_kind() {
        assert_eq!(Error::from_store(StoreError::Storage(())), Error::Storage);
        assert_eq!(
            Error::from_store(StoreError::<()>::OutOfBounds),
            Error::StorageLayout
        );
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Error::Reentrant.to_string(), "shared state already in use");
    }
}
