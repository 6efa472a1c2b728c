//! Multiplexed 7-segment display abstraction
//!
//! Three digits share eight segment lines. Only one digit's common line is
//! enabled at a time; the control loop advances the active digit every
//! iteration and persistence of vision does the rest.
//!
//! The eight lines are wired as two groups:
//!
//! | Group | Lines                        | Argument of [`SegmentSink::show`] |
//! |-------|------------------------------|-----------------------------------|
//! | segment port | a..f                  | `segments`, bits 0..=5            |
//! | auxiliary    | g, decimal point      | `aux`, bits 0..=1                 |

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::DIGIT_COUNT;

/// Digit position, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Digit {
    /// Leftmost digit
    #[default]
    Hundreds,
    /// Middle digit
    Tens,
    /// Rightmost digit
    Units,
}

impl Digit {
    /// All positions in scan order.
    pub const ALL: [Digit; DIGIT_COUNT] = [Digit::Hundreds, Digit::Tens, Digit::Units];

    /// Common-line index (0, 1, 2).
    pub const fn index(self) -> usize {
        match self {
            Self::Hundreds => 0,
            Self::Tens => 1,
            Self::Units => 2,
        }
    }

    /// Next position in the scan: 0 → 1 → 2 → 0.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Hundreds => Self::Tens,
            Self::Tens => Self::Units,
            Self::Units => Self::Hundreds,
        }
    }
}

/// Display output sink.
pub trait SegmentSink {
    /// Error type
    type Error: core::fmt::Debug;

    /// Drive one digit: disable every common, load `segments` (a..f) and
    /// `aux` (g, dp) onto their lines, then enable the common for `digit`.
    ///
    /// Commons go dark before the segments change so the previous digit never
    /// shows the new pattern (ghosting). Bits above each group's width are
    /// ignored.
    fn show(&mut self, digit: Digit, segments: u8, aux: u8) -> Result<(), Self::Error>;

    /// Disable every common and clear every segment line.
    fn blank(&mut self) -> Result<(), Self::Error>;
}

impl<S: SegmentSink + ?Sized> SegmentSink for &mut S {
    type Error = S::Error;

    fn show(&mut self, digit: Digit, segments: u8, aux: u8) -> Result<(), Self::Error> {
        (**self).show(digit, segments, aux)
    }

    fn blank(&mut self) -> Result<(), Self::Error> {
        (**self).blank()
    }
}

/// Errors from [`GpioSegmentDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentError<E> {
    /// Failed to drive a common (digit enable) line
    Common(E),
    /// Failed to drive a segment or auxiliary line
    Segment(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for SegmentError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Common(_) => f.write_str("display common line write failed"),
            Self::Segment(_) => f.write_str("display segment line write failed"),
        }
    }
}

/// Lines on the segment port (a..f).
pub const SEGMENT_LINES: usize = 6;

/// Auxiliary lines (g, decimal point).
pub const AUX_LINES: usize = 2;

/// [`SegmentSink`] over plain GPIO outputs.
///
/// Commons and segments are active high.
pub struct GpioSegmentDisplay<P> {
    commons: [P; DIGIT_COUNT],
    segments: [P; SEGMENT_LINES],
    aux: [P; AUX_LINES],
}

impl<P: OutputPin> GpioSegmentDisplay<P> {
    /// Build from the three common lines (hundreds, tens, units), the six
    /// segment-port lines (a..f) and the two auxiliary lines (g, dp).
    pub fn new(
        commons: [P; DIGIT_COUNT],
        segments: [P; SEGMENT_LINES],
        aux: [P; AUX_LINES],
    ) -> Self {
        Self {
            commons,
            segments,
            aux,
        }
    }

    /// Give the pins back.
    pub fn release(self) -> ([P; DIGIT_COUNT], [P; SEGMENT_LINES], [P; AUX_LINES]) {
        (self.commons, self.segments, self.aux)
    }

    fn commons_off(&mut self) -> Result<(), SegmentError<P::Error>> {
        for common in &mut self.commons {
            common.set_low().map_err(SegmentError::Common)?;
        }
        Ok(())
    }

    fn load_segments(&mut self, segments: u8, aux: u8) -> Result<(), SegmentError<P::Error>> {
        drive(&mut self.segments, segments)?;
        drive(&mut self.aux, aux)
    }
}

/// Line `n` follows bit `n` of `bits`.
fn drive<P: OutputPin>(lines: &mut [P], bits: u8) -> Result<(), SegmentError<P::Error>> {
    for (bit, line) in lines.iter_mut().enumerate() {
        let lit = bits & (1 << bit) != 0;
        line.set_state(PinState::from(lit))
            .map_err(SegmentError::Segment)?;
    }
    Ok(())
}

impl<P: OutputPin> SegmentSink for GpioSegmentDisplay<P> {
    type Error = SegmentError<P::Error>;

    fn show(&mut self, digit: Digit, segments: u8, aux: u8) -> Result<(), Self::Error> {
        self.commons_off()?;
        self.load_segments(segments, aux)?;
        if let Some(common) = self.commons.get_mut(digit.index()) {
            common.set_high().map_err(SegmentError::Common)?;
        }
        Ok(())
    }

    fn blank(&mut self) -> Result<(), Self::Error> {
        self.commons_off()?;
        self.load_segments(0, 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    fn off() -> PinMock {
        PinMock::new(&[Transaction::set(State::Low)])
    }

    fn on() -> PinMock {
        PinMock::new(&[Transaction::set(State::High)])
    }

    fn on_after_off() -> PinMock {
        PinMock::new(&[Transaction::set(State::Low), Transaction::set(State::High)])
    }

    #[test]
    fn test_digit_scan_order() {
        assert_eq!(Digit::Hundreds.next(), Digit::Tens);
        assert_eq!(Digit::Tens.next(), Digit::Units);
        assert_eq!(Digit::Units.next(), Digit::Hundreds);
        for (i, d) in Digit::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    fn finish(display: GpioSegmentDisplay<PinMock>) {
        let (mut commons, mut segments, mut aux) = display.release();
        for pin in commons
            .iter_mut()
            .chain(segments.iter_mut())
            .chain(aux.iter_mut())
        {
            pin.done();
        }
    }

    #[test]
    fn test_show_blanks_commons_then_drives_one_digit() {
        // "7": a, b, c on the segment port, nothing on aux.
        let commons = [off(), on_after_off(), off()];
        let segments = [on(), on(), on(), off(), off(), off()];
        let aux = [off(), off()];
        let mut display = GpioSegmentDisplay::new(commons, segments, aux);

        display.show(Digit::Tens, 0b00_0111, 0b00).unwrap();

        finish(display);
    }

    #[test]
    fn test_aux_lines_carry_g_and_dp() {
        // "8": a..f on the segment port, g on aux line 0, dp dark.
        let commons = [off(), off(), on_after_off()];
        let segments = [on(), on(), on(), on(), on(), on()];
        let aux = [on(), off()];
        let mut display = GpioSegmentDisplay::new(commons, segments, aux);

        display.show(Digit::Units, 0b11_1111, 0b01).unwrap();

        finish(display);
    }

    #[test]
    fn test_blank_clears_everything() {
        let commons = [off(), off(), off()];
        let segments = [off(), off(), off(), off(), off(), off()];
        let aux = [off(), off()];
        let mut display = GpioSegmentDisplay::new(commons, segments, aux);

        display.blank().unwrap();

        finish(display);
    }
}
