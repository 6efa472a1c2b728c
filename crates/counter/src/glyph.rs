//! 7-segment glyphs and the 3-digit renderer.
//!
//! Segment bit layout of a glyph byte:
//!
//! ```text
//!      a          bit 0 = a   bit 4 = e
//!    f   b        bit 1 = b   bit 5 = f
//!      g          bit 2 = c   bit 6 = g
//!    e   c        bit 3 = d   bit 7 = dp
//!      d   dp
//! ```
//!
//! The board splits a glyph across two ports: bits 0..=5 go to the segment
//! port, bits 6..=7 to the auxiliary lines. [`Glyph::segments`] and
//! [`Glyph::aux`] expose that split.

/// Largest renderable value.
pub const DISPLAY_MAX: u16 = 999;

/// One digit's segment pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Glyph(u8);

impl Glyph {
    /// All segments off
    pub const BLANK: Glyph = Glyph(0b0000_0000);
    /// Letter "E"
    pub const E: Glyph = Glyph(0b0111_1001);
    /// Letter "r"
    pub const R: Glyph = Glyph(0b0101_0000);

    /// Digits 0 through 9.
    pub const DIGITS: [Glyph; 10] = [
        Glyph(0b0011_1111),
        Glyph(0b0000_0110),
        Glyph(0b0101_1011),
        Glyph(0b0100_1111),
        Glyph(0b0110_0110),
        Glyph(0b0110_1101),
        Glyph(0b0111_1101),
        Glyph(0b0000_0111),
        Glyph(0b0111_1111),
        Glyph(0b0110_1111),
    ];

    /// Glyph for a decimal digit; anything above 9 is blank.
    pub fn from_digit(digit: u8) -> Self {
        Self::DIGITS
            .get(usize::from(digit))
            .copied()
            .unwrap_or(Self::BLANK)
    }

    /// The digit this glyph draws, if it is a digit.
    pub fn digit(self) -> Option<u8> {
        Self::DIGITS
            .iter()
            .position(|&g| g == self)
            .and_then(|i| u8::try_from(i).ok())
    }

    /// Full 8-bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Segment port bits (0..=5).
    pub const fn segments(self) -> u8 {
        self.0 & 0b0011_1111
    }

    /// Auxiliary field (bits 6..=7), shifted down to 0..=3.
    pub const fn aux(self) -> u8 {
        (self.0 & 0b1100_0000) >> 6
    }
}

/// Render `value` as (hundreds, tens, units).
///
/// Values above 999 render as `E r r`. Leading zeros are blanked: hundreds
/// first, then tens if hundreds was blanked. Units is always drawn.
#[allow(clippy::arithmetic_side_effects)] // divisors are non-zero literals
#[allow(clippy::cast_possible_truncation)] // each quotient is < 10 once value <= 999
pub fn render(value: u16) -> [Glyph; 3] {
    if value > DISPLAY_MAX {
        return [Glyph::E, Glyph::R, Glyph::R];
    }

    let units = (value % 10) as u8;
    let tens = ((value / 10) % 10) as u8;
    let hundreds = (value / 100) as u8;

    let mut glyphs = [
        Glyph::from_digit(hundreds),
        Glyph::from_digit(tens),
        Glyph::from_digit(units),
    ];

    let zero = Glyph::from_digit(0);
    if let [first, second, _] = &mut glyphs {
        if *first == zero {
            *first = Glyph::BLANK;
            if *second == zero {
                *second = Glyph::BLANK;
            }
        }
    }
    glyphs
}

/// All three digits dark.
pub fn render_blank() -> [Glyph; 3] {
    [Glyph::BLANK; 3]
}
