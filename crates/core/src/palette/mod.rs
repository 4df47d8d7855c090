//! Glyph sets and the seven-entry colour palette shared by the particle
//! system and the renderers.

pub const GLYPHS_MID: [char; 4] = ['▒', '▓', '○', '●'];
pub const GLYPHS_HIGH: [char; 7] = ['█', '▀', '▄', '◆', '◇', '▲', '▼'];

pub const CYAN: u8 = 1;
pub const MAGENTA: u8 = 2;
pub const YELLOW: u8 = 3;
pub const GREEN: u8 = 4;
pub const RED: u8 = 5;
pub const BLUE: u8 = 6;
pub const WHITE: u8 = 7;

/// Number of usable colour indices; valid indices are `1..=PALETTE_SIZE`.
pub const PALETTE_SIZE: u8 = 7;

/// Glyphs a particle may be drawn with: the mid set followed by the high set.
pub fn spark_glyphs() -> impl Iterator<Item = char> {
    GLYPHS_MID.into_iter().chain(GLYPHS_HIGH)
}

/// Colour index plus emphasis for a single draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: u8,
    pub bold: bool,
}

impl Style {
    /// Plain style; out-of-range indices are clamped into the palette.
    pub fn color(color: u8) -> Self {
        Self {
            color: color.clamp(1, PALETTE_SIZE),
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}
