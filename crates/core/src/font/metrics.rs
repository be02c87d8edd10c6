//! Standard 14 Helvetica metrics (AFM widths in 1/1000 em).
//!
//! Only the WinAnsi-compatible range is covered: printable ASCII and the
//! Latin-1 supplement. Anything else is written as `?` and measured as such.

use super::TextMeasure;

/// Widths for U+0020..=U+007E.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Widths for U+00A0..=U+00FF.
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

const REPLACEMENT: u8 = b'?';

/// Maps a character to its WinAnsi code, substituting `?` for characters
/// outside the supported range.
fn winansi_code(ch: char) -> u8 {
    match u32::from(ch) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => REPLACEMENT,
    }
}

/// Encodes text for a WinAnsiEncoding simple font.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars().map(winansi_code).collect()
}

/// Glyph width of a WinAnsi code in 1/1000 em.
fn code_width(code: u8) -> u16 {
    match code {
        0x20..=0x7E => ASCII_WIDTHS[usize::from(code - 0x20)],
        0xA0..=0xFF => LATIN1_WIDTHS[usize::from(code - 0xA0)],
        _ => ASCII_WIDTHS[usize::from(REPLACEMENT - 0x20)],
    }
}

/// The base-14 Helvetica font used for every label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Helvetica;

impl Helvetica {
    /// PDF base font name.
    pub const BASE_FONT: &'static str = "Helvetica";
}

impl TextMeasure for Helvetica {
    fn measure_text_width(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(code_width(winansi_code(ch))))
            .sum();
        f64::from(units) * font_size / 1000.0
    }
}
