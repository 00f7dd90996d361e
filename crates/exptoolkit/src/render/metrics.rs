//! Helvetica advance widths.
//!
//! Documents are set in the standard Helvetica faces, which PDF viewers
//! supply without embedding. Widths come from the Adobe font metrics for
//! Helvetica and Helvetica-Bold, in thousandths of an em; the oblique face
//! shares the regular widths.
//!
//! Glyphs the standard fonts cannot show are substituted before printing
//! (see [`substitute`]) and measured as their substitutes.

use super::FontWeight;

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Width used for characters outside the tables.
const FALLBACK_WIDTH: u16 = 556;

/// Regular widths for U+0020..=U+007E.
#[rustfmt::skip]
const REGULAR: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Bold widths for U+0020..=U+007E.
#[rustfmt::skip]
const BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Printable replacement for a glyph the standard fonts lack.
#[must_use]
pub fn substitute(ch: char) -> Option<&'static str> {
    match ch {
        '☑' | '☒' | '✓' | '✔' => Some("[x]"),
        '☐' => Some("[ ]"),
        '≤' => Some("<="),
        '≥' => Some(">="),
        '\t' => Some(" "),
        _ => None,
    }
}

fn char_units(ch: char, weight: FontWeight) -> u32 {
    if let Some(replacement) = substitute(ch) {
        return replacement.chars().map(|c| char_units(c, weight)).sum();
    }

    let table = match weight {
        FontWeight::Bold => &BOLD,
        FontWeight::Regular | FontWeight::Italic => &REGULAR,
    };
    let width = match ch {
        ' '..='~' => table[ch as usize - 0x20],
        '—' | '…' | '™' => 1000,
        '•' => 350,
        '‘' | '’' | '‚' => 222,
        '“' | '”' | '„' => 333,
        _ => FALLBACK_WIDTH,
    };
    u32::from(width)
}

/// Printed width of `text` in millimetres.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_width(text: &str, font_size: f32, weight: FontWeight) -> f32 {
    let units: u32 = text.chars().map(|ch| char_units(ch, weight)).sum();
    units as f32 / 1000.0 * font_size * MM_PER_PT
}
