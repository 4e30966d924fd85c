//! Metrics for the base-14 Helvetica family.
//!
//! Every PDF viewer ships these fonts, so nothing is embedded: the writer only
//! references them by name and text is encoded as WinAnsi bytes. Widths are the
//! Adobe AFM advance widths in thousandths of an em.

use crate::units::Pt;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuiltinFont {
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Helvetica-Bold")]
    HelveticaBold,
    #[serde(rename = "Helvetica-Oblique")]
    HelveticaOblique,
    #[serde(rename = "Helvetica-BoldOblique")]
    HelveticaBoldOblique,
}

impl Default for BuiltinFont {
    fn default() -> Self {
        BuiltinFont::Helvetica
    }
}

const ASCENT: f32 = 718.0;
const DEFAULT_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl BuiltinFont {
    /// The PostScript name used as the PDF `/BaseFont`
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
            BuiltinFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Name of the font in a page's resource dictionary
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            BuiltinFont::Helvetica => b"F1",
            BuiltinFont::HelveticaBold => b"F2",
            BuiltinFont::HelveticaOblique => b"F3",
            BuiltinFont::HelveticaBoldOblique => b"F4",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            BuiltinFont::HelveticaBold | BuiltinFont::HelveticaBoldOblique
        )
    }

    pub fn is_italic(&self) -> bool {
        matches!(
            self,
            BuiltinFont::HelveticaOblique | BuiltinFont::HelveticaBoldOblique
        )
    }

    /// Picks the family member with the requested weight and slant
    pub fn variant(bold: bool, italic: bool) -> BuiltinFont {
        match (bold, italic) {
            (false, false) => BuiltinFont::Helvetica,
            (true, false) => BuiltinFont::HelveticaBold,
            (false, true) => BuiltinFont::HelveticaOblique,
            (true, true) => BuiltinFont::HelveticaBoldOblique,
        }
    }

    /// Same font with extra weight/slant layered on (used by inline markup)
    pub fn with_emphasis(&self, bold: bool, italic: bool) -> BuiltinFont {
        BuiltinFont::variant(self.is_bold() || bold, self.is_italic() || italic)
    }

    fn byte_width(&self, byte: u8) -> u16 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            0x95 => 350,
            0x96 => 556,
            0x97 | 0x85 | 0x89 => 1000,
            0x91 | 0x92 if self.is_bold() => 278,
            0x91 | 0x92 => 222,
            0x93 | 0x94 if self.is_bold() => 500,
            0x93 | 0x94 => 333,
            0xA0 => 278,
            0xA9 | 0xAE => 737,
            0xB0 => 400,
            _ => DEFAULT_WIDTH,
        }
    }

    pub fn width_of_text(&self, text: &str, size: Pt) -> Pt {
        let units: u32 = encode(text)
            .into_iter()
            .map(|b| self.byte_width(b) as u32)
            .sum();
        Pt(units as f32 * *size / 1000.0)
    }

    pub fn ascent(&self, size: Pt) -> Pt {
        size * (ASCENT / 1000.0)
    }
}

/// Encodes text as WinAnsi bytes; characters outside the code page become `?`
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‰' => 0x89,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '\t' => b' ',
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_measure_text() {
        // "Hi" = H(722) + i(222)
        let w = BuiltinFont::Helvetica.width_of_text("Hi", Pt(10.0));
        assert!((w.0 - 9.44).abs() < 1e-4);
        // bold i is wider
        let w = BuiltinFont::HelveticaBold.width_of_text("Hi", Pt(10.0));
        assert!((w.0 - 10.0).abs() < 1e-4);
        assert_eq!(BuiltinFont::Helvetica.width_of_text("", Pt(12.0)), Pt(0.0));
    }

    #[test]
    fn oblique_shares_upright_widths() {
        let text = "The quick brown fox";
        assert_eq!(
            BuiltinFont::Helvetica.width_of_text(text, Pt(12.0)),
            BuiltinFont::HelveticaOblique.width_of_text(text, Pt(12.0))
        );
    }

    #[test]
    fn can_encode_winansi() {
        assert_eq!(encode("A•b"), vec![b'A', 0x95, b'b']);
        assert_eq!(encode("é"), vec![0xE9]);
        assert_eq!(encode("日"), vec![b'?']);
        let bullet = BuiltinFont::Helvetica.width_of_text("•", Pt(1000.0));
        assert_eq!(bullet, Pt(350.0));
    }

    #[test]
    fn can_pick_variants() {
        assert_eq!(BuiltinFont::variant(true, true), BuiltinFont::HelveticaBoldOblique);
        assert_eq!(
            BuiltinFont::HelveticaBold.with_emphasis(false, true),
            BuiltinFont::HelveticaBoldOblique
        );
        assert_eq!(BuiltinFont::HelveticaBold.base_name(), "Helvetica-Bold");
    }
}
