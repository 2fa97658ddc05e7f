/// The built-in Type 1 fonts this crate draws with. Built-ins are available
/// in every viewer without embedding, which keeps the output bytes
/// independent of any font file on the producing machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl BuiltinFont {
    /// PDF resource name used in content streams (e.g. "F1").
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
            BuiltinFont::HelveticaOblique => "F3",
        }
    }

    /// PDF BaseFont name.
    pub fn pdf_base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }
}

/// Font and size for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: BuiltinFont,
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font: BuiltinFont::Helvetica,
            font_size: 12.0,
        }
    }
}

impl TextStyle {
    pub fn new(font: BuiltinFont, font_size: f64) -> Self {
        TextStyle { font, font_size }
    }
}

/// Character widths for Helvetica (ASCII 32..=126) in units of 1/1000 em,
/// from the Adobe AFM data. Helvetica-Oblique shares these advances.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..126
];

/// Character widths for Helvetica-Bold (ASCII 32..=126) in 1/1000 em,
/// from the Adobe AFM data.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48..63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80..95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96..111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112..126
];

/// Advance for characters outside the mapped range (1/1000 em).
const DEFAULT_WIDTH: u16 = 278;

/// Metrics for the built-in fonts.
pub struct FontMetrics;

impl FontMetrics {
    /// Width of one character in 1/1000 em units.
    pub fn char_width(font: BuiltinFont, ch: char) -> u16 {
        let code = ch as u32;
        if !(32..=126).contains(&code) {
            return DEFAULT_WIDTH;
        }
        let index = (code - 32) as usize;
        match font {
            BuiltinFont::Helvetica | BuiltinFont::HelveticaOblique => HELVETICA_WIDTHS[index],
            BuiltinFont::HelveticaBold => HELVETICA_BOLD_WIDTHS[index],
        }
    }

    /// Width of a string in points at the given size.
    pub fn measure_text(text: &str, font: BuiltinFont, font_size: f64) -> f64 {
        let total: u32 = text.chars().map(|ch| Self::char_width(font, ch) as u32).sum();
        total as f64 * font_size / 1000.0
    }
}

/// Encode text as WinAnsi (CP-1252) bytes, the encoding the built-in font
/// dictionaries declare. Unmappable characters become `?` rather than
/// leaking multi-byte UTF-8 into the content stream.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    let cp = c as u32;
    match cp {
        0x20..=0x7e | 0xa0..=0xff => cp as u8,
        // The 0x80..0x9f window where CP-1252 departs from Latin-1.
        0x20ac => 0x80,
        0x201a => 0x82,
        0x0192 => 0x83,
        0x201e => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02c6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8a,
        0x2039 => 0x8b,
        0x0152 => 0x8c,
        0x017d => 0x8e,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201c => 0x93,
        0x201d => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02dc => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9a,
        0x203a => 0x9b,
        0x0153 => 0x9c,
        0x017e => 0x9e,
        0x0178 => 0x9f,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_are_distinct() {
        assert_eq!(BuiltinFont::Helvetica.pdf_name(), "F1");
        assert_eq!(BuiltinFont::HelveticaBold.pdf_name(), "F2");
        assert_eq!(BuiltinFont::HelveticaOblique.pdf_name(), "F3");
    }

    #[test]
    fn measure_uses_afm_advances() {
        // H=722 e=556 l=222 l=222 o=556 -> 2278/1000 * 10pt
        let w = FontMetrics::measure_text("Hello", BuiltinFont::Helvetica, 10.0);
        assert!((w - 22.78).abs() < 1e-9);
    }

    #[test]
    fn oblique_shares_regular_advances() {
        let a = FontMetrics::measure_text("Amount", BuiltinFont::Helvetica, 10.0);
        let b = FontMetrics::measure_text("Amount", BuiltinFont::HelveticaOblique, 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn bold_runs_wider_than_regular() {
        let regular = FontMetrics::measure_text("Subtotal:", BuiltinFont::Helvetica, 10.0);
        let bold = FontMetrics::measure_text("Subtotal:", BuiltinFont::HelveticaBold, 10.0);
        assert!(bold > regular);
    }

    #[test]
    fn win_ansi_maps_latin1_and_fallbacks() {
        assert_eq!(encode_win_ansi("वi"), vec![b'?', b'i']);
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("\u{20ac}5"), vec![0x80, b'5']);
    }
}
