//! Standard-14 Helvetica faces: metrics, encoding and line wrapping.

use report_core::document::{FontWeight, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl Font {
    pub const ALL: [Font; 4] = [Self::Regular, Self::Bold, Self::Oblique, Self::BoldOblique];

    /// Helvetica has no semibold face; it is drawn bold.
    pub fn for_style(style: &TextStyle) -> Self {
        let bold = matches!(style.weight, FontWeight::SemiBold | FontWeight::Bold);
        match (bold, style.italic) {
            (false, false) => Self::Regular,
            (true, false) => Self::Bold,
            (false, true) => Self::Oblique,
            (true, true) => Self::BoldOblique,
        }
    }

    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Oblique => "F3",
            Self::BoldOblique => "F4",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Oblique => "Helvetica-Oblique",
            Self::BoldOblique => "Helvetica-BoldOblique",
        }
    }

    fn is_bold(&self) -> bool {
        matches!(self, Self::Bold | Self::BoldOblique)
    }

    /// Advance width of `c` in 1/1000 em.
    fn char_width(
        &self,
        c: char,
    ) -> u16 {
        let table = if self.is_bold() {
            &BOLD_WIDTHS
        } else {
            &REGULAR_WIDTHS
        };
        match c {
            ' '..='~' => table[c as usize - 32],
            '–' => 556,
            '—' | '…' => 1000,
            '•' => 350,
            '‘' | '’' => {
                if self.is_bold() {
                    278
                } else {
                    222
                }
            }
            '“' | '”' => {
                if self.is_bold() {
                    500
                } else {
                    333
                }
            }
            _ => 556,
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(
        &self,
        text: &str,
        size: f32,
    ) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

// Oblique faces share the upright widths.
#[rustfmt::skip]
const REGULAR_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Encode `text` as WinAnsi (CP-1252) bytes. Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit newlines are kept. Words wider than a whole line are split
/// between characters.
pub fn wrap_text(
    text: &str,
    font: Font,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    let space = font.text_width(" ", size);
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0;

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let word_width = font.text_width(word, size);
            let needed = if line.is_empty() {
                word_width
            } else {
                line_width + space + word_width
            };

            if needed <= max_width {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
                line_width = needed;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            // Hard-break an over-long word.
            line_width = 0.0;
            for c in word.chars() {
                let w = font.text_width(c.encode_utf8(&mut [0; 4]), size);
                if line_width + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                line.push(c);
                line_width += w;
            }
        }
        lines.push(line);
    }
    lines
}
