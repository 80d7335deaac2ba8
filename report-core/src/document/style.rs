#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

pub const TEXT: Color = Color::hex(0x1A1A1A);
pub const SUCCESS: Color = Color::hex(0x2E7D5A);
pub const FAILURE: Color = Color::hex(0xC93724);
pub const WARNING: Color = Color::hex(0xD4A853);
pub const NOTE_BACKGROUND: Color = Color::hex(0xFFF9E6);
pub const OTHER_BACKGROUND: Color = Color::hex(0xF5F5F5);
pub const DEFICIENCY_BORDER: Color = Color::hex(0xFCA5A5);
pub const DISCLAIMER_BORDER: Color = Color::hex(0xFCD34D);
/// 8% black over white.
pub const RULE: Color = Color::hex(0xEBEBEB);
/// 10% black over white.
pub const HEADING_RULE: Color = Color::hex(0xE6E6E6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    SemiBold,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub italic: bool,
    pub color: Color,
    /// Multiple of `size`.
    pub line_height: f32,
}

impl TextStyle {
    pub const fn body() -> Self {
        Self {
            size: 10.0,
            weight: FontWeight::Regular,
            italic: false,
            color: TEXT,
            line_height: 1.5,
        }
    }

    pub const fn sized(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub const fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub const fn bold(self) -> Self {
        self.weight(FontWeight::Bold)
    }

    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub const fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub const fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn leading(&self) -> f32 {
        self.size * self.line_height
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::body()
    }
}

/// A solid line: used for borders, accent bars and rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn hex_splits_channels() {
        assert_eq!(Color::hex(0xC93724), Color { r: 0xC9, g: 0x37, b: 0x24 });
    }

    #[test]
    fn builder_keeps_other_fields() {
        let style = TextStyle::body().sized(14.0).bold();

        assert_eq!(style.size, 14.0);
        assert_eq!(style.weight, FontWeight::Bold);
        assert_eq!(style.color, TEXT);
        assert_eq!(style.leading(), 21.0);
    }
}
