//! Paginated document description.
//!
//! A [`Document`] is a tree of styled blocks with page-break hints. It holds
//! no layout positions; the materializer decides where lines and pages
//! break, honoring [`Group::keep_together`].

mod render;
pub mod style;

use std::fmt::Write as _;

pub use render::{
    DEFICIENCIES_TITLE, DISCLAIMER_TITLE, SEE_DEFICIENCIES_SUFFIX, format_report_date, render,
};
pub use style::{Color, FontWeight, Stroke, TextStyle};

use crate::icons;
use crate::image_codec::EncodedImage;

/// Page size and uniform margin in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSetup {
    pub const A4: PageSetup = PageSetup {
        width: 595.28,
        height: 841.89,
        margin: 48.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page: PageSetup,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Group(Group),
    Text(TextBlock),
    InfoRow(InfoRow),
    ImageGrid(ImageGrid),
}

/// Box decorations around a group's children.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub padding: f32,
    pub background: Option<Color>,
    pub border: Option<Stroke>,
    /// Bar along the left edge.
    pub accent_left: Option<Stroke>,
}

impl Frame {
    /// True when the frame paints something.
    pub fn is_decorated(&self) -> bool {
        self.background.is_some() || self.border.is_some() || self.accent_left.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Must not be split across a page boundary when it fits on one page.
    pub keep_together: bool,
    pub frame: Frame,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Icon {
    pub name: &'static str,
    pub size: f32,
    pub color: Color,
    /// Space between the glyph and the text that follows it.
    pub gap: f32,
}

/// Horizontal line under a block, `gap` points below its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub gap: f32,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub icon: Option<Icon>,
    pub text: String,
    pub style: TextStyle,
    pub indent: f32,
    pub margin_bottom: f32,
    pub rule_below: Option<Rule>,
}

impl TextBlock {
    pub fn new(
        text: impl Into<String>,
        style: TextStyle,
    ) -> Self {
        Self {
            icon: None,
            text: text.into(),
            style,
            indent: 0.0,
            margin_bottom: 0.0,
            rule_below: None,
        }
    }

    pub fn with_icon(
        mut self,
        icon: Icon,
    ) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn indented(
        mut self,
        indent: f32,
    ) -> Self {
        self.indent = indent;
        self
    }

    pub fn margin_bottom(
        mut self,
        margin: f32,
    ) -> Self {
        self.margin_bottom = margin;
        self
    }

    pub fn rule_below(
        mut self,
        rule: Rule,
    ) -> Self {
        self.rule_below = Some(rule);
        self
    }
}

/// Fixed-width label followed by a wrapping value.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRow {
    pub label: String,
    pub value: String,
    pub label_width: f32,
    pub label_style: TextStyle,
    pub value_style: TextStyle,
    pub margin_bottom: f32,
    pub rule_below: Option<Rule>,
}

/// Wrapping grid of square, cover-cropped images. Rows may break across
/// pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    pub images: Vec<EncodedImage>,
    pub cell: f32,
    pub gap: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Document {
    /// Plain-text rendering of the block tree, for previews.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            outline_block(&mut out, block, 0);
        }
        out
    }

    /// Every image referenced by the document, in reading order.
    pub fn images(&self) -> Vec<&EncodedImage> {
        let mut found = Vec::new();
        for block in &self.blocks {
            collect_images(block, &mut found);
        }
        found
    }
}

fn glyph_marker(name: &str) -> &'static str {
    match name {
        icons::SQUARE_CHECK => "[x] ",
        icons::SQUARE => "[ ] ",
        icons::CIRCLE_CHECK => "(ok) ",
        icons::INFO => "(i) ",
        icons::CIRCLE_X => "(x) ",
        icons::TRIANGLE_ALERT => "(!) ",
        _ => "",
    }
}

fn outline_block(
    out: &mut String,
    block: &Block,
    depth: usize,
) {
    let pad = "  ".repeat(depth);
    match block {
        Block::Group(group) => {
            if group.frame.margin_top > 0.0 && !out.is_empty() {
                out.push('\n');
            }
            let depth = if group.frame.is_decorated() || group.frame.margin_left > 0.0 {
                depth + 1
            } else {
                depth
            };
            for child in &group.children {
                outline_block(out, child, depth);
            }
        }
        Block::Text(text) => {
            let marker = text.icon.map(|i| glyph_marker(i.name)).unwrap_or_default();
            let _ = writeln!(out, "{pad}{marker}{}", text.text);
        }
        Block::InfoRow(row) => {
            let _ = writeln!(out, "{pad}{} {}", row.label, row.value);
        }
        Block::ImageGrid(grid) => {
            let noun = if grid.images.len() == 1 { "image" } else { "images" };
            let _ = writeln!(out, "{pad}[{} {noun}]", grid.images.len());
        }
    }
}

fn collect_images<'a>(
    block: &'a Block,
    found: &mut Vec<&'a EncodedImage>,
) {
    match block {
        Block::Group(group) => {
            for child in &group.children {
                collect_images(child, found);
            }
        }
        Block::ImageGrid(grid) => found.extend(grid.images.iter()),
        Block::Text(_) | Block::InfoRow(_) => {}
    }
}
