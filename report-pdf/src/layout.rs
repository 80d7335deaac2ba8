//! Flow a [`Document`] onto fixed-size pages.
//!
//! Blocks are measured into vertical chunks, then chunks are placed top to
//! bottom, starting a new page when one does not fit. A `keep_together` or
//! decorated group collapses into a single chunk when it fits on a page.

use std::collections::HashMap;

use report_core::EncodedImage;
use report_core::document::{
    Block, Color, Document, Group, ImageGrid, InfoRow, PageSetup, Rule, Stroke, TextBlock,
    TextStyle,
};
use tracing::debug;

use crate::fonts::{Font, wrap_text};

/// Position of the first baseline inside a line box, as a fraction of size.
const ASCENT: f32 = 0.8;

/// One drawing instruction. Coordinates are points from the page's top-left
/// corner, y growing downward.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        /// Baseline.
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Stroke,
    },
    Icon {
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        name: &'static str,
    },
    Image {
        x: f32,
        y: f32,
        size: f32,
        /// Position in [`Layout::images`].
        index: usize,
    },
}

impl DrawOp {
    fn shifted(
        mut self,
        dy: f32,
    ) -> Self {
        match &mut self {
            Self::Text { y, .. }
            | Self::Rect { y, .. }
            | Self::Icon { y, .. }
            | Self::Image { y, .. } => *y += dy,
            Self::Line { y1, y2, .. } => {
                *y1 += dy;
                *y2 += dy;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub page: PageSetup,
    pub pages: Vec<Page>,
    /// Distinct images in first-use order.
    pub images: Vec<EncodedImage>,
}

/// A vertical slice that is never split. Op y values are relative to its top.
#[derive(Debug)]
struct Chunk {
    height: f32,
    ops: Vec<DrawOp>,
    spacer: bool,
}

impl Chunk {
    fn spacer(height: f32) -> Self {
        Self {
            height,
            ops: Vec::new(),
            spacer: true,
        }
    }

    fn content(
        height: f32,
        ops: Vec<DrawOp>,
    ) -> Self {
        Self {
            height,
            ops,
            spacer: false,
        }
    }
}

struct Measure<'a> {
    page: &'a PageSetup,
    images: Vec<EncodedImage>,
    image_slots: HashMap<EncodedImage, usize>,
}

impl Measure<'_> {
    fn image_index(
        &mut self,
        image: &EncodedImage,
    ) -> usize {
        if let Some(&i) = self.image_slots.get(image) {
            return i;
        }
        let i = self.images.len();
        self.images.push(image.clone());
        self.image_slots.insert(image.clone(), i);
        i
    }

    fn block(
        &mut self,
        block: &Block,
        x: f32,
        width: f32,
        out: &mut Vec<Chunk>,
    ) {
        match block {
            Block::Group(group) => self.group(group, x, width, out),
            Block::Text(text) => text_chunks(text, x, width, out),
            Block::InfoRow(row) => info_row_chunks(row, x, width, out),
            Block::ImageGrid(grid) => self.grid(grid, x, width, out),
        }
    }

    fn group(
        &mut self,
        group: &Group,
        x: f32,
        width: f32,
        out: &mut Vec<Chunk>,
    ) {
        let frame = &group.frame;
        push_spacer(out, frame.margin_top);

        let box_x = x + frame.margin_left;
        let box_width = width - frame.margin_left;
        let inner_x = box_x + frame.padding;
        let inner_width = (box_width - 2.0 * frame.padding).max(1.0);

        let mut children = Vec::new();
        for child in &group.children {
            self.block(child, inner_x, inner_width, &mut children);
        }

        let height = 2.0 * frame.padding + children.iter().map(|c| c.height).sum::<f32>();
        let atomic = group.keep_together || frame.is_decorated();

        if atomic && height <= self.page.content_height() {
            let mut ops = Vec::new();
            if let Some(fill) = frame.background {
                ops.push(DrawOp::Rect {
                    x: box_x,
                    y: 0.0,
                    width: box_width,
                    height,
                    fill: Some(fill),
                    stroke: None,
                });
            }
            if let Some(accent) = frame.accent_left {
                ops.push(DrawOp::Rect {
                    x: box_x,
                    y: 0.0,
                    width: accent.width,
                    height,
                    fill: Some(accent.color),
                    stroke: None,
                });
            }
            let mut cursor = frame.padding;
            for child in children {
                ops.extend(child.ops.into_iter().map(|op| op.shifted(cursor)));
                cursor += child.height;
            }
            if let Some(border) = frame.border {
                ops.push(DrawOp::Rect {
                    x: box_x,
                    y: 0.0,
                    width: box_width,
                    height,
                    fill: None,
                    stroke: Some(border),
                });
            }
            out.push(Chunk::content(height, ops));
        } else {
            if atomic {
                debug!(height, "group taller than a page, letting it break");
            }
            push_spacer(out, frame.padding);
            out.extend(children);
            push_spacer(out, frame.padding);
        }

        push_spacer(out, frame.margin_bottom);
    }

    fn grid(
        &mut self,
        grid: &ImageGrid,
        x: f32,
        width: f32,
        out: &mut Vec<Chunk>,
    ) {
        if grid.images.is_empty() {
            return;
        }
        let stride = grid.cell + grid.gap;
        let columns = (((width + grid.gap) / stride).floor() as usize).max(1);

        push_spacer(out, grid.margin_top);
        for (row, images) in grid.images.chunks(columns).enumerate() {
            if row > 0 {
                push_spacer(out, grid.gap);
            }
            let ops = images
                .iter()
                .enumerate()
                .map(|(col, image)| DrawOp::Image {
                    x: x + col as f32 * stride,
                    y: 0.0,
                    size: grid.cell,
                    index: self.image_index(image),
                })
                .collect();
            out.push(Chunk::content(grid.cell, ops));
        }
        push_spacer(out, grid.margin_bottom);
    }
}

fn push_spacer(
    out: &mut Vec<Chunk>,
    height: f32,
) {
    if height > 0.0 {
        out.push(Chunk::spacer(height));
    }
}

fn baseline(
    line_height: f32,
    size: f32,
) -> f32 {
    (line_height - size) / 2.0 + ASCENT * size
}

/// Append a rule to the bottom of `chunk`.
fn add_rule(
    chunk: &mut Chunk,
    rule: &Rule,
    x: f32,
    width: f32,
) {
    let y = chunk.height + rule.gap + rule.stroke.width / 2.0;
    chunk.ops.push(DrawOp::Line {
        x1: x,
        y1: y,
        x2: x + width,
        y2: y,
        stroke: rule.stroke,
    });
    chunk.height += rule.gap + rule.stroke.width;
}

fn text_chunks(
    block: &TextBlock,
    x: f32,
    width: f32,
    out: &mut Vec<Chunk>,
) {
    let style = &block.style;
    let font = Font::for_style(style);
    let leading = style.leading();
    let icon_advance = block.icon.map(|i| i.size + i.gap).unwrap_or(0.0);
    let text_x = x + block.indent + icon_advance;
    let text_width = (width - block.indent - icon_advance).max(1.0);

    let mut lines = wrap_text(&block.text, font, style.size, text_width);
    if lines.is_empty() && block.icon.is_some() {
        lines.push(String::new());
    }

    let mut chunks: Vec<Chunk> = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let mut ops = Vec::new();
            let mut height = leading;
            if let (0, Some(icon)) = (i, block.icon) {
                height = height.max(icon.size);
                ops.push(DrawOp::Icon {
                    x: x + block.indent,
                    y: (height - icon.size) / 2.0,
                    size: icon.size,
                    color: icon.color,
                    name: icon.name,
                });
            }
            if !line.is_empty() {
                ops.push(DrawOp::Text {
                    x: text_x,
                    y: baseline(height, style.size),
                    font,
                    size: style.size,
                    color: style.color,
                    text: line,
                });
            }
            Chunk::content(height, ops)
        })
        .collect();

    if let Some(rule) = &block.rule_below {
        match chunks.last_mut() {
            Some(last) => add_rule(last, rule, x, width),
            None => {
                let mut chunk = Chunk::content(0.0, Vec::new());
                add_rule(&mut chunk, rule, x, width);
                chunks.push(chunk);
            }
        }
    }

    out.extend(chunks);
    push_spacer(out, block.margin_bottom);
}

fn info_row_chunks(
    row: &InfoRow,
    x: f32,
    width: f32,
    out: &mut Vec<Chunk>,
) {
    let label_font = Font::for_style(&row.label_style);
    let value_font = Font::for_style(&row.value_style);
    let value_x = x + row.label_width;
    let value_width = (width - row.label_width).max(1.0);

    let mut ops = Vec::new();
    let mut column = |lines: Vec<String>, x: f32, font: Font, style: &TextStyle| {
        let leading = style.leading();
        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            ops.push(DrawOp::Text {
                x,
                y: i as f32 * leading + baseline(leading, style.size),
                font,
                size: style.size,
                color: style.color,
                text: line,
            });
        }
        count as f32 * leading
    };

    let label_lines = wrap_text(&row.label, label_font, row.label_style.size, row.label_width);
    let value_lines = wrap_text(&row.value, value_font, row.value_style.size, value_width);
    let label_height = column(label_lines, x, label_font, &row.label_style);
    let value_height = column(value_lines, value_x, value_font, &row.value_style);

    let mut chunk = Chunk::content(label_height.max(value_height), ops);
    if let Some(rule) = &row.rule_below {
        add_rule(&mut chunk, rule, x, width);
    }
    out.push(chunk);
    push_spacer(out, row.margin_bottom);
}

/// Place `document` onto pages.
pub fn paginate(document: &Document) -> Layout {
    let page = document.page;
    let mut measure = Measure {
        page: &page,
        images: Vec::new(),
        image_slots: HashMap::new(),
    };

    let mut chunks = Vec::new();
    for block in &document.blocks {
        measure.block(block, page.margin, page.content_width(), &mut chunks);
    }

    let top = page.margin;
    let bottom = page.height - page.margin;
    let mut pages = vec![Page::default()];
    let mut cursor = top;
    let mut page_has_content = false;

    for chunk in chunks {
        if chunk.spacer {
            if !page_has_content {
                continue;
            }
            cursor = (cursor + chunk.height).min(bottom);
            continue;
        }

        if page_has_content && cursor + chunk.height > bottom {
            pages.push(Page::default());
            cursor = top;
        }
        if let Some(current) = pages.last_mut() {
            current
                .ops
                .extend(chunk.ops.into_iter().map(|op| op.shifted(cursor)));
        }
        cursor += chunk.height;
        page_has_content = true;
    }

    debug!(pages = pages.len(), images = measure.images.len(), "document paginated");
    Layout {
        page,
        pages,
        images: measure.images,
    }
}
