//! Serialize a [`Layout`] with lopdf.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use report_core::document::{Color, Stroke};
use report_core::icons;
use tracing::{debug, warn};

use crate::error::PdfError;
use crate::fonts::{Font, encode_win_ansi};
use crate::layout::{DrawOp, Layout};
use crate::raster::rasterize;
use crate::svg_path::{Segment, primitive_segments};

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn image_name(index: usize) -> String {
    format!("Im{index}")
}

/// Page-space writer: flips top-down layout coordinates.
struct Painter {
    page_height: f32,
    ops: Vec<Operation>,
}

impl Painter {
    fn op(
        &mut self,
        operator: &str,
        operands: Vec<Object>,
    ) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn fill_color(
        &mut self,
        color: Color,
    ) {
        let (r, g, b) = color.unit();
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn stroke_style(
        &mut self,
        stroke: Stroke,
    ) {
        let (r, g, b) = stroke.color.unit();
        self.op("RG", vec![real(r), real(g), real(b)]);
        self.op("w", vec![real(stroke.width)]);
    }

    fn text(
        &mut self,
        x: f32,
        baseline: f32,
        font: Font,
        size: f32,
        color: Color,
        text: &str,
    ) {
        self.op("BT", vec![]);
        self.op("Tf", vec![name(font.resource_name()), real(size)]);
        self.fill_color(color);
        self.op("Td", vec![real(x), real(self.page_height - baseline)]);
        self.op(
            "Tj",
            vec![Object::String(
                encode_win_ansi(text),
                StringFormat::Hexadecimal,
            )],
        );
        self.op("ET", vec![]);
    }

    fn rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    ) {
        let bounds = vec![
            real(x),
            real(self.page_height - y - height),
            real(width),
            real(height),
        ];
        self.op("q", vec![]);
        if let Some(color) = fill {
            self.fill_color(color);
            self.op("re", bounds.clone());
            self.op("f", vec![]);
        }
        if let Some(stroke) = stroke {
            self.stroke_style(stroke);
            self.op("re", bounds);
            self.op("S", vec![]);
        }
        self.op("Q", vec![]);
    }

    fn line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    ) {
        self.op("q", vec![]);
        self.stroke_style(stroke);
        self.op("m", vec![real(from.0), real(self.page_height - from.1)]);
        self.op("l", vec![real(to.0), real(self.page_height - to.1)]);
        self.op("S", vec![]);
        self.op("Q", vec![]);
    }

    fn icon(
        &mut self,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        icon: &str,
    ) {
        let Some(primitives) = icons::lookup(icon) else {
            warn!(icon, "unknown icon, leaving it out");
            return;
        };

        let scale = size / icons::VIEWBOX;
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                real(scale),
                real(0.0),
                real(0.0),
                real(-scale),
                real(x),
                real(self.page_height - y),
            ],
        );
        self.stroke_style(Stroke {
            width: icons::STROKE_WIDTH,
            color,
        });
        self.op("J", vec![Object::Integer(1)]);
        self.op("j", vec![Object::Integer(1)]);

        for primitive in primitives {
            let segments = match primitive_segments(primitive) {
                Ok(segments) => segments,
                Err(e) => {
                    warn!(icon, error = %e, "skipping malformed icon path");
                    continue;
                }
            };
            for segment in segments {
                match segment {
                    Segment::MoveTo(p) => self.op("m", vec![real(p.x), real(p.y)]),
                    Segment::LineTo(p) => self.op("l", vec![real(p.x), real(p.y)]),
                    Segment::CurveTo(c1, c2, p) => self.op(
                        "c",
                        vec![
                            real(c1.x),
                            real(c1.y),
                            real(c2.x),
                            real(c2.y),
                            real(p.x),
                            real(p.y),
                        ],
                    ),
                    Segment::Close => self.op("h", vec![]),
                }
            }
            self.op("S", vec![]);
        }
        self.op("Q", vec![]);
    }

    fn image(
        &mut self,
        x: f32,
        y: f32,
        size: f32,
        index: usize,
    ) {
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                real(size),
                real(0.0),
                real(0.0),
                real(size),
                real(x),
                real(self.page_height - y - size),
            ],
        );
        self.op("Do", vec![name(&image_name(index))]);
        self.op("Q", vec![]);
    }
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| PdfError::WriteError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| PdfError::WriteError(e.to_string()))
}

/// Add image XObjects; entry `i` is `None` when image `i` could not be used.
fn embed_images(
    doc: &mut Document,
    layout: &Layout,
) -> Vec<Option<ObjectId>> {
    layout
        .images
        .iter()
        .enumerate()
        .map(|(i, image)| match rasterize(image) {
            Ok(raster) => {
                let edge = i64::from(raster.edge);
                let stream = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => edge,
                        "Height" => edge,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                        "Filter" => "FlateDecode",
                    },
                    raster.deflated,
                );
                Some(doc.add_object(stream))
            }
            Err(e) => {
                warn!(image = i, error = %e, "skipping image that could not be decoded");
                None
            }
        })
        .collect()
}

/// Write `layout` as a complete PDF file.
pub fn write_pdf(layout: &Layout) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), Object::Reference(id));
    }

    let images = embed_images(&mut doc, layout);
    let mut xobjects = Dictionary::new();
    for (i, id) in images.iter().enumerate() {
        if let Some(id) = id {
            xobjects.set(image_name(i), Object::Reference(*id));
        }
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => xobjects,
    });

    let page_height = layout.page.height;
    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut painter = Painter {
            page_height,
            ops: Vec::new(),
        };
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    font,
                    size,
                    color,
                    text,
                } => painter.text(*x, *y, *font, *size, *color, text),
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    stroke,
                } => painter.rect(*x, *y, *width, *height, *fill, *stroke),
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke,
                } => painter.line((*x1, *y1), (*x2, *y2), *stroke),
                DrawOp::Icon {
                    x,
                    y,
                    size,
                    color,
                    name: icon,
                } => painter.icon(*x, *y, *size, *color, icon),
                DrawOp::Image { x, y, size, index } => {
                    if images.get(*index).is_some_and(Option::is_some) {
                        painter.image(*x, *y, *size, *index);
                    }
                }
            }
        }

        let content = Content {
            operations: painter.ops,
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::ContentError(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            deflate(&encoded)?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![real(0.0), real(0.0), real(layout.page.width), real(page_height)],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::WriteError(e.to_string()))?;
    debug!(pages = count, bytes = buffer.len(), "pdf written");
    Ok(buffer)
}
