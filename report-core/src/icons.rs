//! Stroke-only glyphs used by the document renderer.
//!
//! Each glyph is a handful of primitives on a 24×24 viewbox, drawn with a
//! 2-unit stroke, round caps and round joins, and no fill.

pub const VIEWBOX: f32 = 24.0;
pub const STROKE_WIDTH: f32 = 2.0;

pub const CIRCLE_CHECK: &str = "circleCheck";
pub const INFO: &str = "info";
pub const CIRCLE_X: &str = "circleX";
pub const TRIANGLE_ALERT: &str = "triangleAlert";
pub const SQUARE_CHECK: &str = "squareCheck";
pub const SQUARE: &str = "square";
pub const BUILDING: &str = "building2";
pub const SIREN: &str = "siren";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// SVG path data.
    Path(&'static str),
    Circle { cx: f32, cy: f32, r: f32 },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rx: f32,
    },
}

const RING: Primitive = Primitive::Circle {
    cx: 12.0,
    cy: 12.0,
    r: 10.0,
};

const BOX: Primitive = Primitive::Rect {
    x: 3.0,
    y: 3.0,
    width: 18.0,
    height: 18.0,
    rx: 2.0,
};

const TICK: Primitive = Primitive::Path("m9 12 2 2 4-4");

const CIRCLE_CHECK_SHAPES: &[Primitive] = &[RING, TICK];

const INFO_SHAPES: &[Primitive] = &[
    RING,
    Primitive::Path("M12 16v-4"),
    Primitive::Path("M12 8h.01"),
];

const CIRCLE_X_SHAPES: &[Primitive] = &[
    RING,
    Primitive::Path("m15 9-6 6"),
    Primitive::Path("m9 9 6 6"),
];

const TRIANGLE_ALERT_SHAPES: &[Primitive] = &[
    Primitive::Path("m21.73 18-8-14a2 2 0 0 0-3.48 0l-8 14A2 2 0 0 0 4 21h16a2 2 0 0 0 1.73-3"),
    Primitive::Path("M12 9v4"),
    Primitive::Path("M12 17h.01"),
];

const SQUARE_CHECK_SHAPES: &[Primitive] = &[BOX, TICK];

const SQUARE_SHAPES: &[Primitive] = &[BOX];

const BUILDING_SHAPES: &[Primitive] = &[
    Primitive::Path("M10 12h4"),
    Primitive::Path("M10 8h4"),
    Primitive::Path("M14 21v-3a2 2 0 0 0-4 0v3"),
    Primitive::Path("M6 10H4a2 2 0 0 0-2 2v7a2 2 0 0 0 2 2h16a2 2 0 0 0 2-2V9a2 2 0 0 0-2-2h-2"),
    Primitive::Path("M6 21V5a2 2 0 0 1 2-2h8a2 2 0 0 1 2 2v16"),
];

const SIREN_SHAPES: &[Primitive] = &[
    Primitive::Path("M7 18v-6a5 5 0 1 1 10 0v6"),
    Primitive::Path("M5 21a1 1 0 0 0 1 1h12a1 1 0 0 0 1-1v-1a2 2 0 0 0-2-2H7a2 2 0 0 0-2 2z"),
    Primitive::Path("M21 12h1"),
    Primitive::Path("M18.5 4.5 18 5"),
    Primitive::Path("M2 12h1"),
    Primitive::Path("M12 2v1"),
    Primitive::Path("m4.929 4.929.707.707"),
    Primitive::Path("M12 12v6"),
];

/// Primitives for a named glyph, or `None` if the name is unknown.
pub fn lookup(name: &str) -> Option<&'static [Primitive]> {
    match name {
        CIRCLE_CHECK => Some(CIRCLE_CHECK_SHAPES),
        INFO => Some(INFO_SHAPES),
        CIRCLE_X => Some(CIRCLE_X_SHAPES),
        TRIANGLE_ALERT => Some(TRIANGLE_ALERT_SHAPES),
        SQUARE_CHECK => Some(SQUARE_CHECK_SHAPES),
        SQUARE => Some(SQUARE_SHAPES),
        BUILDING => Some(BUILDING_SHAPES),
        SIREN => Some(SIREN_SHAPES),
        _ => None,
    }
}
