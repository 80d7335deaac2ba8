//! Minimal SVG path data reader.
//!
//! Supports the commands the icon set uses (`M L H V A Z`, absolute and
//! relative). Arcs are converted to cubic Béziers, so the output only has
//! moves, lines and curves.

use std::f32::consts::{FRAC_PI_2, TAU};

use report_core::icons::Primitive;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(
        x: f32,
        y: f32,
    ) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("unsupported path command '{0}'")]
    UnsupportedCommand(char),

    #[error("malformed number at byte {0}")]
    BadNumber(usize),

    #[error("missing arguments for '{0}'")]
    MissingArguments(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f32),
}

fn tokenize(d: &str) -> Result<Vec<Token>, PathError> {
    let bytes = d.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_alphabetic() && b != b'e' && b != b'E' {
            tokens.push(Token::Command(b as char));
            i += 1;
            continue;
        }
        if b.is_ascii_whitespace() || b == b',' {
            i += 1;
            continue;
        }

        let start = i;
        if b == b'-' || b == b'+' {
            i += 1;
        }
        let mut seen_dot = false;
        while i < bytes.len() {
            match bytes[i] {
                b'0'..=b'9' => i += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    i += 1;
                }
                b'e' | b'E' => {
                    i += 1;
                    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
                        i += 1;
                    }
                }
                _ => break,
            }
        }
        let value = d[start..i]
            .parse::<f32>()
            .map_err(|_| PathError::BadNumber(start))?;
        tokens.push(Token::Number(value));
    }
    Ok(tokens)
}

fn arg_count(command: char) -> Option<usize> {
    match command.to_ascii_uppercase() {
        'M' | 'L' => Some(2),
        'H' | 'V' => Some(1),
        'A' => Some(7),
        'Z' => Some(0),
        _ => None,
    }
}

/// Parse path data into absolute segments.
pub fn parse(d: &str) -> Result<Vec<Segment>, PathError> {
    let tokens = tokenize(d)?;
    let mut segments = Vec::new();
    let mut current = Point::new(0.0, 0.0);
    let mut start = current;
    let mut command = None;
    let mut i = 0;

    while i < tokens.len() {
        let cmd = match tokens[i] {
            Token::Command(c) => {
                i += 1;
                c
            }
            // Repeated arguments reuse the previous command; extra pairs
            // after a move are lines.
            Token::Number(_) => match command {
                Some('M') => 'L',
                Some('m') => 'l',
                Some(c) => c,
                None => return Err(PathError::MissingArguments('M')),
            },
        };

        let count = arg_count(cmd).ok_or(PathError::UnsupportedCommand(cmd))?;
        let mut args = [0.0f32; 7];
        for slot in args.iter_mut().take(count) {
            match tokens.get(i) {
                Some(Token::Number(n)) => *slot = *n,
                _ => return Err(PathError::MissingArguments(cmd)),
            }
            i += 1;
        }

        let relative = cmd.is_ascii_lowercase();
        let origin = if relative {
            current
        } else {
            Point::new(0.0, 0.0)
        };
        let at = |x: f32, y: f32| Point::new(origin.x + x, origin.y + y);

        match cmd.to_ascii_uppercase() {
            'M' => {
                current = at(args[0], args[1]);
                start = current;
                segments.push(Segment::MoveTo(current));
            }
            'L' => {
                current = at(args[0], args[1]);
                segments.push(Segment::LineTo(current));
            }
            'H' => {
                current = Point::new(origin.x + args[0], current.y);
                segments.push(Segment::LineTo(current));
            }
            'V' => {
                current = Point::new(current.x, origin.y + args[0]);
                segments.push(Segment::LineTo(current));
            }
            'A' => {
                let end = at(args[5], args[6]);
                let arc = Arc {
                    rx: args[0],
                    ry: args[1],
                    rotation: args[2],
                    large: args[3] != 0.0,
                    sweep: args[4] != 0.0,
                };
                segments.extend(arc.to_segments(current, end));
                current = end;
            }
            _ => {
                current = start;
                segments.push(Segment::Close);
            }
        }
        command = Some(cmd);
    }
    Ok(segments)
}

struct Arc {
    rx: f32,
    ry: f32,
    rotation: f32,
    large: bool,
    sweep: bool,
}

impl Arc {
    /// Endpoint-to-center conversion, then one cubic per quarter turn.
    fn to_segments(
        &self,
        from: Point,
        to: Point,
    ) -> Vec<Segment> {
        if from == to {
            return Vec::new();
        }
        let (mut rx, mut ry) = (self.rx.abs(), self.ry.abs());
        if rx == 0.0 || ry == 0.0 {
            return vec![Segment::LineTo(to)];
        }

        let (sin_phi, cos_phi) = self.rotation.to_radians().sin_cos();
        let dx = (from.x - to.x) / 2.0;
        let dy = (from.y - to.y) / 2.0;
        let x1 = cos_phi * dx + sin_phi * dy;
        let y1 = -sin_phi * dx + cos_phi * dy;

        let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
        }

        let num = rx * rx * ry * ry - rx * rx * y1 * y1 - ry * ry * x1 * x1;
        let den = rx * rx * y1 * y1 + ry * ry * x1 * x1;
        let sign = if self.large == self.sweep { -1.0 } else { 1.0 };
        let coef = sign * (num / den).max(0.0).sqrt();
        let cx1 = coef * rx * y1 / ry;
        let cy1 = -coef * ry * x1 / rx;

        let cx = cos_phi * cx1 - sin_phi * cy1 + (from.x + to.x) / 2.0;
        let cy = sin_phi * cx1 + cos_phi * cy1 + (from.y + to.y) / 2.0;

        let angle = |ux: f32, uy: f32, vx: f32, vy: f32| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
        let ux = (x1 - cx1) / rx;
        let uy = (y1 - cy1) / ry;
        let vx = (-x1 - cx1) / rx;
        let vy = (-y1 - cy1) / ry;
        let theta = angle(1.0, 0.0, ux, uy);
        let mut sweep_angle = angle(ux, uy, vx, vy);
        if !self.sweep && sweep_angle > 0.0 {
            sweep_angle -= TAU;
        } else if self.sweep && sweep_angle < 0.0 {
            sweep_angle += TAU;
        }

        let pieces = (sweep_angle.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let delta = sweep_angle / pieces as f32;
        let handle = 4.0 / 3.0 * (delta / 4.0).tan();

        let point_at = |a: f32| {
            let (sin_a, cos_a) = a.sin_cos();
            Point::new(
                cx + rx * cos_a * cos_phi - ry * sin_a * sin_phi,
                cy + rx * cos_a * sin_phi + ry * sin_a * cos_phi,
            )
        };
        let tangent_at = |a: f32| {
            let (sin_a, cos_a) = a.sin_cos();
            Point::new(
                -rx * sin_a * cos_phi - ry * cos_a * sin_phi,
                -rx * sin_a * sin_phi + ry * cos_a * cos_phi,
            )
        };

        (0..pieces)
            .map(|i| {
                let a1 = theta + delta * i as f32;
                let a2 = a1 + delta;
                let (p1, p2) = (point_at(a1), point_at(a2));
                let (t1, t2) = (tangent_at(a1), tangent_at(a2));
                let end = if i + 1 == pieces { to } else { p2 };
                Segment::CurveTo(
                    Point::new(p1.x + handle * t1.x, p1.y + handle * t1.y),
                    Point::new(p2.x - handle * t2.x, p2.y - handle * t2.y),
                    end,
                )
            })
            .collect()
    }
}

/// Segments for any icon primitive.
pub fn primitive_segments(primitive: &Primitive) -> Result<Vec<Segment>, PathError> {
    match *primitive {
        Primitive::Path(d) => parse(d),
        Primitive::Circle { cx, cy, r } => parse(&format!(
            "M{} {cy}A{r} {r} 0 1 0 {} {cy}A{r} {r} 0 1 0 {} {cy}Z",
            cx - r,
            cx + r,
            cx - r
        )),
        Primitive::Rect {
            x,
            y,
            width,
            height,
            rx,
        } => {
            let r = rx.min(width / 2.0).min(height / 2.0);
            parse(&format!(
                "M{} {y}H{}A{r} {r} 0 0 1 {} {}V{}A{r} {r} 0 0 1 {} {}H{}A{r} {r} 0 0 1 {x} {}V{}A{r} {r} 0 0 1 {} {y}Z",
                x + r,
                x + width - r,
                x + width,
                y + r,
                y + height - r,
                x + width - r,
                y + height,
                x + r,
                y + height - r,
                y + r,
                x + r,
            ))
        }
    }
}
