//! Per-kind geometry. Each part becomes a [`Shape`] in device space that can
//! write itself as SVG.

use std::f64::consts::PI;

use crate::geometry::{Bounds, Point, bounds_of};
use crate::model::{DrawingKind, Part, PartData};

/// Distance of dimension text from its line, in device units.
const DIM_TEXT_NEAR: f64 = 2.0;
const DIM_TEXT_FAR: f64 = 9.0;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Closed outline.
    Polygon { points: Vec<Point> },
    /// Stair treads between mirrored point pairs plus the walking line.
    Steps { points: Vec<Point> },
    /// Door or window swing.
    OpeningArc {
        center: Point,
        start: Point,
        end: Point,
    },
    Dimension(Dimension),
    Label { anchor: Point, text: String },
}

/// A linear dimension, already offset from the measured points.
#[derive(Clone, Debug, PartialEq)]
pub struct Dimension {
    pub from: Point,
    pub to: Point,
    pub anchor_from: Point,
    pub anchor_to: Point,
    pub offset: f64,
    pub text: String,
    pub text_at: Point,
    pub text_rotation: f64,
}

impl Shape {
    /// Build the shape of `part`. Settings and metadata have none.
    pub fn from_part(part: &Part, scale_divisor: f64) -> Option<Shape> {
        let to_device = |p: Point| p.to_device(scale_divisor);
        match (&part.data, part.kind) {
            (_, k) if k.is_plan_entry() => None,
            (PartData::Text { text1, text2 }, _) => Some(Shape::Label {
                anchor: to_device(part.reference_or_origin()),
                text: label_text(text1, text2),
            }),
            (PartData::Geometry { points, dim_offset }, k) if k.is_dimension() => {
                let (p1, p2) = (*points.first()?, *points.get(1)?);
                Some(Shape::Dimension(Dimension::new(
                    k,
                    p1,
                    p2,
                    part.reference_or_origin(),
                    *dim_offset,
                    scale_divisor,
                )))
            }
            (PartData::Geometry { .. }, k) => {
                let points: Vec<Point> = part.absolute_points().into_iter().map(to_device).collect();
                match k {
                    DrawingKind::Steps => Some(Shape::Steps { points }),
                    DrawingKind::OpeningArc => Some(Shape::OpeningArc {
                        center: *points.first()?,
                        start: *points.get(1)?,
                        end: *points.get(2)?,
                    }),
                    _ => Some(Shape::Polygon { points }),
                }
            }
        }
    }

    /// Extent used for centering; only closed outlines have one.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Shape::Polygon { points } => bounds_of(points),
            _ => None,
        }
    }

    pub fn to_svg(&self, class: &str) -> String {
        match self {
            Shape::Polygon { points } => path(points, true, class),
            Shape::Steps { points } => {
                let n = points.len();
                let mut s = String::new();
                let mut centroids = Vec::with_capacity(n / 2);
                for i in 0..n / 2 {
                    let (a, b) = (points[i], points[n - 1 - i]);
                    centroids.push(a.midpoint(b));
                    s.push_str(&line(a, b, class));
                    s.push('\n');
                }
                s.push_str(&path(&centroids, false, class));
                s
            }
            Shape::OpeningArc { center, start, end } => {
                let radius = center.distance(*start);
                let sweep = arc_sweep_flag(*start - *center, *end - *center);
                format!(
                    "<path class=\"{class}\" d=\"M {} {} L {} {} A {r} {r} 0 0 {sweep} {} {} Z\"/>",
                    num(center.x),
                    num(center.y),
                    num(start.x),
                    num(start.y),
                    num(end.x),
                    num(end.y),
                    r = num(radius),
                )
            }
            Shape::Dimension(d) => d.to_svg(class),
            Shape::Label { anchor, text } => format!(
                "<text class=\"{class}\" x=\"{}\" y=\"{}\">{}</text>",
                num(anchor.x),
                num(anchor.y),
                svg_escape(text)
            ),
        }
    }
}

impl Dimension {
    /// `p1`, `p2` and `reference` are absolute drawing-space points; the
    /// offset is applied on the page.
    pub fn new(
        kind: DrawingKind,
        p1: Point,
        p2: Point,
        reference: Point,
        offset: f64,
        scale_divisor: f64,
    ) -> Dimension {
        let from = p1.to_device(scale_divisor);
        let to = p2.to_device(scale_divisor);
        let r = reference.to_device(scale_divisor);
        let horizontal = matches!(kind, DrawingKind::XDim | DrawingKind::XDimCompact);
        let compact = matches!(kind, DrawingKind::XDimCompact | DrawingKind::YDimCompact);

        let (anchor_from, anchor_to, length, text_shift, text_rotation) = if horizontal {
            // Rising measurements keep the line above, falling ones below.
            let (shift, text_dy) = if p2.x > p1.x {
                (Point::new(0.0, -offset), -DIM_TEXT_NEAR)
            } else {
                (Point::new(0.0, offset), DIM_TEXT_FAR)
            };
            (
                Point::new(from.x, r.y) + shift,
                Point::new(to.x, r.y) + shift,
                (p2.x - p1.x).abs(),
                Point::new(0.0, text_dy),
                0.0,
            )
        } else {
            let (shift, text_dx) = if p2.y > p1.y {
                (Point::new(-offset, 0.0), -DIM_TEXT_NEAR)
            } else {
                (Point::new(offset, 0.0), DIM_TEXT_FAR)
            };
            (
                Point::new(r.x, from.y) + shift,
                Point::new(r.x, to.y) + shift,
                (p2.y - p1.y).abs(),
                Point::new(text_dx, 0.0),
                -90.0,
            )
        };

        let text = if compact {
            format!("({})", fmt_cm(length))
        } else {
            fmt_cm(length)
        };
        Dimension {
            from,
            to,
            anchor_from,
            anchor_to,
            offset,
            text,
            text_at: anchor_from.midpoint(anchor_to) + text_shift,
            text_rotation,
        }
    }

    pub fn to_svg(&self, class: &str) -> String {
        let mut s = format!(
            "<text class=\"{class}-text\" transform=\"translate({} {}) rotate({})\">{}</text>",
            num(self.text_at.x),
            num(self.text_at.y),
            self.text_rotation,
            svg_escape(&self.text)
        );
        if self.offset != 0.0 {
            let line_class = format!("{class}-line");
            for (a, b) in [
                (self.from, self.anchor_from),
                (self.to, self.anchor_to),
                (self.anchor_from, self.anchor_to),
            ] {
                s.push('\n');
                s.push_str(&line(a, b, &line_class));
            }
        }
        s
    }
}

fn label_text(text1: &str, text2: &str) -> String {
    if text2.is_empty() {
        text1.to_string()
    } else {
        format!("{text1} ({text2})")
    }
}

/// SVG sweep flag for an arc from `v_start` to `v_end` around the center.
pub fn arc_sweep_flag(v_start: Point, v_end: Point) -> u8 {
    let mut angle = v_end.angle() - v_start.angle();
    if angle < 0.0 {
        angle += 2.0 * PI;
    }
    if angle < PI { 1 } else { 0 }
}

pub fn line(a: Point, b: Point, class: &str) -> String {
    format!(
        "<line class=\"{class}\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"/>",
        num(a.x),
        num(a.y),
        num(b.x),
        num(b.y)
    )
}

pub fn path(pts: &[Point], closed: bool, class: &str) -> String {
    if pts.is_empty() {
        return String::new();
    }
    let mut d = format!("M {} {}", num(pts[0].x), num(pts[0].y));
    for p in &pts[1..] {
        d.push_str(&format!(" L {} {}", num(p.x), num(p.y)));
    }
    if closed {
        d.push_str(" Z");
    }
    format!("<path class=\"{class}\" d=\"{d}\"/>")
}

/// Device coordinates are written with two decimals.
pub fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    // Avoid "-0.00".
    if s == "-0.00" { "0.00".to_string() } else { s }
}

// Format centimeters:
// - Near-integers (1e-6) as integers
// - Else up to 3 decimals, trim trailing zeros
pub fn fmt_cm(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        format!("{:.0}", v)
    } else {
        format!("{:.3}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
