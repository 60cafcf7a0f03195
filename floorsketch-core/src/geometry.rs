use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Sub};

const DOTS_PER_INCH: f64 = 72.0;
const CM_PER_INCH: f64 = 2.54;

/// Two dimensional point. Drawing space is centimeters with y pointing up,
/// device space is PostScript points with y pointing down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn invert_y(self) -> Self {
        Point {
            x: self.x,
            y: -self.y,
        }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    pub fn midpoint(self, other: Point) -> Point {
        (self + other) / 2.0
    }

    /// Angle of the vector against the positive x axis, in radians.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Map a drawing-space point onto the page: unit conversion, scale
    /// division and y inversion.
    pub fn to_device(self, scale_divisor: f64) -> Point {
        Point {
            x: cm_to_dots(self.x) / scale_divisor,
            y: cm_to_dots(self.y) / scale_divisor,
        }
        .invert_y()
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

pub fn cm_to_dots(value: f64) -> f64 {
    value * DOTS_PER_INCH / CM_PER_INCH
}

/// Axis aligned bounding box in device units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn translate(self, offset: Point) -> Bounds {
        Bounds {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }
}

/// Bounds of a point set, `None` when empty.
pub fn bounds_of(pts: &[Point]) -> Option<Bounds> {
    let first = pts.first()?;
    let mut b = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in &pts[1..] {
        b.min_x = b.min_x.min(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_x = b.max_x.max(p.x);
        b.max_y = b.max_y.max(p.y);
    }
    Some(b)
}
