use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;
use crate::geometry::Point;

/// Kind of a table row. Declaration order is the drawing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DrawingKind {
    Settings,
    MetaInformation,
    Outline,
    Room,
    Stairs,
    Steps,
    OpeningArc,
    RoomConnection,
    Label,
    XDim,
    XDimCompact,
    YDim,
    YDimCompact,
}

impl DrawingKind {
    pub const ALL: [DrawingKind; 13] = [
        DrawingKind::Settings,
        DrawingKind::MetaInformation,
        DrawingKind::Outline,
        DrawingKind::Room,
        DrawingKind::Stairs,
        DrawingKind::Steps,
        DrawingKind::OpeningArc,
        DrawingKind::RoomConnection,
        DrawingKind::Label,
        DrawingKind::XDim,
        DrawingKind::XDimCompact,
        DrawingKind::YDim,
        DrawingKind::YDimCompact,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DrawingKind::Settings => "Settings",
            DrawingKind::MetaInformation => "MetaInformation",
            DrawingKind::Outline => "Outline",
            DrawingKind::Room => "Room",
            DrawingKind::Stairs => "Stairs",
            DrawingKind::Steps => "Steps",
            DrawingKind::OpeningArc => "OpeningArc",
            DrawingKind::RoomConnection => "RoomConnection",
            DrawingKind::Label => "Label",
            DrawingKind::XDim => "XDim",
            DrawingKind::XDimCompact => "XDimCompact",
            DrawingKind::YDim => "YDim",
            DrawingKind::YDimCompact => "YDimCompact",
        }
    }

    /// Dimension endpoints are absolute, never relative to the row reference.
    pub fn is_dimension(self) -> bool {
        matches!(
            self,
            DrawingKind::XDim | DrawingKind::XDimCompact | DrawingKind::YDim | DrawingKind::YDimCompact
        )
    }

    /// Closed outlines; only these take part in centering.
    pub fn is_polygon(self) -> bool {
        matches!(
            self,
            DrawingKind::Outline | DrawingKind::Room | DrawingKind::Stairs | DrawingKind::RoomConnection
        )
    }

    pub fn is_plan_entry(self) -> bool {
        matches!(self, DrawingKind::Settings | DrawingKind::MetaInformation)
    }
}

impl fmt::Display for DrawingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrawingKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "XDimC" => return Ok(DrawingKind::XDimCompact),
            "YDimC" => return Ok(DrawingKind::YDimCompact),
            _ => {}
        }
        DrawingKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| InputError::UnknownKind(s.to_string()))
    }
}

/// Payload of a part, selected by its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum PartData {
    Geometry { points: Vec<Point>, dim_offset: f64 },
    Text { text1: String, text2: String },
}

/// One drawing element of a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub identifier: String,
    pub kind: DrawingKind,
    pub layer: String,
    /// Anchor of the part; `None` means the origin.
    pub reference: Option<Point>,
    pub data: PartData,
}

impl Part {
    pub fn points(&self) -> &[Point] {
        match &self.data {
            PartData::Geometry { points, .. } => points,
            PartData::Text { .. } => &[],
        }
    }

    pub fn dim_offset(&self) -> f64 {
        match &self.data {
            PartData::Geometry { dim_offset, .. } => *dim_offset,
            PartData::Text { .. } => 0.0,
        }
    }

    pub fn reference_or_origin(&self) -> Point {
        self.reference.unwrap_or(Point::ORIGIN)
    }

    /// Points translated by the reference, still in drawing space.
    pub fn absolute_points(&self) -> Vec<Point> {
        let r = self.reference_or_origin();
        self.points().iter().map(|p| *p + r).collect()
    }
}

/// Parse the optional `DimOffset` column.
pub fn parse_dim_offset(raw: &str) -> Result<f64, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(InputError::InvalidDimOffset(raw.to_string())),
    }
}
