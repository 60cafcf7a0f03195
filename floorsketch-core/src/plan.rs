use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{InputError, Result};
use crate::geometry::Point;
use crate::model::{DrawingKind, Part, PartData, parse_dim_offset};
use crate::resolver::Resolver;

/// One table row before interpretation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub identifier: String,
    pub layer: String,
    pub kind: String,
    pub dim_offset: String,
    pub reference: String,
    pub payload: Vec<String>,
    /// Line in the source table, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl RawRow {
    /// Build a row from table cells `[Identifier, Layer, Type, DimOffset, Reference, Payload...]`.
    /// Cells are trimmed and trailing empty payload cells dropped.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> RawRow {
        let cell = |i: usize| {
            cells
                .get(i)
                .map(|c| c.as_ref().trim().to_string())
                .unwrap_or_default()
        };
        let mut payload: Vec<String> = cells
            .iter()
            .skip(5)
            .map(|c| c.as_ref().trim().to_string())
            .collect();
        while payload.last().is_some_and(|s| s.is_empty()) {
            payload.pop();
        }
        RawRow {
            identifier: cell(0),
            layer: cell(1),
            kind: cell(2),
            dim_offset: cell(3),
            reference: cell(4),
            payload,
            line: None,
        }
    }
}

/// Insertion ordered string map. Re-inserting a key keeps its position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entries(Vec<(String, String)>);

impl Entries {
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// All parts of a plan plus its metadata and settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanSet {
    parts: Vec<Part>,
    meta_information: Entries,
    settings: Entries,
}

impl Default for PlanSet {
    fn default() -> Self {
        PlanSet::new()
    }
}

impl PlanSet {
    pub fn new() -> Self {
        let today = chrono::Local::now().format("%d.%m.%Y").to_string();
        PlanSet::with_date(&today)
    }

    /// Same as `new` with a fixed date entry.
    pub fn with_date(date: &str) -> Self {
        let mut meta_information = Entries::default();
        meta_information.insert("Date", date);
        let mut settings = Entries::default();
        settings.insert("PageSize", "A4");
        PlanSet {
            parts: Vec::new(),
            meta_information,
            settings,
        }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn meta_information(&self) -> &Entries {
        &self.meta_information
    }

    pub fn settings(&self) -> &Entries {
        &self.settings
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.parts)
    }

    /// Interpret one row. Points are resolved right away, so a row can only
    /// reference rows added before it.
    pub fn add_data(&mut self, row: &RawRow) -> Result<()> {
        debug!(
            identifier = %row.identifier,
            layer = %row.layer,
            kind = %row.kind,
            "adding data: {:?}",
            row.payload
        );
        self.ingest(row)
            .map_err(|e| e.in_row(&row.identifier, &row.layer, row.line))
    }

    fn ingest(&mut self, row: &RawRow) -> Result<()> {
        let kind: DrawingKind = row.kind.parse()?;
        if kind.is_plan_entry() {
            let value = row
                .payload
                .first()
                .ok_or_else(|| InputError::MissingValue(kind.name().to_string()))?;
            let entries = if kind == DrawingKind::Settings {
                &mut self.settings
            } else {
                &mut self.meta_information
            };
            entries.insert(&row.identifier, value);
        } else {
            let part = self.build_part(kind, row)?;
            self.parts.push(part);
        }
        Ok(())
    }

    fn build_part(&self, kind: DrawingKind, row: &RawRow) -> Result<Part> {
        let resolver = self.resolver().for_row(&row.identifier);
        let reference = resolver.resolve_optional(&row.reference, &row.layer)?;

        let data = if kind == DrawingKind::Label {
            let text1 = row.payload.first().ok_or(InputError::MissingLabelText)?;
            PartData::Text {
                text1: text1.clone(),
                text2: row.payload.get(1).cloned().unwrap_or_default(),
            }
        } else {
            let dim_offset = parse_dim_offset(&row.dim_offset)?;
            let relative_to = if kind.is_dimension() { None } else { reference };
            let points = row
                .payload
                .iter()
                .map(|expr| resolver.resolve(expr, &row.layer, relative_to))
                .collect::<Result<Vec<Point>>>()?;
            check_point_count(kind, points.len())?;
            PartData::Geometry { points, dim_offset }
        };

        Ok(Part {
            identifier: row.identifier.clone(),
            kind,
            layer: row.layer.clone(),
            reference,
            data,
        })
    }

    /// Parts of `layer` in insertion order.
    pub fn parts_in_layer<'a>(&'a self, layer: &'a str) -> impl Iterator<Item = &'a Part> + 'a {
        self.parts.iter().filter(move |p| p.layer == layer)
    }

    /// Layer names, sorted.
    pub fn layers(&self) -> Vec<&str> {
        self.parts
            .iter()
            .map(|p| p.layer.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn check_point_count(kind: DrawingKind, got: usize) -> Result<()> {
    let (ok, expected) = match kind {
        DrawingKind::Steps => (got > 0 && got % 2 == 0, "an even, non-zero number of"),
        DrawingKind::OpeningArc => (got == 3, "3"),
        k if k.is_dimension() => (got == 2, "2"),
        _ => (got > 0, "at least 1"),
    };
    if ok {
        Ok(())
    } else {
        Err(InputError::PointCount {
            kind: kind.name().to_string(),
            expected: expected.to_string(),
            got,
        })
    }
}
