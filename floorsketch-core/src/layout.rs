//! Page composition: frame, metadata boxes, compass and the centered plan
//! body for one layer.

use tracing::debug;

use crate::error::Result;
use crate::geometry::{Bounds, Point};
use crate::model::{DrawingKind, Part};
use crate::plan::{Entries, PlanSet};
use crate::settings::PlanSettings;
use crate::shapes::{Shape, line, num, path, svg_escape};
use crate::style::{Stylesheet, class_for};

const PLAN_MARGIN: f64 = 50.0;
const INFO_BOX_HEIGHT: f64 = 50.0;
const INFO_BOX_PADDING: f64 = 5.0;
const COMPASS_INSET: f64 = 80.0;
const DEBUG_LINE_GAP: f64 = 15.0;

/// Everything the compositor needs besides the plan itself.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub debug: bool,
    pub stylesheet: Stylesheet,
    /// Printed in the watermark.
    pub version: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            debug: false,
            stylesheet: Stylesheet::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Finished page of one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerCanvas {
    pub layer: String,
    pub svg: String,
    /// Page size in device units.
    pub width: f64,
    pub height: f64,
}

/// Shapes of one layer, sorted and centered but not yet written out.
#[derive(Clone, Debug)]
pub struct LayerBody {
    /// Kind, identifier and shape in drawing order.
    pub shapes: Vec<(DrawingKind, String, Shape)>,
    pub bounds: Option<Bounds>,
    /// Translation applied to every shape.
    pub offset: Point,
}

pub struct Compositor<'a> {
    plan: &'a PlanSet,
    settings: PlanSettings,
    config: LayoutConfig,
    width: f64,
    height: f64,
}

impl<'a> Compositor<'a> {
    pub fn new(plan: &'a PlanSet, config: LayoutConfig) -> Result<Self> {
        let settings = PlanSettings::from_entries(plan.settings())?;
        let (width, height) = settings.page_size.size_dots();
        Ok(Compositor {
            plan,
            settings,
            config,
            width,
            height,
        })
    }

    pub fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Metadata shown on the page of `layer`.
    pub fn meta_information(&self, layer: &str) -> Entries {
        let mut meta = self.plan.meta_information().clone();
        meta.insert("Scale", &format!("1 : {}", self.settings.scale_divisor));
        meta.insert("Layer", layer);
        meta
    }

    /// One page per layer, in sorted layer order.
    pub fn compose_all(&self) -> Vec<LayerCanvas> {
        self.plan
            .layers()
            .into_iter()
            .map(|layer| self.compose_layer(layer))
            .collect()
    }

    pub fn compose_layer(&self, layer: &str) -> LayerCanvas {
        let meta = self.meta_information(layer);
        let rows = meta.len().div_ceil(2);
        let meta_height = INFO_BOX_HEIGHT * rows as f64;
        let body_height = self.height - meta_height;

        let mut s = String::new();
        s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        s.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = num(self.width),
            h = num(self.height),
        ));
        s.push_str("<style>\n");
        s.push_str(&self.config.stylesheet.to_css());
        s.push_str("</style>\n");
        s.push_str(&self.plan_border(&meta));
        s.push_str(&self.compass());
        if self.config.debug {
            let anchor = Point::new(
                PLAN_MARGIN + 10.0,
                self.height - PLAN_MARGIN - meta_height - 10.0,
            );
            s.push_str(&axes(anchor));
        }

        let body = self.layout_body(layer, self.width, body_height);
        debug!(layer, shapes = body.shapes.len(), "composed layer");
        s.push_str(&format!(
            "<g transform=\"translate({} {})\">\n",
            num(body.offset.x),
            num(body.offset.y)
        ));
        for (kind, _, shape) in &body.shapes {
            s.push_str(&shape.to_svg(class_for(*kind)));
            s.push('\n');
        }
        if self.config.debug {
            s.push_str(&self.debug_callouts(layer, self.width - body.offset.x));
        }
        s.push_str("</g>\n");
        s.push_str("</svg>\n");

        LayerCanvas {
            layer: layer.to_string(),
            svg: s,
            width: self.width,
            height: self.height,
        }
    }

    /// Build the shapes of `layer` in drawing order and center the outlines
    /// inside a `body_width` x `body_height` area.
    pub fn layout_body(&self, layer: &str, body_width: f64, body_height: f64) -> LayerBody {
        let scale = self.settings.scale_divisor as f64;
        let mut shapes = Vec::new();
        let mut bounds: Option<Bounds> = None;
        for part in sorted_parts(self.plan, layer) {
            let Some(shape) = Shape::from_part(part, scale) else {
                continue;
            };
            if part.kind.is_polygon()
                && let Some(b) = shape.bounds()
            {
                bounds = Some(bounds.map_or(b, |acc| acc.union(b)));
            }
            shapes.push((part.kind, part.identifier.clone(), shape));
        }
        let center = bounds.map(|b| b.center()).unwrap_or(Point::ORIGIN);
        let offset = Point::new(body_width / 2.0, body_height / 2.0) - center;
        LayerBody {
            shapes,
            bounds,
            offset,
        }
    }

    fn plan_border(&self, meta: &Entries) -> String {
        let frame_w = self.width - PLAN_MARGIN * 2.0;
        let frame_h = self.height - PLAN_MARGIN * 2.0;
        let mut s = format!(
            "<rect class=\"plan-border\" width=\"{}\" height=\"{}\" x=\"{}\" y=\"{}\"/>\n",
            num(frame_w),
            num(frame_h),
            num(PLAN_MARGIN),
            num(PLAN_MARGIN)
        );
        s.push_str(&format!(
            "<text class=\"watermark-text\" x=\"{}\" y=\"{}\">Created with floorsketch v{}</text>\n",
            num(PLAN_MARGIN),
            num(PLAN_MARGIN + frame_h + 10.0),
            svg_escape(&self.config.version),
        ));

        let box_w = frame_w / 3.0;
        for (i, (key, value)) in meta.iter().enumerate() {
            let origin = info_box_origin(i, frame_w, frame_h);
            s.push_str(&format!(
                "<rect class=\"plan-border\" width=\"{}\" height=\"{}\" x=\"{}\" y=\"{}\"/>\n",
                num(box_w),
                num(INFO_BOX_HEIGHT),
                num(origin.x),
                num(origin.y)
            ));
            s.push_str(&format!(
                "<text class=\"meta-information-key\" x=\"{}\" y=\"{}\">{}</text>\n",
                num(origin.x + INFO_BOX_PADDING),
                num(origin.y + INFO_BOX_PADDING + 10.0),
                svg_escape(key)
            ));
            s.push_str(&format!(
                "<text class=\"meta-information-text\" x=\"{}\" y=\"{}\">{}</text>\n",
                num(origin.x + box_w / 2.0),
                num(origin.y + INFO_BOX_HEIGHT - INFO_BOX_PADDING - 5.0),
                svg_escape(value)
            ));
        }
        s
    }

    fn compass(&self) -> String {
        let mut s = format!(
            "<g transform=\"translate({} {})\">\n<g transform=\"rotate({} 0 0)\">\n",
            num(PLAN_MARGIN + COMPASS_INSET),
            num(self.height - PLAN_MARGIN - COMPASS_INSET),
            self.settings.compass_rotation
        );
        s.push_str("<circle r=\"50\" stroke=\"black\" stroke-width=\"2\" fill=\"none\"/>\n");
        s.push_str("<circle r=\"25\" stroke=\"black\" stroke-width=\"2\" fill=\"none\"/>\n");
        s.push_str("<circle r=\"2\" stroke=\"black\" stroke-width=\"2\" fill=\"black\"/>\n");
        s.push_str("<line y1=\"-25\" y2=\"25\" stroke=\"black\" stroke-width=\"2\"/>\n");
        for (x, y, letter) in [(0, -30, "N"), (0, 45, "S"), (-40, 7, "W"), (40, 7, "E")] {
            s.push_str(&format!(
                "<text x=\"{x}\" y=\"{y}\" font-family=\"monospace\" font-size=\"20\" text-anchor=\"middle\" fill=\"black\">{letter}</text>\n"
            ));
        }
        s.push_str("</g></g>\n");
        s
    }

    /// Point numbers and identifiers of the outlined parts, listed down the
    /// right edge of the body.
    fn debug_callouts(&self, layer: &str, right_edge: f64) -> String {
        let scale = self.settings.scale_divisor as f64;
        let mut s = String::new();
        let annotated = sorted_parts(self.plan, layer).filter(|p| {
            matches!(
                p.kind,
                DrawingKind::Outline | DrawingKind::Room | DrawingKind::RoomConnection | DrawingKind::OpeningArc
            )
        });
        for (i, part) in annotated.enumerate() {
            let points: Vec<Point> = part
                .absolute_points()
                .into_iter()
                .map(|p| p.to_device(scale))
                .collect();
            let text_at = Point::new(right_edge, -(i as f64) * DEBUG_LINE_GAP);
            if let Some(first) = points.first() {
                s.push_str(&line(text_at + Point::new(-70.0, -5.0), *first, "debug-line"));
                s.push('\n');
            }
            for (n, p) in points.iter().enumerate() {
                s.push_str(&format!(
                    "<text class=\"debug-text\" text-anchor=\"middle\" x=\"{}\" y=\"{}\">{}</text>\n",
                    num(p.x),
                    num(p.y + 5.0),
                    n + 1
                ));
            }
            s.push_str(&format!(
                "<text class=\"debug-text\" text-anchor=\"end\" x=\"{}\" y=\"{}\">{}</text>\n",
                num(text_at.x),
                num(text_at.y),
                svg_escape(&part.identifier)
            ));
        }
        s
    }
}

/// Parts of `layer` by drawing kind; equal kinds keep their table order.
pub fn sorted_parts<'a>(plan: &'a PlanSet, layer: &'a str) -> impl Iterator<Item = &'a Part> + 'a {
    let mut parts: Vec<&Part> = plan.parts_in_layer(layer).collect();
    parts.sort_by_key(|p| p.kind);
    parts.into_iter()
}

/// Top-left corner of metadata box `index`. Boxes fill two per row from the
/// bottom-right corner of the frame upwards.
pub fn info_box_origin(index: usize, frame_w: f64, frame_h: f64) -> Point {
    let box_w = frame_w / 3.0;
    Point::new(
        PLAN_MARGIN + frame_w - box_w * ((index % 2) as f64 + 1.0),
        PLAN_MARGIN + frame_h - INFO_BOX_HEIGHT * ((index / 2) as f64 + 1.0),
    )
}

fn axes(anchor: Point) -> String {
    let y_tip = anchor + Point::new(0.0, -50.0);
    let x_tip = anchor + Point::new(50.0, 0.0);
    let mut s = path(&[y_tip, anchor, x_tip], false, "debug-line");
    s.push('\n');
    s.push_str(&format!(
        "<text class=\"debug-text\" text-anchor=\"end\" x=\"{}\" y=\"{}\">x</text>\n",
        num(x_tip.x),
        num(x_tip.y - 5.0)
    ));
    s.push_str(&format!(
        "<text class=\"debug-text\" x=\"{}\" y=\"{}\">y</text>\n",
        num(y_tip.x + 5.0),
        num(y_tip.y + 5.0)
    ));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RawRow;

    fn plan(rows: &[&[&str]]) -> PlanSet {
        let mut plan = PlanSet::with_date("01.01.2024");
        for r in rows {
            plan.add_data(&RawRow::from_cells(r)).unwrap();
        }
        plan
    }

    fn base_rows() -> Vec<&'static [&'static str]> {
        vec![
            &["ScaleDivisor", "", "Settings", "", "", "50"],
            &["CompassRotation", "", "Settings", "", "", "30"],
            &["W1", "L1", "Outline", "", "", "(0,0)", "(0,100)", "(100,100)", "(100,0)"],
        ]
    }

    #[test]
    fn test_meta_information_appends_scale_and_layer() {
        let p = plan(&base_rows());
        let c = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let meta: Vec<_> = c.meta_information("L1").iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(
            meta,
            vec![
                ("Date".to_string(), "01.01.2024".to_string()),
                ("Scale".to_string(), "1 : 50".to_string()),
                ("Layer".to_string(), "L1".to_string()),
            ]
        );
    }

    #[test]
    fn test_info_boxes_tile_from_bottom_right() {
        let (fw, fh) = (300.0, 600.0);
        assert_eq!(info_box_origin(0, fw, fh), Point::new(250.0, 600.0));
        assert_eq!(info_box_origin(1, fw, fh), Point::new(150.0, 600.0));
        assert_eq!(info_box_origin(2, fw, fh), Point::new(250.0, 550.0));
    }

    #[test]
    fn test_body_is_centered() {
        let mut rows = base_rows();
        rows.push(&["R1", "L1", "Room", "", "(W1-1)+(300,0)", "(0,0)", "(40,0)", "(40,-60)"]);
        rows.push(&["D1", "L1", "XDim", "5", "(W1-1)", "(W1-1)", "(W1-4)+(900,0)"]);
        let p = plan(&rows);
        let c = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let body = c.layout_body("L1", 500.0, 700.0);
        let moved = body.bounds.unwrap().translate(body.offset);
        let center = moved.center();
        assert!((center.x - 250.0).abs() < 1e-9);
        assert!((center.y - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_body_centers_origin() {
        let p = plan(&[
            &["ScaleDivisor", "", "Settings", "", "", "50"],
            &["T", "L1", "Label", "", "(0,0)", "Empty"],
        ]);
        let c = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let body = c.layout_body("L1", 400.0, 600.0);
        assert!(body.bounds.is_none());
        assert_eq!(body.offset, Point::new(200.0, 300.0));
    }

    #[test]
    fn test_z_order() {
        let mut rows = base_rows();
        rows.push(&["D", "L1", "YDim", "", "", "(W1-1)", "(W1-2)"]);
        rows.push(&["T", "L1", "Label", "", "(50,50)", "Hall"]);
        rows.push(&["R2", "L1", "Room", "", "", "(0,0)", "(1,1)", "(1,0)"]);
        rows.push(&["R1", "L1", "Room", "", "", "(0,0)", "(2,2)", "(2,0)"]);
        let p = plan(&rows);
        let c = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let order: Vec<String> = c
            .layout_body("L1", 100.0, 100.0)
            .shapes
            .into_iter()
            .map(|(_, id, _)| id)
            .collect();
        assert_eq!(order, vec!["W1", "R2", "R1", "T", "D"]);
    }

    #[test]
    fn test_compose_layer_markup() {
        let p = plan(&base_rows());
        let c = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let canvas = c.compose_layer("L1");
        assert_eq!(canvas.layer, "L1");
        assert_eq!((canvas.width, canvas.height), c.page_size());
        assert!(canvas.svg.contains("<path class=\"outline\""));
        assert!(canvas.svg.contains("rotate(30 0 0)"));
        assert!(canvas.svg.contains(">1 : 50</text>"));
        assert!(!canvas.svg.contains("debug-text\" text-anchor"));
        assert!(canvas.svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_debug_overlay_keeps_offset() {
        let p = plan(&base_rows());
        let plain = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let debug = Compositor::new(
            &p,
            LayoutConfig {
                debug: true,
                ..LayoutConfig::default()
            },
        )
        .unwrap();
        let a = plain.compose_layer("L1").svg;
        let b = debug.compose_layer("L1").svg;
        // The body group is the last translated group, after the compass.
        let group = |s: &str| {
            s.lines()
                .filter(|l| l.starts_with("<g transform=\"translate"))
                .last()
                .map(str::to_string)
        };
        assert_eq!(group(&a), group(&b));
        assert!(b.contains(">W1</text>"));
        assert!(b.contains(">4</text>"));
    }

    #[test]
    fn test_compose_all_sorted() {
        let mut rows = base_rows();
        rows.push(&["W1", "A0", "Outline", "", "", "(0,0)", "(10,0)"]);
        let p = plan(&rows);
        let c = Compositor::new(&p, LayoutConfig::default()).unwrap();
        let layers: Vec<String> = c.compose_all().into_iter().map(|c| c.layer).collect();
        assert_eq!(layers, vec!["A0", "L1"]);
    }

    #[test]
    fn test_missing_scale_divisor_fails() {
        let p = plan(&[&["W", "L", "Outline", "", "", "(0,0)"]]);
        assert!(Compositor::new(&p, LayoutConfig::default()).is_err());
    }
}
