use crate::model::DrawingKind;

/// CSS rules embedded into every generated page.
#[derive(Clone, Debug, PartialEq)]
pub struct Stylesheet {
    rules: Vec<(String, Vec<String>)>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        let mut s = Stylesheet { rules: Vec::new() };
        s.set("plan-border", &["fill: none", "stroke: black", "stroke-width: 2px"]);
        s.set("watermark-text", &["font-size: 8pt", "font-family: monospace"]);
        s.set(
            "meta-information-key",
            &["font-size: 10pt", "font-family: monospace", "text-anchor: start"],
        );
        s.set(
            "meta-information-text",
            &[
                "font-size: 10pt",
                "font-family: monospace",
                "font-weight: bold",
                "text-anchor: middle",
            ],
        );
        s.set(
            "label-text",
            &["fill: black", "font-size: 10pt", "font-family: monospace", "font-weight: bold"],
        );
        s.set(
            "debug-text",
            &["fill: #ac9d00", "font-size: 10pt", "font-family: monospace", "font-weight: bold"],
        );
        s.set("debug-line", &["fill: none", "stroke: #ac9d00", "stroke-width: 0.5px"]);
        s.set(
            "dim-text",
            &[
                "fill: #a10000",
                "font-size: 3mm",
                "font-family: monospace",
                "font-weight: bold",
                "text-anchor: middle",
            ],
        );
        s.set("dim-line", &["fill: none", "stroke: black", "stroke-width: 0.5px"]);
        s.set("outline", &["fill: #2b2b2b", "stroke: black", "stroke-width: 1px"]);
        s.set("room", &["fill: #d9d9d9", "stroke: black", "stroke-width: 1px"]);
        s.set("stairs", &["fill: #b3b3b3", "stroke: black", "stroke-width: 1px"]);
        s.set("steps", &["fill: none", "stroke: black", "stroke-width: 1px"]);
        s.set("room-connection", &["fill: #797979", "stroke: black", "stroke-width: 1px"]);
        s.set("opening-arc", &["fill: #b3b3b3", "stroke: black", "stroke-width: 0.5px"]);
        s
    }
}

impl Stylesheet {
    /// Add or replace the declarations of `class`.
    pub fn set(&mut self, class: &str, declarations: &[&str]) {
        let decl = declarations.iter().map(|d| d.to_string()).collect();
        match self.rules.iter_mut().find(|(c, _)| c == class) {
            Some((_, d)) => *d = decl,
            None => self.rules.push((class.to_string(), decl)),
        }
    }

    pub fn to_css(&self) -> String {
        let mut s = String::new();
        for (class, decl) in &self.rules {
            s.push_str(&format!(".{class} {{\n"));
            for d in decl {
                s.push_str(d);
                s.push_str(";\n");
            }
            s.push_str("}\n");
        }
        s
    }
}

/// Base class name for parts of `kind`. Dimensions use `dim-text` and
/// `dim-line`, derived from the base.
pub fn class_for(kind: DrawingKind) -> &'static str {
    match kind {
        DrawingKind::Outline => "outline",
        DrawingKind::Room => "room",
        DrawingKind::Stairs => "stairs",
        DrawingKind::Steps => "steps",
        DrawingKind::RoomConnection => "room-connection",
        DrawingKind::OpeningArc => "opening-arc",
        DrawingKind::XDim | DrawingKind::XDimCompact | DrawingKind::YDim | DrawingKind::YDimCompact => "dim",
        DrawingKind::Label => "label-text",
        DrawingKind::Settings | DrawingKind::MetaInformation => "",
    }
}
