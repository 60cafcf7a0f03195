//! Floor plan generation from a table of parts.
//!
//! Rows are ingested into a [`PlanSet`], which resolves point expressions as
//! it goes. A [`Compositor`] then turns every layer into one SVG page.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod plan;
pub mod resolver;
pub mod settings;
pub mod shapes;
pub mod style;

pub use error::InputError;
pub use geometry::{Bounds, Point};
pub use layout::{Compositor, LayerCanvas, LayoutConfig};
pub use model::{DrawingKind, Part, PartData};
pub use plan::{PlanSet, RawRow};
pub use settings::{PageSize, PlanSettings};
pub use style::Stylesheet;

use tracing::warn;

/// Ingest `rows` in order. Rows without a type are skipped. The first
/// faulty row aborts with its identifier, layer and line as context.
pub fn plan_from_rows<I>(rows: I) -> Result<PlanSet, InputError>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut plan = PlanSet::new();
    for row in rows {
        if row.kind.is_empty() {
            warn!(
                line = row.line,
                identifier = %row.identifier,
                layer = %row.layer,
                "skipping row without type"
            );
            continue;
        }
        plan.add_data(&row)?;
    }
    Ok(plan)
}
