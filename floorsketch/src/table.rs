use anyhow::{Context, Result};
use floorsketch_core::RawRow;
use std::io;
use std::path::Path;

pub fn read_table(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;
    read_rows(file).with_context(|| format!("Failed to read table: {}", path.display()))
}

/// Read all rows after the header line, tagged with their line numbers.
/// Rows may have any number of cells; blank rows are dropped.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let cells: Vec<&str> = record.iter().collect();
        let mut row = RawRow::from_cells(&cells);
        row.line = record.position().map(|p| p.line());
        rows.push(row);
    }
    Ok(rows)
}
