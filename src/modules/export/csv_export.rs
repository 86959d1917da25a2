//! CSV Export
//!
//! Writes the rows of a list table to a CSV file.

use crate::session::render::TableView;
use std::path::Path;

/// Write the table header and rows. Returns the number of data rows written.
pub fn write_table(path: &Path, table: &TableView) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = table.columns.clone();
    header.push("link");
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = row.cells.clone();
        record.push(row.link.as_ref().map(|r| r.to_path()).unwrap_or_default());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(table.rows.len())
}
