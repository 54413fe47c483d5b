//! Report emitter
//!
//! Renders a [`ResultTable`] as an xlsx workbook with one row per input
//! identifier, in input order.

pub mod table;
pub mod xlsx;

use std::path::Path;

use crate::error::Result;
use crate::outcome::ResultTable;

pub use table::{report_schema, to_record_batch};

/// Render the result table into spreadsheet bytes
///
/// An empty table yields a workbook with only the header row.
pub fn render(table: &ResultTable) -> Result<Vec<u8>> {
    let batch = to_record_batch(table)?;
    let bytes = xlsx::render_batch(&batch)?;
    log::debug!(
        "Rendered report with {} rows ({} bytes)",
        batch.num_rows(),
        bytes.len()
    );
    Ok(bytes)
}

/// Render the result table and write it to `path`
pub fn save_report(table: &ResultTable, path: &Path) -> Result<()> {
    let bytes = render(table)?;
    std::fs::write(path, bytes)?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}
