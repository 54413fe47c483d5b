//! Spreadsheet writer
//!
//! `Input` and `Identifier` columns use the text number format (`@`) and are
//! always written as strings, so spreadsheet applications keep leading zeros
//! and never switch long digit strings to scientific notation.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use rust_xlsxwriter::{ColNum, Format, Workbook, Worksheet};

use super::table::{self, string_column};
use crate::error::{DigipostError, Result};

/// Name of the result sheet
pub const SHEET_NAME: &str = "Opslag";

/// Spreadsheet text number format
const TEXT_FORMAT: &str = "@";

/// Sheet columns: header, source column, text-typed, width
const COLUMNS: [(&str, &str, bool, f64); 5] = [
    ("Input", table::INPUT, true, 16.0),
    ("Type", table::KIND, false, 20.0),
    ("Identifier", table::IDENTIFIER, true, 14.0),
    ("Status", table::STATUS, false, 26.0),
    ("Detail", table::DETAIL, false, 50.0),
];

/// Render a report batch into xlsx bytes
pub fn render_batch(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), batch)?;
    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(worksheet: &mut Worksheet, batch: &RecordBatch) -> Result<()> {
    let header = Format::new().set_bold();
    let text = Format::new().set_num_format(TEXT_FORMAT);

    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, _, is_text, width)) in COLUMNS.iter().enumerate() {
        let col = column_number(col)?;
        worksheet.set_column_width(col, *width)?;
        if *is_text {
            worksheet.set_column_format(col, &text)?;
        }
        worksheet.write_string_with_format(0, col, *title, &header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (col, (_, source, is_text, _)) in COLUMNS.iter().enumerate() {
        let col = column_number(col)?;
        let values = string_column(batch, source)?;
        for row in 0..values.len() {
            if values.is_null(row) {
                continue;
            }
            let sheet_row = u32::try_from(row + 1)
                .map_err(|_| DigipostError::Report("Too many rows for one sheet".to_string()))?;
            if *is_text {
                worksheet.write_string_with_format(sheet_row, col, values.value(row), &text)?;
            } else {
                worksheet.write_string(sheet_row, col, values.value(row))?;
            }
        }
    }

    Ok(())
}

fn column_number(index: usize) -> Result<ColNum> {
    ColNum::try_from(index).map_err(|_| DigipostError::Report(format!("Column {index} out of range")))
}
