//! Columnar view of a result table
//!
//! Identifier columns are `Utf8` in the schema itself, so no consumer of the
//! batch can read them back as numbers.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::outcome::ResultTable;

pub const POSITION: &str = "position";
pub const INPUT: &str = "input";
pub const KIND: &str = "kind";
pub const IDENTIFIER: &str = "identifier";
pub const STATUS: &str = "status";
pub const DETAIL: &str = "detail";

/// Schema of the report batch
#[must_use]
pub fn report_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(POSITION, DataType::UInt64, false),
        Field::new(INPUT, DataType::Utf8, false),
        Field::new(KIND, DataType::Utf8, false),
        Field::new(IDENTIFIER, DataType::Utf8, true),
        Field::new(STATUS, DataType::Utf8, false),
        Field::new(DETAIL, DataType::Utf8, true),
    ]))
}

/// Convert a result table into a record batch, one row per outcome
pub fn to_record_batch(table: &ResultTable) -> Result<RecordBatch> {
    let positions = UInt64Array::from_iter_values(table.iter().map(|o| o.position() as u64));
    let inputs: StringArray = table
        .iter()
        .map(|o| Some(o.identifier().raw_input()))
        .collect();
    let kinds: StringArray = table
        .iter()
        .map(|o| Some(o.identifier().kind().label()))
        .collect();
    let identifiers: StringArray = table.iter().map(|o| o.identifier().normalized()).collect();
    let statuses: StringArray = table.iter().map(|o| Some(o.status().label())).collect();
    let details: StringArray = table.iter().map(|o| o.error_detail()).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(positions),
        Arc::new(inputs),
        Arc::new(kinds),
        Arc::new(identifiers),
        Arc::new(statuses),
        Arc::new(details),
    ];

    Ok(RecordBatch::try_new(report_schema(), columns)?)
}

/// Downcast a named column to strings
pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| {
            crate::error::DigipostError::Report(format!("Column '{name}' is not a string column"))
        })
}
