use std::io::{Cursor, Read};

use arrow::array::{Array, StringArray};
use arrow::datatypes::DataType;
use calamine::{Data, Reader, Xlsx};
use digipost_lookup::report::table::{DETAIL, IDENTIFIER, INPUT, STATUS};
use digipost_lookup::report::to_record_batch;
use digipost_lookup::{LookupError, Pipeline, ResultTable, render, save_report};

use crate::utils::{ScriptedRegistry, test_config};

async fn sample_table() -> ResultTable {
    let input = vec![
        "0101011234".to_string(),
        "ABC123".to_string(),
        "55133018".to_string(),
        "0202021234".to_string(),
    ];
    let registry = ScriptedRegistry::new()
        .registered(["0101011234"])
        .failing("0202021234", LookupError::NotFound);
    Pipeline::new(registry, test_config())
        .unwrap()
        .run(&input)
        .await
        .unwrap()
}

fn strings<'a>(batch: &'a arrow::record_batch::RecordBatch, name: &str) -> &'a StringArray {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
}

/// Leading zeros survive because identifiers are stored as text
#[tokio::test]
async fn test_identifiers_stay_text() {
    let table = sample_table().await;
    let batch = to_record_batch(&table).unwrap();

    let schema = batch.schema();
    assert_eq!(
        schema.field_with_name(IDENTIFIER).unwrap().data_type(),
        &DataType::Utf8
    );
    assert_eq!(schema.field_with_name(INPUT).unwrap().data_type(), &DataType::Utf8);

    let identifiers = strings(&batch, IDENTIFIER);
    assert_eq!(identifiers.value(0), "0101011234");
    assert_eq!(identifiers.value(0).len(), 10);
    assert!(identifiers.is_null(1));
    assert_eq!(identifiers.value(2), "55133018");
}

/// One row per input, statuses and details in input order
#[tokio::test]
async fn test_batch_rows_follow_input() {
    let table = sample_table().await;
    let batch = to_record_batch(&table).unwrap();
    assert_eq!(batch.num_rows(), 4);

    let statuses = strings(&batch, STATUS);
    let details = strings(&batch, DETAIL);
    assert_eq!(statuses.value(0), table.get(0).unwrap().status().label());
    assert!(details.is_null(0));
    assert_eq!(statuses.value(1), statuses.value(3));
    assert!(!details.is_null(1));
    assert_eq!(details.value(3), "identifier not found in registry");
    assert_eq!(strings(&batch, INPUT).value(1), "ABC123");
}

/// Rendered bytes are an xlsx (zip) container
#[tokio::test]
async fn test_render_produces_workbook() {
    let table = sample_table().await;
    let bytes = render(&table).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

/// Read the result sheet of rendered report bytes
fn read_sheet(bytes: &[u8]) -> calamine::Range<Data> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
    workbook.worksheet_range("Opslag").unwrap()
}

fn cell(sheet: &calamine::Range<Data>, row: u32, col: u32) -> Option<Data> {
    sheet.get_value((row, col)).cloned()
}

fn text(value: &str) -> Option<Data> {
    Some(Data::String(value.to_string()))
}

/// The written sheet keeps identifiers as text cells, in input order
#[tokio::test]
async fn test_rendered_sheet_keeps_identifiers_as_text() {
    let table = sample_table().await;
    let sheet = read_sheet(&render(&table).unwrap());

    assert_eq!(cell(&sheet, 0, 0), text("Input"));
    assert_eq!(cell(&sheet, 0, 2), text("Identifier"));
    assert_eq!(cell(&sheet, 0, 3), text("Status"));

    // C2: leading zero and all ten characters survive
    assert_eq!(cell(&sheet, 1, 2), text("0101011234"));

    let inputs: Vec<Option<Data>> = (1..=4).map(|row| cell(&sheet, row, 0)).collect();
    assert_eq!(
        inputs,
        vec![
            text("0101011234"),
            text("ABC123"),
            text("55133018"),
            text("0202021234"),
        ]
    );
    assert_eq!(cell(&sheet, 3, 2), text("55133018"));
    assert_eq!(cell(&sheet, 4, 2), text("0202021234"));
    assert_eq!(cell(&sheet, 4, 4), text("identifier not found in registry"));
}

/// Input and Identifier columns carry the text number format
#[tokio::test]
async fn test_rendered_sheet_uses_text_format() {
    let table = sample_table().await;
    let bytes = render(&table).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

    let mut styles = String::new();
    archive
        .by_name("xl/styles.xml")
        .unwrap()
        .read_to_string(&mut styles)
        .unwrap();
    // 49 is the built-in "@" (text) number format
    assert!(styles.contains(r#"numFmtId="49""#));

    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut sheet)
        .unwrap();
    assert!(sheet.contains(r#"<c r="C2" s="#));
    assert!(sheet.contains(r#"<c r="A2" s="#));
}

/// An empty batch still renders a workbook with just the header
#[tokio::test]
async fn test_render_empty_table() {
    let input: Vec<String> = Vec::new();
    let table = Pipeline::new(ScriptedRegistry::new(), test_config())
        .unwrap()
        .run(&input)
        .await
        .unwrap();
    assert_eq!(to_record_batch(&table).unwrap().num_rows(), 0);
    assert!(render(&table).unwrap().starts_with(b"PK"));
}

#[tokio::test]
async fn test_save_report_writes_file() {
    let table = sample_table().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    save_report(&table, &path).unwrap();
    let written = std::fs::read(&path).unwrap();
    assert!(written.starts_with(b"PK"));
}
