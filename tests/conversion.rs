//! End-to-end conversion tests over in-memory workbooks.

mod common;

use common::{Cell, XlsxBuilder};
use unsheet::model::UNSUPPORTED_FORMAT_MESSAGE;
use unsheet::present::{render_view, write_download, Phase, Session};
use unsheet::render::{from_json, to_json, JsonFormat, ViewOptions};
use unsheet::{
    convert, convert_bytes, CellValue, ConversionResult, ConversionService, FailureKind, Upload,
};

fn sales_workbook() -> Vec<u8> {
    XlsxBuilder::new()
        .sheet(
            "Q1",
            &[
                &[Cell::Text("Region"), Cell::Text("Units"), Cell::Text("Closed")],
                &[Cell::Text("North"), Cell::Num(120.0), Cell::Bool(true)],
                &[Cell::Text("South"), Cell::Num(87.5), Cell::Bool(false)],
            ],
        )
        .sheet(
            "Q2",
            &[
                &[Cell::Text("Region"), Cell::Text("Units")],
                &[Cell::Text("East"), Cell::Num(42.0)],
            ],
        )
        .build()
}

fn assert_consistent(result: &ConversionResult) {
    assert_eq!(result.sheets().len(), result.total_sheets());
    for sheet in result.sheets() {
        assert_eq!(sheet.row_count(), sheet.rows().len());
        let expected_columns = sheet.rows().first().map_or(0, |r| r.len());
        if !sheet.rows().is_empty() {
            assert_eq!(sheet.column_count(), expected_columns);
        }
    }
}

#[test]
fn test_xlsx_conversion() {
    let result = convert_bytes("sales.xlsx", sales_workbook());

    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.file_name(), "sales.xlsx");
    assert_eq!(result.total_sheets(), 2);
    assert_eq!(result.total_rows(), 3);
    assert_consistent(&result);

    let q1 = result.sheet("Q1").unwrap();
    assert_eq!(q1.headers(), &["Region", "Units", "Closed"]);
    assert_eq!(q1.cell(1, "Units"), Some(&CellValue::Number(87.5)));
    assert_eq!(q1.cell(0, "Closed"), Some(&CellValue::Bool(true)));
    assert_eq!(result.sheets()[1].sheet_name(), "Q2");
}

#[test]
fn test_json_shape_and_roundtrip() {
    let result = convert_bytes("sales.xlsx", sales_workbook());
    let json = to_json(&result, JsonFormat::Pretty).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["totalSheets"], 2);
    assert_eq!(value["fileName"], "sales.xlsx");
    assert_eq!(value["sheets"][0]["sheetName"], "Q1");
    assert_eq!(value["sheets"][0]["rowCount"], 2);
    assert_eq!(value["sheets"][0]["columnCount"], 3);
    assert!(value.get("error").is_none());

    assert_eq!(from_json(&json).unwrap(), result);
}

#[test]
fn test_conversion_is_idempotent() {
    let upload = Upload::new("sales.xlsx", sales_workbook());
    let first = to_json(&convert(&upload), JsonFormat::Compact).unwrap();
    let second = to_json(&convert(&upload), JsonFormat::Compact).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rejects_plain_text_upload() {
    let upload = Upload::new("report.txt", b"quarterly numbers".to_vec())
        .with_content_type("text/plain");
    let result = convert(&upload);

    assert!(!result.is_success());
    assert_eq!(result.failure_kind(), Some(FailureKind::UnsupportedFormat));
    assert_eq!(result.error(), Some(UNSUPPORTED_FORMAT_MESSAGE));
    assert!(result.sheets().is_empty());
    assert_eq!(result.total_sheets(), 0);
}

#[test]
fn test_missing_input() {
    let result = convert(&Upload::missing());
    assert_eq!(result.failure_kind(), Some(FailureKind::MissingInput));
    assert_eq!(result.error(), Some("No file provided"));
}

#[test]
fn test_zero_sheet_workbook() {
    let result = convert_bytes("empty.xlsx", XlsxBuilder::new().build());

    assert!(result.is_success());
    assert_eq!(result.total_sheets(), 0);
    assert_eq!(result.total_rows(), 0);
    assert!(result.sheets().is_empty());
}

#[test]
fn test_corrupt_workbook_is_parse_failure() {
    let mut bytes = sales_workbook();
    bytes.truncate(bytes.len() / 2);
    let result = convert_bytes("sales.xlsx", bytes);

    assert!(!result.is_success());
    assert_eq!(result.failure_kind(), Some(FailureKind::ParseFailure));
    assert!(result.sheets().is_empty());
}

#[test]
fn test_blank_rows_and_missing_cells() {
    let bytes = XlsxBuilder::new()
        .sheet(
            "Data",
            &[
                &[Cell::Text("A"), Cell::Text("B"), Cell::Text("C")],
                &[Cell::Text("x"), Cell::Blank, Cell::Num(1.0)],
                &[],
                &[Cell::Blank, Cell::Blank, Cell::Blank],
                &[Cell::Text("y")],
            ],
        )
        .build();
    let result = convert_bytes("gaps.xlsx", bytes);
    let sheet = &result.sheets()[0];

    assert_eq!(sheet.row_count(), 2);
    assert_eq!(sheet.cell(0, "B"), Some(&CellValue::empty()));
    assert_eq!(sheet.cell(1, "A"), Some(&CellValue::from("y")));
    assert_eq!(sheet.cell(1, "C"), Some(&CellValue::empty()));
    // Every record carries every header
    assert!(sheet.rows().iter().all(|r| r.len() == 3));
}

#[test]
fn test_header_dedupe_and_empty_names() {
    let bytes = XlsxBuilder::new()
        .sheet(
            "Dupes",
            &[
                &[Cell::Text("Name"), Cell::Text("Name"), Cell::Blank, Cell::Text("Name")],
                &[Cell::Text("a"), Cell::Text("b"), Cell::Text("c"), Cell::Text("d")],
            ],
        )
        .build();
    let result = convert_bytes("dupes.xlsx", bytes);
    let sheet = &result.sheets()[0];

    assert_eq!(sheet.headers(), &["Name", "Name_1", "__EMPTY", "Name_2"]);
    assert_eq!(sheet.cell(0, "__EMPTY"), Some(&CellValue::from("c")));
}

#[test]
fn test_generated_header_names_never_collide() {
    let result = convert_bytes("dupes.csv", b"a_1,a,a\n1,2,3\n".to_vec());
    let sheet = &result.sheets()[0];

    assert_eq!(sheet.headers(), &["a_1", "a", "a_2"]);
    assert_eq!(sheet.column_count(), 3);
    assert_eq!(sheet.cell(0, "a_1"), Some(&CellValue::Number(1.0)));
    assert_eq!(sheet.cell(0, "a_2"), Some(&CellValue::Number(3.0)));

    let json = to_json(&result, JsonFormat::Compact).unwrap();
    assert_eq!(from_json(&json).unwrap(), result);
}

#[test]
fn test_date_cells_become_iso_text() {
    let bytes = XlsxBuilder::new()
        .sheet(
            "Log",
            &[
                &[Cell::Text("When"), Cell::Text("Count")],
                &[Cell::Date(44197.0), Cell::Num(44197.0)],
                &[Cell::Date(44197.5), Cell::Num(2.0)],
            ],
        )
        .build();
    let result = convert_bytes("log.xlsx", bytes);
    let sheet = &result.sheets()[0];

    assert_eq!(sheet.cell(0, "When"), Some(&CellValue::from("2021-01-01")));
    assert_eq!(sheet.cell(0, "Count"), Some(&CellValue::Number(44197.0)));
    assert_eq!(
        sheet.cell(1, "When"),
        Some(&CellValue::from("2021-01-01T12:00:00"))
    );
}

#[test]
fn test_csv_with_sniffed_delimiter() {
    let result = convert_bytes("people.csv", b"name;age;member\nAda;36;TRUE\n".to_vec());
    let sheet = &result.sheets()[0];

    assert_eq!(sheet.sheet_name(), "Sheet1");
    assert_eq!(sheet.cell(0, "age"), Some(&CellValue::Number(36.0)));
    assert_eq!(sheet.cell(0, "member"), Some(&CellValue::Bool(true)));
}

#[test]
fn test_download_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = convert_bytes("Sales 2024.xlsx", sales_workbook());

    let path = write_download(&result, dir.path()).unwrap();
    assert!(path.ends_with("Sales 2024_extracted.json"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"success\": true"));
    assert_eq!(from_json(&text).unwrap(), result);
}

#[test]
fn test_download_ignores_directories_in_name() {
    let dir = tempfile::tempdir().unwrap();
    let result = convert_bytes("../../Sales.xlsx", sales_workbook());

    let path = write_download(&result, dir.path()).unwrap();
    assert_eq!(path, dir.path().join("Sales_extracted.json"));
    assert!(path.exists());
}

#[test]
fn test_session_flow() {
    let mut session = Session::new(ConversionService::new());
    session.choose_file(Upload::new("sales.xlsx", sales_workbook()));
    assert!(session.state().can_submit());

    let result = session.submit().unwrap();
    assert_eq!(result.total_sheets(), 2);
    assert_eq!(session.state().phase(), Phase::Succeeded);

    session.select_tab(1);
    session.toggle_raw_json();
    let view = render_view(session.state(), &ViewOptions::default()).unwrap();
    assert!(view.contains("Found 2 sheet(s) with 3 total rows"));
    assert!(view.contains("[ Q2 (1) ]"));
    assert!(view.contains("Raw JSON Output"));
    assert!(view.contains("| 1 | East   | 42    |"));

    // A new file discards the previous result
    session.choose_file(Upload::new("notes.txt", b"x".to_vec()));
    assert_eq!(session.state().phase(), Phase::FileSelected);
    assert!(session.state().result().is_none());

    let failed = session.submit().unwrap();
    assert!(!failed.is_success());
    assert_eq!(session.state().phase(), Phase::Failed);
}
