//! Delimited text (CSV) reader.

use crate::error::Result;
use crate::model::{CellRef, RawCell, RawSheet, Workbook};

/// Name of the single sheet a CSV workbook holds.
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// Delimiters tried by [`sniff_delimiter`], in tie-break order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Read delimited text, guessing the delimiter from the first line.
pub fn read_workbook(data: &[u8]) -> Result<Workbook> {
    let text = decode_text(data);
    let delimiter = sniff_delimiter(&text);
    log::debug!("csv delimiter: {:?}", delimiter as char);
    read_text(&text, delimiter)
}

/// Read delimited text with a known delimiter.
pub fn read_workbook_with(data: &[u8], delimiter: u8) -> Result<Workbook> {
    read_text(&decode_text(data), delimiter)
}

fn read_text(text: &str, delimiter: u8) -> Result<Workbook> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut sheet = RawSheet::new(CSV_SHEET_NAME);
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            sheet.set(CellRef::new(row as u32, col as u32), detect_type(field));
        }
    }

    let mut workbook = Workbook::new();
    workbook.add_sheet(sheet);
    Ok(workbook)
}

/// Decode bytes as UTF-8, replacing invalid sequences and dropping a BOM.
fn decode_text(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

/// Pick the candidate delimiter seen most often on the first line.
///
/// Characters inside double quotes are ignored; `,` wins when nothing matches.
pub fn sniff_delimiter(text: &str) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;

    for b in text.bytes() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d == b) {
                    counts[i] += 1;
                }
            }
            _ => {}
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// Detect the type of a field value.
fn detect_type(field: &str) -> RawCell {
    let trimmed = field.trim();

    if trimmed.is_empty() {
        return RawCell::Empty;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return RawCell::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return RawCell::Bool(false);
    }

    // f64 parsing also accepts "inf" and "NaN", which stay text here
    let numeric_start = trimmed
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if numeric_start {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return RawCell::Number(n);
            }
        }
    }

    RawCell::Text(field.to_string())
}
