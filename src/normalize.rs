//! Turns raw worksheets into normalized sheet tables.
//!
//! The first non-blank row supplies the headers and every later non-blank row
//! becomes one record. Columns span the used extent of the sheet, so a record
//! always holds a value for every header.

use crate::error::{Error, Result};
use crate::model::{
    format_number, serial_to_iso, CellRef, CellValue, RawCell, RawSheet, RowRecord, SheetTable,
    Workbook,
};
use std::collections::HashMap;

/// Header used for a blank header cell.
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Normalize every sheet of a workbook, in workbook order.
pub fn normalize_workbook(workbook: &Workbook) -> Result<Vec<SheetTable>> {
    workbook.sheets.iter().map(normalize_sheet).collect()
}

/// Normalize one worksheet.
pub fn normalize_sheet(sheet: &RawSheet) -> Result<SheetTable> {
    let Some(used) = sheet.used_range() else {
        log::debug!("sheet '{}' has no values", sheet.name);
        return Ok(SheetTable::new(sheet.name.clone(), Vec::new()));
    };

    if let Some(declared) = sheet.declared_range {
        if declared != used {
            log::debug!(
                "sheet '{}': declared range {} differs from used range {}",
                sheet.name,
                declared,
                used
            );
        }
    }

    let first_col = used.start.col;
    let last_col = used.end.col;

    // used_range starts on the first row holding a non-blank cell
    let header_row = used.start.row;
    let headers = build_headers(sheet, header_row, first_col, last_col)?;

    let mut records = Vec::new();
    for (r, cells) in sheet.rows().filter(|(r, _)| *r > header_row) {
        if cells.range(first_col..).all(|(_, cell)| cell.is_blank()) {
            continue;
        }

        let mut record = RowRecord::with_capacity(headers.len());
        for (col, header) in (first_col..=last_col).zip(&headers) {
            let value = match cells.get(&col) {
                Some(cell) => coerce(cell, sheet, r, col)?,
                None => CellValue::empty(),
            };
            record.push(header.clone(), value);
        }
        records.push(record);
    }

    Ok(SheetTable::new(sheet.name.clone(), records))
}

/// Build distinct header names from the header row.
///
/// A repeated name takes the next free `_N` suffix, counting on from the
/// last suffix handed out for that name. Generated names are reserved too,
/// so `a_1, a, a` becomes `a_1, a, a_2`.
fn build_headers(
    sheet: &RawSheet,
    row: u32,
    first_col: u32,
    last_col: u32,
) -> Result<Vec<String>> {
    let cells = sheet.row(row);
    let mut headers: Vec<String> = Vec::with_capacity((last_col - first_col + 1) as usize);
    let mut seen: HashMap<String, usize> = HashMap::new();

    for col in first_col..=last_col {
        let base = match cells.and_then(|c| c.get(&col)) {
            Some(cell) => header_text(cell, sheet, row, col)?,
            None => String::new(),
        };
        let base = if base.is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            base
        };

        let name = match seen.get(&base).copied() {
            None => {
                seen.insert(base.clone(), 1);
                base
            }
            Some(mut counter) => {
                let mut candidate = format!("{}_{}", base, counter);
                while seen.contains_key(&candidate) {
                    counter += 1;
                    candidate = format!("{}_{}", base, counter);
                }
                seen.insert(base, counter + 1);
                seen.insert(candidate.clone(), 1);
                candidate
            }
        };
        headers.push(name);
    }

    Ok(headers)
}

fn header_text(cell: &RawCell, sheet: &RawSheet, row: u32, col: u32) -> Result<String> {
    Ok(match cell {
        RawCell::Bool(true) => "TRUE".to_string(),
        RawCell::Bool(false) => "FALSE".to_string(),
        RawCell::Error(_) => String::new(),
        other => coerce(other, sheet, row, col)?.display_text(),
    })
}

/// Coerce a raw cell into a serializable value; blank cells become `""`.
fn coerce(cell: &RawCell, sheet: &RawSheet, row: u32, col: u32) -> Result<CellValue> {
    let failure = |reason: String| Error::Coercion {
        sheet: sheet.name.clone(),
        cell: CellRef::new(row, col).to_string(),
        reason,
    };

    match cell {
        RawCell::Empty | RawCell::Error(_) => Ok(CellValue::empty()),
        RawCell::Text(s) => Ok(CellValue::Text(s.clone())),
        RawCell::Bool(b) => Ok(CellValue::Bool(*b)),
        RawCell::Number(n) if n.is_finite() => Ok(CellValue::Number(*n)),
        RawCell::Number(n) => Err(failure(format!(
            "number {} is not finite",
            format_number(*n)
        ))),
        RawCell::Date(serial) => serial_to_iso(*serial)
            .map(CellValue::Text)
            .ok_or_else(|| failure(format!("date serial {} is out of range", serial))),
    }
}
