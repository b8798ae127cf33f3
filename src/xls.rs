//! Legacy Excel 97-2003 (.xls) workbook reader.

use crate::error::Result;
use crate::model::{
    datetime_to_serial, CellRange, CellRef, RawCell, RawSheet, Workbook, MAX_COLUMNS, MAX_ROWS,
};
use calamine::{Data, ExcelDateTime, Reader, Xls};
use std::io::Cursor;

/// Read a BIFF workbook from its bytes.
pub fn read_workbook(data: Vec<u8>) -> Result<Workbook> {
    let mut xls = Xls::new(Cursor::new(data))?;
    let mut workbook = Workbook::new();

    for name in xls.sheet_names() {
        let range = xls.worksheet_range(&name)?;
        let mut sheet = RawSheet::new(name.as_str());

        if let (Some(start), Some(end)) = (range.start(), range.end()) {
            sheet.declared_range = Some(CellRange {
                start: CellRef::new(start.0, start.1),
                end: CellRef::new(end.0, end.1),
            });

            for (row, col, value) in range.used_cells() {
                // used_cells coordinates are relative to range.start()
                let Some(at) = to_cell_ref(start, row, col) else {
                    log::warn!(
                        "skipping out-of-bounds cell in sheet '{}' at ({}, {})",
                        name,
                        row,
                        col
                    );
                    continue;
                };
                sheet.set(at, convert_value(value));
            }
        }

        workbook.add_sheet(sheet);
    }

    log::debug!("xls workbook: {} sheet(s)", workbook.sheets.len());
    Ok(workbook)
}

fn to_cell_ref(start: (u32, u32), row: usize, col: usize) -> Option<CellRef> {
    let row = start.0.checked_add(u32::try_from(row).ok()?)?;
    let col = start.1.checked_add(u32::try_from(col).ok()?)?;
    if row >= MAX_ROWS || col >= MAX_COLUMNS {
        return None;
    }
    Some(CellRef::new(row, col))
}

fn convert_value(value: &Data) -> RawCell {
    match value {
        Data::Empty => RawCell::Empty,
        Data::Bool(v) => RawCell::Bool(*v),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Float(v) => RawCell::Number(*v),
        Data::String(v) => RawCell::Text(v.clone()),
        Data::Error(e) => RawCell::Error(e.to_string()),
        Data::DateTime(v) => convert_datetime(v),
        Data::DateTimeIso(v) | Data::DurationIso(v) => RawCell::Text(v.clone()),
    }
}

/// Dates are rebased onto the 1900 system; durations become elapsed time.
fn convert_datetime(value: &ExcelDateTime) -> RawCell {
    if value.is_duration() {
        return match value.as_duration() {
            Some(duration) => RawCell::Text(format_elapsed(duration.num_seconds())),
            None => RawCell::Number(value.as_f64()),
        };
    }

    match value.as_datetime() {
        Some(datetime) => RawCell::Date(datetime_to_serial(datetime)),
        None => {
            log::debug!("date serial {} has no calendar date", value.as_f64());
            RawCell::Number(value.as_f64())
        }
    }
}

/// `[h]:mm:ss` style text; hours are not wrapped at 24.
fn format_elapsed(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
