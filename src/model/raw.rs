//! Raw workbook structures produced by the format readers.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Largest row count of a worksheet (Excel 2007+).
pub const MAX_ROWS: u32 = 1_048_576;

/// Largest column count of a worksheet (Excel 2007+, column XFD).
pub const MAX_COLUMNS: u32 = 16_384;

/// A cell exactly as a reader found it, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawCell {
    /// No value
    #[default]
    Empty,
    /// Text (shared, inline, or formula string result)
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Date or time as a serial number in the 1900 date system
    Date(f64),
    /// Error value such as `#DIV/0!`
    Error(String),
}

impl RawCell {
    /// Whether the cell carries no usable value.
    ///
    /// Empty strings and error values count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty | RawCell::Error(_) => true,
            RawCell::Text(s) => s.is_empty(),
            RawCell::Number(_) | RawCell::Bool(_) | RawCell::Date(_) => false,
        }
    }
}

/// A zero-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    /// Zero-based row index
    pub row: u32,
    /// Zero-based column index
    pub col: u32,
}

impl CellRef {
    /// Create a coordinate from zero-based indices.
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference (`"B3"`, `"$AA$10"`).
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = || Error::InvalidData(format!("invalid cell reference '{}'", reference));
        let reference = reference.trim();

        let mut col: u32 = 0;
        let mut row: u32 = 0;
        let mut letters = 0usize;
        let mut digits = 0usize;

        for c in reference.chars().filter(|&c| c != '$') {
            if c.is_ascii_alphabetic() && digits == 0 {
                col = col
                    .checked_mul(26)
                    .and_then(|v| v.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
                    .ok_or_else(invalid)?;
                letters += 1;
            } else if c.is_ascii_digit() && letters > 0 {
                row = row
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(c as u32 - '0' as u32))
                    .ok_or_else(invalid)?;
                digits += 1;
            } else {
                return Err(invalid());
            }
        }

        if letters == 0 || digits == 0 || row == 0 || row > MAX_ROWS || col > MAX_COLUMNS {
            return Err(invalid());
        }

        Ok(Self {
            row: row - 1,
            col: col - 1,
        })
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

/// Convert a zero-based column index to its letter name (0 -> A, 26 -> AA).
pub fn column_name(col: u32) -> String {
    let mut name = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// An inclusive rectangular cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellRef,
    /// Bottom-right corner
    pub end: CellRef,
}

impl CellRange {
    /// Parse an A1-style range (`"A1:C10"`) or a single cell (`"B2"`).
    pub fn parse(range: &str) -> Result<Self> {
        match range.split_once(':') {
            Some((start, end)) => {
                let start = CellRef::parse(start)?;
                let end = CellRef::parse(end)?;
                Ok(Self {
                    start: CellRef::new(start.row.min(end.row), start.col.min(end.col)),
                    end: CellRef::new(start.row.max(end.row), start.col.max(end.col)),
                })
            }
            None => {
                let cell = CellRef::parse(range)?;
                Ok(Self {
                    start: cell,
                    end: cell,
                })
            }
        }
    }

    /// Number of rows spanned.
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns spanned.
    pub fn column_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Cells of one row, keyed by zero-based column.
pub type RawRow = BTreeMap<u32, RawCell>;

/// One worksheet as a sparse grid of placed cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// Sheet name as shown on the workbook tab
    pub name: String,
    /// Range the file declares as used, when it declares one
    pub declared_range: Option<CellRange>,
    rows: BTreeMap<u32, RawRow>,
}

impl RawSheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a sheet from rows of cells starting at A1.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        let mut sheet = Self::new(name);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                sheet.set(CellRef::new(r as u32, c as u32), cell);
            }
        }
        sheet
    }

    /// Place a cell. Empty cells are not stored.
    pub fn set(&mut self, at: CellRef, cell: RawCell) {
        if cell == RawCell::Empty {
            return;
        }
        self.rows.entry(at.row).or_default().insert(at.col, cell);
    }

    /// Get a cell, if one was placed there.
    pub fn get(&self, at: CellRef) -> Option<&RawCell> {
        self.rows.get(&at.row).and_then(|r| r.get(&at.col))
    }

    /// Cells of one row, if any were placed in it.
    pub fn row(&self, row: u32) -> Option<&RawRow> {
        self.rows.get(&row)
    }

    /// Rows holding at least one placed cell, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &RawRow)> {
        self.rows.iter().map(|(r, cells)| (*r, cells))
    }

    /// Number of placed cells.
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Bounding range of all non-blank cells.
    pub fn used_range(&self) -> Option<CellRange> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;

        for (&r, row) in &self.rows {
            for (&c, cell) in row {
                if cell.is_blank() {
                    continue;
                }
                bounds = Some(match bounds {
                    None => (r, c, r, c),
                    Some((r0, c0, r1, c1)) => (r0.min(r), c0.min(c), r1.max(r), c1.max(c)),
                });
            }
        }

        bounds.map(|(r0, c0, r1, c1)| CellRange {
            start: CellRef::new(r0, c0),
            end: CellRef::new(r1, c1),
        })
    }
}

/// Every sheet of a workbook, in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// Sheets in the order the reader reported them
    pub sheets: Vec<RawSheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet.
    pub fn add_sheet(&mut self, sheet: RawSheet) {
        self.sheets.push(sheet);
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}
