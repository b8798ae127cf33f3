//! XLSX (Excel) workbook reader.
//!
//! Reads Office Open XML workbooks (.xlsx, .xlsm) into a raw [`Workbook`]
//! with cells placed at their A1 references.
//!
//! # Example
//!
//! ```no_run
//! use unsheet::xlsx::XlsxReader;
//!
//! let bytes = std::fs::read("budget.xlsx")?;
//! let workbook = XlsxReader::from_bytes(bytes)?.read()?;
//!
//! for sheet in &workbook.sheets {
//!     println!("Sheet: {} ({} cells)", sheet.name, sheet.cell_count());
//! }
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! [`Workbook`]: crate::model::Workbook

mod parser;
mod shared_strings;
mod styles;

pub use parser::XlsxReader;

use crate::error::Result;
use crate::model::Workbook;

/// Read an XLSX workbook from its bytes.
pub fn read_workbook(data: Vec<u8>) -> Result<Workbook> {
    XlsxReader::from_bytes(data)?.read()
}
