//! # unsheet
//!
//! Spreadsheet to JSON extraction.
//!
//! This library reads XLSX, XLS and CSV files, normalizes every worksheet
//! into header-keyed row records and produces a serializable
//! [`ConversionResult`]. A small presentation layer renders results as
//! terminal tables and handles the download and clipboard exports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unsheet::convert_file;
//!
//! let result = convert_file("sales.xlsx")?;
//! for sheet in result.sheets() {
//!     println!("{}: {} rows x {} columns", sheet.sheet_name(), sheet.row_count(), sheet.column_count());
//! }
//!
//! let json = unsheet::render::to_json(&result, unsheet::render::JsonFormat::Pretty)?;
//! std::fs::write("sales_extracted.json", json)?;
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! ## Uploads
//!
//! ```no_run
//! use unsheet::{convert, Upload};
//!
//! let bytes = std::fs::read("export.dat")?;
//! let upload = Upload::new("export.dat", bytes).with_content_type("text/csv");
//! let result = convert(&upload);
//!
//! match result.error() {
//!     None => println!("{} sheet(s)", result.total_sheets()),
//!     Some(message) => eprintln!("{}", message),
//! }
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! ## Features
//!
//! - `xlsx` (default): Excel 2007+ workbook support
//! - `xls` (default): Excel 97-2003 workbook support
//! - `csv` (default): delimited text support
//! - `async`: Async file loading with Tokio

pub mod container;
pub mod detect;
pub mod error;
pub mod model;
pub mod normalize;
pub mod present;
pub mod render;
pub mod service;

#[cfg(feature = "xlsx")]
pub mod xlsx;

#[cfg(feature = "xls")]
pub mod xls;

#[cfg(feature = "csv")]
pub mod delimited;

// Re-exports
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, FailureKind, Result};
pub use model::{CellValue, ConversionResult, Outcome, RowRecord, SheetTable};
pub use service::{ConversionService, Converter, Upload};

use std::path::Path;

/// Convert an upload into a result.
///
/// Never fails; problems are reported through a failed [`ConversionResult`].
pub fn convert(upload: &Upload) -> ConversionResult {
    ConversionService::new().convert(upload)
}

/// Convert in-memory file content.
///
/// # Example
///
/// ```no_run
/// use unsheet::convert_bytes;
///
/// let result = convert_bytes("people.csv", b"name,age\nAda,36\n".to_vec());
/// assert!(result.is_success());
/// ```
pub fn convert_bytes(file_name: impl Into<String>, content: Vec<u8>) -> ConversionResult {
    convert(&Upload::new(file_name, content))
}

/// Read a file from disk and convert it.
///
/// Only reading the file can fail; conversion problems are part of the result.
pub fn convert_file(path: impl AsRef<Path>) -> Result<ConversionResult> {
    let upload = Upload::from_path(path)?;
    Ok(convert(&upload))
}

/// Read a file with Tokio and convert it on a blocking thread.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> unsheet::Result<()> {
/// let result = unsheet::convert_file_async("sales.xlsx").await?;
/// println!("{} sheet(s)", result.total_sheets());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
pub async fn convert_file_async(path: impl AsRef<Path>) -> Result<ConversionResult> {
    let path = path.as_ref();
    let content = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut upload = Upload::new(file_name, content);
    if let Some(format) = FormatType::from_file_name(&upload.file_name) {
        upload = upload.with_content_type(format.content_type());
    }

    tokio::task::spawn_blocking(move || convert(&upload))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))
}
