//! Format detection and upload acceptance for spreadsheet files.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE compound document magic bytes, used by BIFF8 `.xls` workbooks.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for the XLSX workbook part in `[Content_Types].xml`.
const XLSX_WORKBOOK_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Macro-enabled workbooks share the worksheet layout of plain XLSX.
const XLSM_WORKBOOK_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

/// MIME types an upload may declare.
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
];

/// File extensions accepted when the declared type is missing or unknown.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// Detected spreadsheet format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Office Open XML workbook (.xlsx)
    Xlsx,
    /// Legacy BIFF workbook (.xls)
    Xls,
    /// Comma-separated (or otherwise delimited) text (.csv)
    Csv,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "xlsx",
            FormatType::Xls => "xls",
            FormatType::Csv => "csv",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Xls => "Excel 97-2003 Workbook",
            FormatType::Csv => "CSV Text",
        }
    }

    /// Returns the MIME type a browser would declare for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            FormatType::Xlsx => ACCEPTED_CONTENT_TYPES[0],
            FormatType::Xls => ACCEPTED_CONTENT_TYPES[1],
            FormatType::Csv => ACCEPTED_CONTENT_TYPES[2],
        }
    }

    /// Look up a format by file name extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(FormatType::Xlsx),
            "xls" => Some(FormatType::Xls),
            "csv" => Some(FormatType::Csv),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decide whether an upload may be handed to a reader.
///
/// The declared type is checked first; the file name extension is the
/// fallback, so a file with an unexpected type but a recognized extension is
/// still accepted.
pub fn is_accepted_upload(content_type: Option<&str>, file_name: &str) -> bool {
    let declared = content_type
        .map(|t| t.trim().to_ascii_lowercase())
        .is_some_and(|t| ACCEPTED_CONTENT_TYPES.contains(&t.as_str()));

    declared || FormatType::from_file_name(file_name).is_some()
}

/// Detect the format type from a file path.
///
/// # Example
///
/// ```no_run
/// use unsheet::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("report.xlsx")?;
/// println!("Detected format: {}", format);
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let mut file = File::open(path.as_ref())?;
    let mut magic = [0u8; 8];
    let read = file.read(&mut magic)?;
    file.rewind()?;

    if is_cfb_file(&magic[..read]) {
        Ok(FormatType::Xls)
    } else if is_zip_file(&magic[..read]) {
        detect_zip_workbook(BufReader::new(file))
    } else {
        Ok(FormatType::Csv)
    }
}

/// Detect the format type from file content.
///
/// The content decides which reader runs, not the name: ZIP archives must
/// carry a spreadsheet workbook, OLE compound files are read as BIFF, and
/// everything else is treated as delimited text.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if is_cfb_file(data) {
        return Ok(FormatType::Xls);
    }

    if is_zip_file(data) {
        let cursor = std::io::Cursor::new(data);
        return detect_zip_workbook(cursor);
    }

    Ok(FormatType::Csv)
}

/// Verify that a ZIP archive is a spreadsheet workbook.
fn detect_zip_workbook<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Some(decode_xml_bytes(&bytes)?)
        }
        Err(_) => None,
    };

    if let Some(types) = content_types {
        if types.contains(XLSX_WORKBOOK_CONTENT_TYPE) || types.contains(XLSM_WORKBOOK_CONTENT_TYPE)
        {
            return Ok(FormatType::Xlsx);
        }
    }

    // Fallback: a package with an xl/ folder and a workbook part
    if archive.file_names().any(|n| n == "xl/workbook.xml") {
        Ok(FormatType::Xlsx)
    } else {
        Err(Error::InvalidData(
            "ZIP archive does not contain an Excel workbook".to_string(),
        ))
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Check if data starts with OLE compound document magic bytes.
pub fn is_cfb_file(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == CFB_MAGIC
}
