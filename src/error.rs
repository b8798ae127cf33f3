//! Error types for the unsheet library.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for unsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or normalizing a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error reading delimited text.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Error reading a legacy BIFF workbook.
    #[error("XLS error: {0}")]
    Xls(String),

    /// Invalid or malformed data in the workbook.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// A cell value could not be coerced into a serializable value.
    #[error("Cannot coerce cell {cell} in sheet '{sheet}': {reason}")]
    Coercion {
        sheet: String,
        cell: String,
        reason: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(String),

    /// Error during rendering.
    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// Classify this error for a failed conversion result.
    ///
    /// Reader errors are parse failures; anything raised after the workbook
    /// was read is unexpected.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            Error::Io(_)
            | Error::UnknownFormat
            | Error::ZipArchive(_)
            | Error::XmlParse(_)
            | Error::Csv(_)
            | Error::Xls(_)
            | Error::InvalidData(_)
            | Error::MissingComponent(_) => FailureKind::ParseFailure,
            Error::Coercion { .. } | Error::Json(_) | Error::Render(_) => FailureKind::Unexpected,
        }
    }
}

/// Why a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// No file content was attached to the submission.
    MissingInput,
    /// Neither the declared type nor the file extension is accepted.
    UnsupportedFormat,
    /// The reader rejected the file content.
    ParseFailure,
    /// Anything else, including failures while normalizing cells.
    Unexpected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::MissingInput => "missing input",
            FailureKind::UnsupportedFormat => "unsupported format",
            FailureKind::ParseFailure => "parse failure",
            FailureKind::Unexpected => "unexpected failure",
        };
        f.write_str(name)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

#[cfg(feature = "xls")]
impl From<calamine::XlsError> for Error {
    fn from(err: calamine::XlsError) -> Self {
        Error::Xls(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format");

        let err = Error::UnsupportedFormat("ZIP archive without a workbook".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported format: ZIP archive without a workbook"
        );

        let err = Error::Coercion {
            sheet: "Data".to_string(),
            cell: "B2".to_string(),
            reason: "number is not finite".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot coerce cell B2 in sheet 'Data': number is not finite"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.failure_kind(), FailureKind::ParseFailure);
    }

    #[test]
    fn test_failure_kind_classification() {
        assert_eq!(
            Error::XmlParse("bad".into()).failure_kind(),
            FailureKind::ParseFailure
        );
        assert_eq!(
            Error::UnsupportedFormat("x".into()).failure_kind(),
            FailureKind::UnsupportedFormat
        );
        assert_eq!(
            Error::Json("x".into()).failure_kind(),
            FailureKind::Unexpected
        );
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::MissingInput.to_string(), "missing input");
        assert_eq!(FailureKind::Unexpected.to_string(), "unexpected failure");
    }
}
