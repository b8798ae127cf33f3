//! Conversion service: one uploaded file in, one conversion result out.

use crate::detect::{detect_format_from_bytes, is_accepted_upload, FormatType};
use crate::error::{Error, FailureKind, Result};
use crate::model::{
    ConversionResult, SheetTable, Workbook, GENERIC_FAILURE_MESSAGE, MISSING_INPUT_MESSAGE,
    UNSUPPORTED_FORMAT_MESSAGE,
};
use crate::normalize::normalize_workbook;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// A file submitted for conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upload {
    /// File name as chosen by the user
    pub file_name: String,
    /// Declared MIME type, if any
    pub content_type: Option<String>,
    /// File content; `None` when nothing was attached
    pub content: Option<Vec<u8>>,
}

impl Upload {
    /// Create an upload with content and no declared type.
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            content: Some(content),
        }
    }

    /// Create a submission without any file attached.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Set the declared MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, declaring the type its extension implies.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type =
            FormatType::from_file_name(&file_name).map(|f| f.content_type().to_string());

        Ok(Self {
            file_name,
            content_type,
            content: Some(content),
        })
    }

    /// Size of the attached content in bytes.
    pub fn len(&self) -> usize {
        self.content.as_ref().map_or(0, Vec::len)
    }

    /// Check if no content is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that turns an upload into a conversion result.
///
/// The `Err` side stands for a failure of the call itself (a transport
/// error); conversion failures are `Ok` results with `success == false`.
pub trait Converter {
    /// Convert one upload.
    fn convert(&self, upload: &Upload) -> Result<ConversionResult>;
}

/// Stateless in-process conversion service.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversionService;

impl ConversionService {
    /// Create a service.
    pub fn new() -> Self {
        Self
    }

    /// Validate, read and normalize an upload.
    ///
    /// Never fails: every error, including a panic inside a reader, becomes a
    /// failed result without sheets.
    pub fn convert(&self, upload: &Upload) -> ConversionResult {
        let content = match upload.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => {
                log::warn!("conversion requested without file content");
                return ConversionResult::failure(
                    "",
                    FailureKind::MissingInput,
                    MISSING_INPUT_MESSAGE,
                );
            }
        };

        if !is_accepted_upload(upload.content_type.as_deref(), &upload.file_name) {
            log::warn!(
                "rejected '{}' (declared type {:?})",
                upload.file_name,
                upload.content_type
            );
            return ConversionResult::failure(
                upload.file_name.as_str(),
                FailureKind::UnsupportedFormat,
                UNSUPPORTED_FORMAT_MESSAGE,
            );
        }

        match panic::catch_unwind(AssertUnwindSafe(|| read_and_normalize(content))) {
            Ok(Ok(sheets)) => {
                log::debug!("converted '{}': {} sheet(s)", upload.file_name, sheets.len());
                ConversionResult::success(upload.file_name.as_str(), sheets)
            }
            Ok(Err(Stage::Read(err))) => {
                log::error!("failed to read '{}': {}", upload.file_name, err);
                ConversionResult::failure("", err.failure_kind(), err.to_string())
            }
            Ok(Err(Stage::Normalize(err))) => {
                log::error!("failed to normalize '{}': {}", upload.file_name, err);
                ConversionResult::failure("", FailureKind::Unexpected, err.to_string())
            }
            Err(_) => {
                log::error!("conversion of '{}' panicked", upload.file_name);
                ConversionResult::failure("", FailureKind::Unexpected, GENERIC_FAILURE_MESSAGE)
            }
        }
    }
}

impl Converter for ConversionService {
    fn convert(&self, upload: &Upload) -> Result<ConversionResult> {
        Ok(ConversionService::convert(self, upload))
    }
}

/// Where in the pipeline an error was raised.
enum Stage {
    Read(Error),
    Normalize(Error),
}

fn read_and_normalize(content: &[u8]) -> std::result::Result<Vec<SheetTable>, Stage> {
    let format = detect_format_from_bytes(content).map_err(Stage::Read)?;
    log::debug!("reading {} ({} bytes)", format.name(), content.len());
    let workbook = read_workbook(format, content).map_err(Stage::Read)?;
    normalize_workbook(&workbook).map_err(Stage::Normalize)
}

/// Read raw content with the reader for `format`.
pub fn read_workbook(format: FormatType, content: &[u8]) -> Result<Workbook> {
    match format {
        #[cfg(feature = "xlsx")]
        FormatType::Xlsx => crate::xlsx::read_workbook(content.to_vec()),
        #[cfg(feature = "xls")]
        FormatType::Xls => crate::xls::read_workbook(content.to_vec()),
        #[cfg(feature = "csv")]
        FormatType::Csv => crate::delimited::read_workbook(content),
        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedFormat(format!(
            "{} support is not enabled",
            other.name()
        ))),
    }
}
