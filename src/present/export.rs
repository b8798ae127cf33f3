//! Download and clipboard exports of a conversion result.

use crate::error::Result;
use crate::model::ConversionResult;
use crate::render::{to_json, JsonFormat};
use std::path::{Path, PathBuf};

/// Suffix appended to the base name of a downloaded result.
pub const DOWNLOAD_SUFFIX: &str = "_extracted.json";

/// Destination for copied text.
pub trait Clipboard {
    /// Replace the clipboard contents.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Download file name: the original name without its last extension, plus
/// [`DOWNLOAD_SUFFIX`].
///
/// ```
/// use unsheet::present::download_file_name;
///
/// assert_eq!(download_file_name("q3.sales.xlsx"), "q3.sales_extracted.json");
/// assert_eq!(download_file_name("README"), "README_extracted.json");
/// ```
pub fn download_file_name(file_name: &str) -> String {
    let base = match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            &file_name[..dot]
        }
        _ => file_name,
    };
    format!("{}{}", base, DOWNLOAD_SUFFIX)
}

/// The exported text: the whole result, pretty-printed with 2-space indentation.
pub fn to_pretty_json(result: &ConversionResult) -> Result<String> {
    to_json(result, JsonFormat::Pretty)
}

/// Write the result into `dir` under its download name.
///
/// Only the last component of the result's file name is used, so the file
/// always lands directly inside `dir`.
pub fn write_download(result: &ConversionResult, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(download_file_name(last_component(result.file_name())));
    std::fs::write(&path, to_pretty_json(result)?)?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

fn last_component(file_name: &str) -> &str {
    file_name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(file_name)
}

/// Put the exported text on a clipboard.
pub fn copy_to_clipboard(result: &ConversionResult, clipboard: &mut dyn Clipboard) -> Result<()> {
    clipboard.set_text(&to_pretty_json(result)?)
}
