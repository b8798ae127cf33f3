//! Plain-text rendering of a whole view state.

use super::state::{ResultPanel, ViewState};
use crate::detect::ACCEPTED_EXTENSIONS;
use crate::error::Result;
use crate::model::ConversionResult;
use crate::render::{render_sheet_card, render_tab_strip, to_json, ViewOptions};
use crate::service::Upload;

/// Banner text of a failure that carries no message.
pub const FAILURE_FALLBACK_MESSAGE: &str = "An error occurred while processing the file";

/// Render the upload card followed by whatever the state has to show.
pub fn render_view(state: &ViewState, options: &ViewOptions) -> Result<String> {
    let mut blocks = vec![render_upload_card(state)];

    match state {
        ViewState::Succeeded { result, panel, .. } => {
            blocks.push(success_banner(result));
            blocks.push(render_action_bar(panel));
            if panel.show_raw_json {
                blocks.push(format!(
                    "Raw JSON Output\n{}",
                    to_json(result, options.json_format)?
                ));
            }
            if !result.sheets().is_empty() {
                blocks.push(render_tab_strip(result.sheets(), panel.active_tab));
                if let Some(sheet) = result.sheets().get(panel.active_tab) {
                    blocks.push(render_sheet_card(sheet, options));
                }
            }
        }
        ViewState::Failed { result, .. } => blocks.push(failure_banner(result)),
        ViewState::Idle | ViewState::FileSelected { .. } | ViewState::Processing { .. } => {}
    }

    Ok(blocks.join("\n\n"))
}

/// Upload card: title, accepted formats, chosen file and the submit control.
pub fn render_upload_card(state: &ViewState) -> String {
    let mut accepted: Vec<String> = ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect();
    if let Some(last) = accepted.last_mut() {
        if ACCEPTED_EXTENSIONS.len() > 1 {
            *last = format!("and {}", last);
        }
    }
    let file_line = match state.upload() {
        Some(upload) => format!("File: {}", describe_upload(upload)),
        None => "File: (none selected)".to_string(),
    };
    let button = if state.is_processing() {
        "[ Processing... ]".to_string()
    } else if state.can_submit() {
        "[ Extract Data ]".to_string()
    } else {
        "[ Extract Data ] (disabled)".to_string()
    };

    format!(
        "Upload Excel File\nSupports {} files\n{}\n{}",
        accepted.join(", "),
        file_line,
        button
    )
}

/// Success banner with sheet and row totals.
pub fn success_banner(result: &ConversionResult) -> String {
    format!(
        "Successfully extracted data from {} - Found {} sheet(s) with {} total rows",
        result.file_name(),
        result.total_sheets(),
        result.total_rows()
    )
}

/// Failure banner; falls back to a generic message.
pub fn failure_banner(result: &ConversionResult) -> String {
    let message = result
        .error()
        .filter(|m| !m.is_empty())
        .unwrap_or(FAILURE_FALLBACK_MESSAGE);
    format!("Error: {}", message)
}

/// Download, copy and raw JSON toggle controls.
pub fn render_action_bar(panel: &ResultPanel) -> String {
    let toggle = if panel.show_raw_json {
        "Hide Raw JSON"
    } else {
        "Show Raw JSON"
    };
    format!("[ Download JSON ] [ Copy to Clipboard ] [ {} ]", toggle)
}

fn describe_upload(upload: &Upload) -> String {
    let name = if upload.file_name.is_empty() {
        "(unnamed)"
    } else {
        upload.file_name.as_str()
    };
    format!("{} ({})", name, format_size(upload.len()))
}

/// Human-readable byte count.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
