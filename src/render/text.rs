//! Plain text renderer implementation.

use crate::error::Result;
use crate::model::{ConversionResult, SheetTable};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::options::ViewOptions;

/// Header of the row index column.
const INDEX_HEADER: &str = "#";

/// Convert every sheet of a result to plain text, one card after another.
///
/// A failed result renders as its error message.
pub fn to_text(result: &ConversionResult, options: &ViewOptions) -> Result<String> {
    if let Some(error) = result.error() {
        return Ok(format!("Error: {}", error));
    }

    let cards: Vec<String> = result
        .sheets()
        .iter()
        .map(|sheet| render_sheet_card(sheet, options))
        .collect();
    Ok(cards.join("\n\n"))
}

/// Render one sheet: title, dimensions, optional header badges and the table.
pub fn render_sheet_card(sheet: &SheetTable, options: &ViewOptions) -> String {
    let mut output = String::new();
    output.push_str(sheet.sheet_name());
    output.push('\n');
    output.push_str(&format!(
        "{} rows × {} columns\n",
        sheet.row_count(),
        sheet.column_count()
    ));

    if options.show_header_badges && !sheet.headers().is_empty() {
        let badges: Vec<String> = sheet
            .headers()
            .iter()
            .map(|h| format!("[{}]", clean_cell_text(h)))
            .collect();
        output.push_str("Headers: ");
        output.push_str(&badges.join(" "));
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&render_table(sheet, options));
    output
}

/// Render the tab strip: one tab per sheet with its row count, active tab bracketed.
pub fn render_tab_strip(sheets: &[SheetTable], active: usize) -> String {
    sheets
        .iter()
        .enumerate()
        .map(|(i, sheet)| {
            let label = format!("{} ({})", sheet.sheet_name(), sheet.row_count());
            if i == active {
                format!("[ {} ]", label)
            } else {
                format!("  {}  ", label)
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Render a sheet as an ASCII table with a 1-based row index column.
pub fn render_table(sheet: &SheetTable, options: &ViewOptions) -> String {
    if sheet.headers().is_empty() {
        return "(no data)".to_string();
    }

    let shown = options
        .max_rows
        .map_or(sheet.row_count(), |max| max.min(sheet.row_count()));
    let limit = options.max_cell_width;

    let header: Vec<String> = std::iter::once(INDEX_HEADER.to_string())
        .chain(sheet.headers().iter().map(|h| truncate(&clean_cell_text(h), limit)))
        .collect();

    let body: Vec<Vec<String>> = sheet.rows()[..shown]
        .iter()
        .enumerate()
        .map(|(i, row)| {
            std::iter::once((i + 1).to_string())
                .chain(sheet.headers().iter().map(|h| {
                    // A header absent from this record renders as an empty cell
                    let text = row.get(h).map(|v| v.display_text()).unwrap_or_default();
                    truncate(&clean_cell_text(&text), limit)
                }))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let mut output = String::new();
    push_border(&mut output, &widths, '-');
    push_row(&mut output, &header, &widths);
    push_border(&mut output, &widths, '=');
    for row in &body {
        push_row(&mut output, row, &widths);
    }
    push_border(&mut output, &widths, '-');

    let hidden = sheet.row_count() - shown;
    if hidden > 0 {
        output.push_str(&format!(
            "... {} more row{}\n",
            hidden,
            if hidden == 1 { "" } else { "s" }
        ));
    }

    output.trim_end().to_string()
}

fn push_border(output: &mut String, widths: &[usize], fill: char) {
    output.push('+');
    for w in widths {
        output.extend(std::iter::repeat(fill).take(w + 2));
        output.push('+');
    }
    output.push('\n');
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    output.push('|');
    for (cell, w) in cells.iter().zip(widths) {
        output.push(' ');
        output.push_str(&pad(cell, *w));
        output.push_str(" |");
    }
    output.push('\n');
}

/// Pad text with spaces to a display width.
pub fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Shorten text to a display width, marking the cut with an ellipsis.
pub fn truncate(text: &str, max_width: Option<usize>) -> String {
    let Some(max) = max_width else {
        return text.to_string();
    };
    if text.width() <= max {
        return text.to_string();
    }

    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Flatten line breaks and tabs so a value stays on one table line.
fn clean_cell_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
