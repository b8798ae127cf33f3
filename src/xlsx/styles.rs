//! XLSX styles parsing for number formats.

use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Styles information parsed from xl/styles.xml.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    /// Cell formats: style index -> numFmtId
    cell_xfs: Vec<u32>,
}

impl Styles {
    /// Parse styles from xl/styles.xml content.
    ///
    /// Styles only decide whether numbers are dates, so a malformed part
    /// keeps whatever was read before the error.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"xf" if in_cell_xfs => styles.cell_xfs.push(num_fmt_id(e).unwrap_or(0)),
                    b"numFmt" if in_num_fmts => styles.add_num_fmt(e),
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"xf" if in_cell_xfs => styles.cell_xfs.push(num_fmt_id(e).unwrap_or(0)),
                    b"numFmt" if in_num_fmts => styles.add_num_fmt(e),
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("styles.xml is malformed, date detection may be incomplete: {}", e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        styles
    }

    fn add_num_fmt(&mut self, e: &BytesStart<'_>) {
        let mut id = None;
        let mut format_code = String::new();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"numFmtId" => id = String::from_utf8_lossy(&attr.value).parse().ok(),
                b"formatCode" => {
                    format_code = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                }
                _ => {}
            }
        }
        if let Some(id) = id {
            self.num_fmts.insert(id, format_code);
        }
    }

    /// Get the numFmtId for a cell style index.
    pub fn num_fmt_id(&self, style_index: usize) -> Option<u32> {
        self.cell_xfs.get(style_index).copied()
    }

    /// Check whether a cell style index formats numbers as dates or times.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        self.num_fmt_id(style_index)
            .is_some_and(|id| self.is_date_format(id))
    }

    /// Check if a numFmtId represents a date or time format.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        // Built-in: 14-22 dates, 45-47 times
        if (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id) {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_date_format_code(code))
    }
}

fn num_fmt_id(e: &BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"numFmtId")
        .and_then(|a| String::from_utf8_lossy(&a.value).parse().ok())
}

/// Check if a format code has date or time tokens outside literals.
///
/// Bracketed sections (`[Red]`, `[$-409]`), quoted text and escaped
/// characters are literals; `[h]` style elapsed-time markers still count.
fn is_date_format_code(format_code: &str) -> bool {
    // Only the positive section decides
    let section = format_code.split(';').next().unwrap_or_default();
    let mut chars = section.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                let inner = inner.to_ascii_lowercase();
                if !inner.is_empty() && inner.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            _ if matches!(c.to_ascii_lowercase(), 'd' | 'y' | 'm' | 'h' | 's') => return true,
            _ => {}
        }
    }

    false
}
