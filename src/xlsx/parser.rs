//! XLSX workbook reader.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{CellRange, CellRef, RawCell, RawSheet, Workbook};
use quick_xml::events::{BytesStart, Event};

use super::shared_strings::SharedStrings;
use super::styles::Styles;

/// Days between the 1900 and 1904 date system epochs.
const DATE_1904_OFFSET: f64 = 1462.0;

const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// Reader for XLSX (Excel) workbooks.
pub struct XlsxReader {
    container: OoxmlContainer,
    workbook_path: String,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    date1904: bool,
}

impl XlsxReader {
    /// Create a reader from the workbook's bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let workbook_path = Self::find_workbook_path(&container)?;

        let workbook_xml = container.read_xml(&workbook_path)?;
        let (sheets, date1904) = Self::parse_workbook(&workbook_xml)?;

        let shared_path = OoxmlContainer::resolve_path(&workbook_path, "sharedStrings.xml");
        let shared_strings = match container.read_optional_xml(&shared_path)? {
            Some(xml) => SharedStrings::parse(&xml)?,
            None => SharedStrings::default(),
        };

        let styles_path = OoxmlContainer::resolve_path(&workbook_path, "styles.xml");
        let styles = match container.read_optional_xml(&styles_path)? {
            Some(xml) => Styles::parse(&xml),
            None => Styles::default(),
        };

        log::debug!(
            "xlsx workbook at {}: {} sheet(s), {} shared string(s), 1904 dates: {}",
            workbook_path,
            sheets.len(),
            shared_strings.len(),
            date1904
        );

        Ok(Self {
            container,
            workbook_path,
            shared_strings,
            styles,
            sheets,
            date1904,
        })
    }

    /// Locate the main workbook part through the package relationships.
    fn find_workbook_path(container: &OoxmlContainer) -> Result<String> {
        let package_rels = container.read_relationships("")?;
        let target = package_rels
            .iter()
            .find(|rel| rel.rel_type.ends_with("/officeDocument") && !rel.external)
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target));
        Ok(target.unwrap_or_else(|| DEFAULT_WORKBOOK_PATH.to_string()))
    }

    /// Parse workbook.xml for sheet order and the date system.
    fn parse_workbook(xml: &str) -> Result<(Vec<SheetInfo>, bool)> {
        let mut sheets = Vec::new();
        let mut date1904 = false;
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"workbookPr" => {
                            date1904 = attr_value(e, b"date1904")
                                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
                        }
                        b"sheet" => {
                            let mut name = String::new();
                            let mut rel_id = String::new();
                            for attr in e.attributes().flatten() {
                                let value = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_else(|_| {
                                        String::from_utf8_lossy(&attr.value).into_owned()
                                    });
                                match attr.key.as_ref() {
                                    b"name" => name = value,
                                    // r:id, whatever the prefix
                                    _ if attr.key.local_name().as_ref() == b"id" => rel_id = value,
                                    _ => {}
                                }
                            }
                            if !name.is_empty() {
                                sheets.push(SheetInfo { name, rel_id });
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date1904))
    }

    /// Read every worksheet, in workbook order.
    pub fn read(&self) -> Result<Workbook> {
        let rels = self.container.read_relationships(&self.workbook_path)?;
        let mut workbook = Workbook::new();

        for info in &self.sheets {
            let rel = rels.get(&info.rel_id).ok_or_else(|| {
                Error::MissingComponent(format!(
                    "relationship {} for sheet '{}'",
                    info.rel_id, info.name
                ))
            })?;
            let path = OoxmlContainer::resolve_path(&self.workbook_path, &rel.target);
            let xml = self.container.read_xml(&path)?;
            workbook.add_sheet(self.parse_sheet(&info.name, &xml)?);
        }

        Ok(workbook)
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether the workbook uses the 1904 date system.
    pub fn is_1904(&self) -> bool {
        self.date1904
    }

    /// Parse a worksheet part into a raw sheet.
    fn parse_sheet(&self, name: &str, xml: &str) -> Result<RawSheet> {
        let mut sheet = RawSheet::new(name);
        let mut reader = quick_xml::Reader::from_str(xml);
        // Inline string text keeps its surrounding spaces
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut next_row: u32 = 0;
        let mut row: u32 = 0;
        let mut next_col: u32 = 0;
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"dimension" => sheet.declared_range = declared_range(e),
                    b"row" => {
                        row = row_index(e, next_row)?;
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let pending = PendingCell::start(e, row, next_col)?;
                        next_col = pending.at.col + 1;
                        cell = Some(pending);
                    }
                    b"rPh" => phonetic_depth += 1,
                    b"v" if cell.is_some() => in_value = true,
                    b"t" if cell.is_some() && phonetic_depth == 0 => in_value = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"dimension" => sheet.declared_range = declared_range(e),
                    b"row" => {
                        row = row_index(e, next_row)?;
                        next_row = row + 1;
                    }
                    b"c" => {
                        // A styled cell without a value
                        let pending = PendingCell::start(e, row, next_col)?;
                        next_col = pending.at.col + 1;
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_value => {
                    if let Some(pending) = cell.as_mut() {
                        let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        pending.value.push_str(&text);
                    }
                }
                Ok(Event::CData(ref e)) if in_value => {
                    if let Some(pending) = cell.as_mut() {
                        pending.value.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            let at = pending.at;
                            sheet.set(at, self.resolve_cell(pending)?);
                        }
                        in_value = false;
                    }
                    b"v" | b"t" => in_value = false,
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Resolve a cell value based on its type and style.
    fn resolve_cell(&self, cell: PendingCell) -> Result<RawCell> {
        let PendingCell {
            at,
            cell_type,
            style,
            value,
        } = cell;

        let resolved = match cell_type.as_deref() {
            Some("s") => {
                let text = value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.shared_strings.get(idx))
                    .ok_or_else(|| {
                        Error::InvalidData(format!(
                            "cell {}: shared string '{}' does not exist",
                            at, value
                        ))
                    })?;
                RawCell::Text(text.to_string())
            }
            Some("b") => RawCell::Bool(matches!(value.trim(), "1" | "true" | "TRUE")),
            Some("e") => RawCell::Error(value),
            Some("str") | Some("inlineStr") | Some("d") => RawCell::Text(value),
            _ => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(RawCell::Empty);
                }
                let number: f64 = trimmed.parse().map_err(|_| {
                    Error::InvalidData(format!("cell {}: '{}' is not a number", at, trimmed))
                })?;
                if self.styles.is_date_style(style) {
                    let serial = if self.date1904 {
                        number + DATE_1904_OFFSET
                    } else {
                        number
                    };
                    RawCell::Date(serial)
                } else {
                    RawCell::Number(number)
                }
            }
        };

        Ok(resolved)
    }
}

impl std::fmt::Debug for XlsxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxReader")
            .field("workbook_path", &self.workbook_path)
            .field("sheets", &self.sheet_names())
            .field("date1904", &self.date1904)
            .finish()
    }
}

/// A `<c>` element whose value is still being read.
#[derive(Debug)]
struct PendingCell {
    at: CellRef,
    cell_type: Option<String>,
    style: usize,
    value: String,
}

impl PendingCell {
    fn start(e: &BytesStart<'_>, row: u32, next_col: u32) -> Result<Self> {
        let mut at = CellRef::new(row, next_col);
        let mut cell_type = None;
        let mut style = 0;

        for attr in e.attributes().flatten() {
            let value = String::from_utf8_lossy(&attr.value);
            match attr.key.as_ref() {
                b"r" => at = CellRef::parse(&value)?,
                b"t" => cell_type = Some(value.into_owned()),
                b"s" => style = value.parse().unwrap_or(0),
                _ => {}
            }
        }

        Ok(Self {
            at,
            cell_type,
            style,
            value: String::new(),
        })
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn declared_range(e: &BytesStart<'_>) -> Option<CellRange> {
    attr_value(e, b"ref").and_then(|r| CellRange::parse(&r).ok())
}

/// Zero-based index of a `<row>`, from its 1-based `r` or the running count.
fn row_index(e: &BytesStart<'_>, next_row: u32) -> Result<u32> {
    match attr_value(e, b"r") {
        Some(r) => r
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .map(|n| n - 1)
            .ok_or_else(|| Error::InvalidData(format!("invalid row number '{}'", r))),
        None => Ok(next_row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;

    const SHARED: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><t>Name</t></si><si><t>Joined</t></si><si><t>Ada</t></si>
</sst>"#;

    fn workbook_xml(date1904: bool) -> String {
        format!(
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="{}"/>
  <sheets>
    <sheet name="People" sheetId="1" r:id="rId2"/>
    <sheet name="Notes &amp; Misc" sheetId="2" r:id="rId1"/>
  </sheets>
</workbook>"#,
            if date1904 { 1 } else { 0 }
        )
    }

    const PEOPLE: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1:C3"/>
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="inlineStr"><is><t xml:space="preserve"> Active </t></is></c></row>
    <row r="3"><c r="A3" t="s"><v>2</v></c><c r="B3" s="1"><v>44197</v></c><c r="C3" t="b"><v>1</v></c><c r="D3" s="1"/></row>
  </sheetData>
</worksheet>"#;

    const NOTES: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row><c><v>1.5</v></c><c t="e"><v>#DIV/0!</v></c><c t="str"><f>A1&amp;"x"</f><v>1.5x</v></c></row>
  </sheetData>
</worksheet>"#;

    fn build_xlsx(date1904: bool) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", workbook_xml(date1904)),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/styles.xml", STYLES.to_string()),
            ("xl/sharedStrings.xml", SHARED.to_string()),
            ("xl/worksheets/sheet1.xml", NOTES.to_string()),
            ("xl/worksheets/sheet2.xml", PEOPLE.to_string()),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_sheet_order_and_names() {
        let reader = XlsxReader::from_bytes(build_xlsx(false)).unwrap();
        assert_eq!(reader.sheet_count(), 2);
        assert_eq!(reader.sheet_names(), vec!["People", "Notes & Misc"]);
        assert!(!reader.is_1904());
    }

    #[test]
    fn test_read_cells() {
        let workbook = XlsxReader::from_bytes(build_xlsx(false))
            .unwrap()
            .read()
            .unwrap();
        let people = &workbook.sheets[0];

        assert_eq!(people.declared_range.unwrap().to_string(), "A1:C3");
        assert_eq!(
            people.get(CellRef::new(0, 0)),
            Some(&RawCell::Text("Name".into()))
        );
        assert_eq!(
            people.get(CellRef::new(0, 2)),
            Some(&RawCell::Text(" Active ".into()))
        );
        assert!(people.row(1).is_none());
        assert_eq!(people.get(CellRef::new(2, 1)), Some(&RawCell::Date(44197.0)));
        assert_eq!(people.get(CellRef::new(2, 2)), Some(&RawCell::Bool(true)));
        assert_eq!(people.get(CellRef::new(2, 3)), None);
    }

    #[test]
    fn test_cells_without_references() {
        let workbook = XlsxReader::from_bytes(build_xlsx(false))
            .unwrap()
            .read()
            .unwrap();
        let notes = &workbook.sheets[1];

        assert_eq!(notes.name, "Notes & Misc");
        assert_eq!(notes.get(CellRef::new(0, 0)), Some(&RawCell::Number(1.5)));
        assert_eq!(
            notes.get(CellRef::new(0, 1)),
            Some(&RawCell::Error("#DIV/0!".into()))
        );
        assert_eq!(
            notes.get(CellRef::new(0, 2)),
            Some(&RawCell::Text("1.5x".into()))
        );
    }

    #[test]
    fn test_1904_dates_shift_to_1900_system() {
        let reader = XlsxReader::from_bytes(build_xlsx(true)).unwrap();
        assert!(reader.is_1904());

        let workbook = reader.read().unwrap();
        assert_eq!(
            workbook.sheets[0].get(CellRef::new(2, 1)),
            Some(&RawCell::Date(44197.0 + DATE_1904_OFFSET))
        );
    }

    #[test]
    fn test_missing_workbook_part() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = XlsxReader::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, Error::MissingComponent(_)));
    }
}
