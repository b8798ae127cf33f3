//! In-memory XLSX fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use unsheet::model::column_name;
use zip::write::SimpleFileOptions;

/// A cell written into a fixture sheet.
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    Text(&'static str),
    Num(f64),
    /// Serial date with a date number format
    Date(f64),
    Bool(bool),
    Blank,
}

/// Builds a minimal XLSX package with inline strings.
#[derive(Default)]
pub struct XlsxBuilder {
    sheets: Vec<(String, String)>,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet whose first slice is row 1; an empty slice leaves a blank row.
    pub fn sheet(mut self, name: &str, rows: &[&[Cell]]) -> Self {
        let mut data = String::new();
        for (r, row) in rows.iter().enumerate() {
            let cells: String = row
                .iter()
                .enumerate()
                .map(|(c, cell)| cell_xml(r, c, cell))
                .collect();
            if !cells.is_empty() {
                data.push_str(&format!(r#"<row r="{}">{}</row>"#, r + 1, cells));
            }
        }
        self.sheets.push((name.to_string(), data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), CONTENT_TYPES.to_string()),
            ("_rels/.rels".to_string(), ROOT_RELS.to_string()),
            ("xl/workbook.xml".to_string(), self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels()),
            ("xl/styles.xml".to_string(), STYLES.to_string()),
        ];
        for (i, (_, data)) in self.sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                format!(
                    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    data
                ),
            ));
        }

        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn workbook_xml(&self) -> String {
        let sheets: String = self
            .sheets
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    escape(name),
                    i + 1,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
            sheets
        )
    }

    fn workbook_rels(&self) -> String {
        let rels: String = (0..self.sheets.len())
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                    i + 1,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
    }
}

fn cell_xml(row: usize, col: usize, cell: &Cell) -> String {
    let r = format!("{}{}", column_name(col as u32), row + 1);
    match cell {
        Cell::Text(s) => format!(
            r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            r,
            escape(s)
        ),
        Cell::Num(n) => format!(r#"<c r="{}"><v>{}</v></c>"#, r, n),
        Cell::Date(n) => format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, r, n),
        Cell::Bool(b) => format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, r, u8::from(*b)),
        Cell::Blank => String::new(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;
