//! Normalized sheet tables.

use super::CellValue;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One data row: header -> value, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, keeping its original position when it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Append a field whose header is not in the record yet.
    pub(crate) fn push(&mut self, key: String, value: CellValue) {
        debug_assert!(self.get(&key).is_none());
        self.fields.push((key, value));
    }

    /// Get a field by header.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Headers in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over (header, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut record = RowRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RowRecordVisitor;

impl<'de> Visitor<'de> for RowRecordVisitor {
    type Value = RowRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of header to cell value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RowRecord, A::Error> {
        let mut record = RowRecord::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, CellValue>()? {
            record.insert(key, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for RowRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowRecordVisitor)
    }
}

/// One normalized worksheet.
///
/// `headers` are the keys of the first row and the counts are always derived
/// from `rows` and `headers`, so they cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    sheet_name: String,
    rows: Vec<RowRecord>,
    headers: Vec<String>,
}

impl SheetTable {
    /// Build a table; headers are taken from the first row.
    pub fn new(sheet_name: impl Into<String>, rows: Vec<RowRecord>) -> Self {
        let headers = rows
            .first()
            .map(|r| r.keys().map(String::from).collect())
            .unwrap_or_default();
        Self {
            sheet_name: sheet_name.into(),
            rows,
            headers,
        }
    }

    /// Sheet name.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Data rows in source order.
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// Column headers in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Check if the sheet has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a cell by zero-based row index and header.
    pub fn cell(&self, row: usize, header: &str) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(header))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetTableRef<'a> {
    sheet_name: &'a str,
    rows: &'a [RowRecord],
    headers: &'a [String],
    row_count: usize,
    column_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetTableWire {
    sheet_name: String,
    rows: Vec<RowRecord>,
    headers: Vec<String>,
    row_count: usize,
    column_count: usize,
}

impl Serialize for SheetTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SheetTableRef {
            sheet_name: &self.sheet_name,
            rows: &self.rows,
            headers: &self.headers,
            row_count: self.row_count(),
            column_count: self.column_count(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SheetTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = SheetTableWire::deserialize(deserializer)?;
        let table = SheetTable::new(wire.sheet_name, wire.rows);

        if table.headers != wire.headers {
            return Err(de::Error::custom(format!(
                "sheet '{}': headers do not match the keys of the first row",
                table.sheet_name
            )));
        }
        if table.row_count() != wire.row_count || table.column_count() != wire.column_count {
            return Err(de::Error::custom(format!(
                "sheet '{}': rowCount/columnCount disagree with rows/headers",
                table.sheet_name
            )));
        }

        Ok(table)
    }
}
