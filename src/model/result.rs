//! Conversion result model.

use super::SheetTable;
use crate::error::FailureKind;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Message for a submission without file content.
pub const MISSING_INPUT_MESSAGE: &str = "No file provided";

/// Message for an upload whose type and extension are both unsupported.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Invalid file type. Please upload an Excel file (.xlsx, .xls) or CSV file.";

/// Fallback message when a failure carries no usable text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process Excel file";

/// How a conversion ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every sheet was read and normalized.
    Success {
        /// Sheets in workbook order
        sheets: Vec<SheetTable>,
    },
    /// Nothing was produced.
    Failure {
        /// Failure classification
        kind: FailureKind,
        /// Human-readable, never empty
        message: String,
    },
}

/// The response for one submitted file.
///
/// Serializes to `{success, sheets, totalSheets, fileName, error?}`; the
/// failure kind stays in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    file_name: String,
    outcome: Outcome,
}

impl ConversionResult {
    /// A successful conversion.
    pub fn success(file_name: impl Into<String>, sheets: Vec<SheetTable>) -> Self {
        Self {
            file_name: file_name.into(),
            outcome: Outcome::Success { sheets },
        }
    }

    /// A failed conversion; an empty message is replaced by the generic one.
    pub fn failure(
        file_name: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = GENERIC_FAILURE_MESSAGE.to_string();
        }
        Self {
            file_name: file_name.into(),
            outcome: Outcome::Failure { kind, message },
        }
    }

    /// Whether the conversion succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Original file name, or empty.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Outcome of the conversion.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Sheets in workbook order; empty on failure.
    pub fn sheets(&self) -> &[SheetTable] {
        match &self.outcome {
            Outcome::Success { sheets } => sheets,
            Outcome::Failure { .. } => &[],
        }
    }

    /// Number of sheets.
    pub fn total_sheets(&self) -> usize {
        self.sheets().len()
    }

    /// Data rows across all sheets.
    pub fn total_rows(&self) -> usize {
        self.sheets().iter().map(|s| s.row_count()).sum()
    }

    /// Find a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&SheetTable> {
        self.sheets().iter().find(|s| s.sheet_name() == name)
    }

    /// Error message; present only on failure.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { message, .. } => Some(message),
        }
    }

    /// Failure classification; present only on failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionResultRef<'a> {
    success: bool,
    sheets: &'a [SheetTable],
    total_sheets: usize,
    file_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversionResultWire {
    success: bool,
    #[serde(default)]
    sheets: Vec<SheetTable>,
    total_sheets: usize,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    error: Option<String>,
}

impl Serialize for ConversionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConversionResultRef {
            success: self.is_success(),
            sheets: self.sheets(),
            total_sheets: self.total_sheets(),
            file_name: &self.file_name,
            error: self.error(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConversionResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = ConversionResultWire::deserialize(deserializer)?;

        if wire.total_sheets != wire.sheets.len() {
            return Err(de::Error::custom(format!(
                "totalSheets is {} but {} sheets are present",
                wire.total_sheets,
                wire.sheets.len()
            )));
        }

        if wire.success {
            if wire.error.is_some() {
                return Err(de::Error::custom("a successful result cannot carry an error"));
            }
            return Ok(ConversionResult::success(wire.file_name, wire.sheets));
        }

        if !wire.sheets.is_empty() {
            return Err(de::Error::custom("a failed result cannot carry sheets"));
        }
        let message = wire
            .error
            .filter(|m| !m.is_empty())
            .ok_or_else(|| de::Error::custom("a failed result must carry an error"))?;
        let kind = match message.as_str() {
            MISSING_INPUT_MESSAGE => FailureKind::MissingInput,
            UNSUPPORTED_FORMAT_MESSAGE => FailureKind::UnsupportedFormat,
            _ => FailureKind::Unexpected,
        };

        Ok(ConversionResult::failure(wire.file_name, kind, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, RowRecord};

    fn sample_sheet() -> SheetTable {
        let mut row = RowRecord::new();
        row.insert("Name", CellValue::from("Ada"));
        SheetTable::new("People", vec![row])
    }

    #[test]
    fn test_success_wire_shape() {
        let result = ConversionResult::success("people.xlsx", vec![sample_sheet()]);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["totalSheets"], 1);
        assert_eq!(value["fileName"], "people.xlsx");
        assert!(value.get("error").is_none());
        assert_eq!(value["sheets"][0]["sheetName"], "People");
    }

    #[test]
    fn test_failure_wire_shape() {
        let result = ConversionResult::failure(
            "report.txt",
            FailureKind::UnsupportedFormat,
            UNSUPPORTED_FORMAT_MESSAGE,
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "sheets": [],
                "totalSheets": 0,
                "fileName": "report.txt",
                "error": UNSUPPORTED_FORMAT_MESSAGE
            })
        );
    }

    #[test]
    fn test_failure_without_message_uses_generic() {
        let result = ConversionResult::failure("", FailureKind::Unexpected, "  ");
        assert_eq!(result.error(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(result.total_sheets(), 0);
        assert!(!result.is_success());
    }

    #[test]
    fn test_roundtrip() {
        let result = ConversionResult::success("people.xlsx", vec![sample_sheet()]);
        let json = serde_json::to_string_pretty(&result).unwrap();
        let parsed: ConversionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);

        let failure =
            ConversionResult::failure("", FailureKind::MissingInput, MISSING_INPUT_MESSAGE);
        let json = serde_json::to_string(&failure).unwrap();
        let parsed: ConversionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, failure);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_results() {
        let mismatched = r#"{"success":true,"sheets":[],"totalSheets":2,"fileName":"a.csv"}"#;
        assert!(serde_json::from_str::<ConversionResult>(mismatched).is_err());

        let failure_without_error = r#"{"success":false,"sheets":[],"totalSheets":0,"fileName":""}"#;
        assert!(serde_json::from_str::<ConversionResult>(failure_without_error).is_err());
    }
}
