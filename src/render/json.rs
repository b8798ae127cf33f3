//! JSON renderer implementation.

use crate::error::Result;
use crate::model::ConversionResult;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a conversion result to JSON.
pub fn to_json(result: &ConversionResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(result)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(result)?,
    };
    Ok(json)
}

/// Convert a conversion result to pretty-printed JSON.
pub fn to_json_default(result: &ConversionResult) -> Result<String> {
    to_json(result, JsonFormat::Pretty)
}

/// Parse JSON produced by [`to_json`] back into a conversion result.
pub fn from_json(json: &str) -> Result<ConversionResult> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::model::{CellValue, RowRecord, SheetTable};

    fn sample() -> ConversionResult {
        let mut row = RowRecord::new();
        row.insert("Name", CellValue::from("Ada"));
        row.insert("Age", CellValue::Number(36.0));
        ConversionResult::success("people.xlsx", vec![SheetTable::new("People", vec![row])])
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.starts_with("{\n  \"success\": true,"));
        assert!(json.contains("\n      \"sheetName\": \"People\","));
        assert!(json.contains("\"Age\": 36"));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"rows\":[{\"Name\":\"Ada\",\"Age\":36}]"));
    }

    #[test]
    fn test_to_json_default() {
        let failure = ConversionResult::failure("", FailureKind::ParseFailure, "bad zip");
        let json = to_json_default(&failure).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"error\": \"bad zip\""));
    }

    #[test]
    fn test_result_roundtrip() {
        let result = sample();
        let json = to_json(&result, JsonFormat::Pretty).unwrap();
        assert_eq!(from_json(&json).unwrap(), result);

        assert!(from_json("{\"success\":true}").is_err());
    }
}
