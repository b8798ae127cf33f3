//! Normalized cell values.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Largest integer an f64 holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serial of 9999-12-31, the last day a workbook can hold.
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A cell value after normalization.
///
/// Serialized untagged: JSON string, number, boolean, or null.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text (dates are coerced to ISO-8601 text)
    Text(String),
    /// Finite number
    Number(f64),
    /// Boolean
    Bool(bool),
    /// No value
    Null,
}

impl CellValue {
    /// The empty-string value used for missing cells.
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Text shown for this value in a table cell.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// Whether this value renders as an empty cell.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::Null => true,
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Format a number in its shortest round-trip form, without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n == n.trunc() && n.abs() < MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if *n == n.trunc() && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Null => serializer.serialize_unit(),
        }
    }
}

struct CellValueVisitor;

impl<'de> Visitor<'de> for CellValueVisitor {
    type Value = CellValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean, or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
        Ok(CellValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<CellValue, E> {
        Ok(CellValue::Text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
        Ok(CellValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Null)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellValueVisitor)
    }
}

/// Convert a 1900-system serial date to ISO-8601 text.
///
/// Whole serials give `YYYY-MM-DD`, serials with a time part give
/// `YYYY-MM-DDTHH:MM:SS`, and serials below 1 are pure times (`HH:MM:SS`).
/// Serial 60 is the phantom 1900-02-29 that Excel keeps for Lotus 1-2-3
/// compatibility; later serials are shifted back by one day. Serials past
/// 9999-12-31 have no date and give `None`.
pub fn serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || !(0.0..MAX_DATE_SERIAL + 1.0).contains(&serial) {
        return None;
    }

    let mut days = serial.trunc() as i64;
    let mut seconds = ((serial - serial.trunc()) * SECONDS_PER_DAY).round() as u32;
    if seconds >= 86_400 {
        days += 1;
        seconds -= 86_400;
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;

    if days == 0 {
        return Some(time.format("%H:%M:%S").to_string());
    }

    if days == 60 {
        // Not a real day, so chrono cannot represent it
        return Some(with_time("1900-02-29".to_string(), time));
    }

    let offset = if days > 60 { days - 1 } else { days };
    let date = NaiveDate::from_ymd_opt(1899, 12, 31)?
        .checked_add_signed(Duration::days(offset))?;

    Some(with_time(date.format("%Y-%m-%d").to_string(), time))
}

fn with_time(date: String, time: NaiveTime) -> String {
    if time == NaiveTime::MIN {
        date
    } else {
        format!("{}T{}", date, time.format("%H:%M:%S"))
    }
}

/// Convert a calendar date and time to a 1900-system serial.
///
/// Days before 1900-03-01 count from 1899-12-31 so that they land on the
/// serials Excel shows for them.
pub fn datetime_to_serial(datetime: NaiveDateTime) -> f64 {
    let date = datetime.date();
    let leap_fix = NaiveDate::from_ymd_opt(1900, 3, 1).is_some_and(|d| date >= d);
    let base = if leap_fix {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    };
    let days = base.map_or(0, |b| date.signed_duration_since(b).num_days());

    let time = datetime.time();
    let seconds = f64::from(time.num_seconds_from_midnight())
        + f64::from(time.nanosecond()) / 1_000_000_000.0;
    days as f64 + seconds / SECONDS_PER_DAY
}
