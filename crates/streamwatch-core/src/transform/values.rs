use crate::config::schema::FieldType;
use crate::model::Value;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Convert a cell to the declared field type.
///
/// Returns `None` when the value has no representation in that type.
/// Null always stays null.
pub fn coerce(value: &Value, field_type: FieldType) -> Option<Value> {
    match (field_type, value) {
        (_, Value::Null) => Some(Value::Null),
        (FieldType::Numeric, Value::Number(_)) => Some(value.clone()),
        (FieldType::Numeric, Value::Text(s)) => parse_decimal(s).map(Value::Number),
        (FieldType::Numeric, Value::Date(_)) => None,
        (FieldType::Text | FieldType::Code, Value::Text(_)) => Some(value.clone()),
        (FieldType::Text | FieldType::Code, other) => Some(Value::Text(other.to_string())),
        (FieldType::Date, Value::Date(_)) => Some(value.clone()),
        (FieldType::Date, Value::Text(s)) => parse_datetime(s).map(Value::Date),
        (FieldType::Date, Value::Number(_)) => None,
    }
}

/// Parse a plain decimal number, ignoring surrounding whitespace.
///
/// Handles formats like:
/// - "68" -> 68
/// - " 0.050 " -> 0.050
/// - "-9999" -> -9999
/// - "1e-3" -> 0.001
///
/// Qualified values such as "< 0.5" are not numbers.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a date or date-time written in one of the workbook layouts.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
