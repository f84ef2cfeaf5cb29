//! Lenient timestamp parsing for API payloads
//!
//! The backends are not consistent about time zones: some timestamps are
//! RFC 3339, others are naive local date-times. Naive values are read as UTC.
//! Some serialize timestamps as epoch numbers or as
//! `[year, month, day, hour, minute, second, nanos]` arrays.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Epoch values at or above this are milliseconds, below it seconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Parse a timestamp, returning `None` when no known format matches
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Serde helper for optional timestamp fields
///
/// Unparseable values deserialize to `None` instead of failing the whole
/// payload.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(from_value))
}

/// Interpret a JSON timestamp of any shape the backends produce
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse(text),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .and_then(from_epoch),
        Value::Array(parts) => from_parts(parts),
        _ => None,
    }
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.abs() >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn from_parts(parts: &[Value]) -> Option<DateTime<Utc>> {
    let numbers: Vec<i64> = parts.iter().map(Value::as_i64).collect::<Option<_>>()?;
    if numbers.len() < 3 {
        return None;
    }
    let field = |index: usize| u32::try_from(numbers.get(index).copied().unwrap_or(0)).ok();

    let date = NaiveDate::from_ymd_opt(i32::try_from(numbers[0]).ok()?, field(1)?, field(2)?)?;
    let time = date.and_hms_nano_opt(field(3)?, field(4)?, field(5)?, field(6)?)?;
    Some(time.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        assert_eq!(parse("2024-03-01T09:30:00Z"), Some(expected));
        assert_eq!(parse("2024-03-01T10:30:00+01:00"), Some(expected));
        assert_eq!(parse("2024-03-01T09:30:00.000"), Some(expected));
        assert_eq!(parse("2024-03-01 09:30:00"), Some(expected));
        assert_eq!(
            parse("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse("yesterday"), None);
    }

    #[test]
    fn test_numeric_and_array_values() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        assert_eq!(from_value(&json!(1709285400000_i64)), Some(expected));
        assert_eq!(from_value(&json!(1709285400)), Some(expected));
        assert_eq!(from_value(&json!([2024, 3, 1, 9, 30, 0])), Some(expected));
        assert_eq!(from_value(&json!([2024, 3, 1, 9, 30])), Some(expected));
        assert_eq!(from_value(&json!([2024, 13, 1])), None);
        assert_eq!(from_value(&json!({ "epoch": 1 })), None);
        assert_eq!(from_value(&json!(true)), None);
    }
}
