//! Field value coercion
//!
//! Converts the untyped values carried by patch changes into the entity's
//! strongly-typed representation, driven by the entity's static field-kind
//! table. Fields outside the known date/bool sets pass through unchanged.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::models::FieldKind;
use crate::store::FieldValue;

/// A per-field coercion failure. Recoverable: the engine reports the
/// owning patch as failed and moves on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("invalid date format for field: {0}")]
    InvalidDate(String),
    #[error("invalid boolean format for field: {0}")]
    InvalidBool(String),
}

/// Date string formats accepted from clients, tried in order after
/// RFC 3339 proper
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Coerce a raw patch value into the typed shape for its field kind.
///
/// Date fields accept an RFC 3339-family string, a millisecond Unix
/// integer, or a float Unix-seconds value. Boolean fields accept a native
/// bool, the strings `"true"`/`"false"` (case-insensitive) or `"1"`/`"0"`,
/// or any numeric value (nonzero is true). A JSON null stays null in both
/// cases.
pub fn coerce(
    kind: FieldKind,
    storage_key: &str,
    value: &serde_json::Value,
) -> Result<FieldValue, CoerceError> {
    match kind {
        FieldKind::Date | FieldKind::NullableDate => coerce_date(storage_key, value),
        FieldKind::Bool | FieldKind::NullableBool => coerce_bool(storage_key, value),
        FieldKind::Raw => Ok(FieldValue::Raw(value.clone())),
    }
}

fn coerce_date(storage_key: &str, value: &serde_json::Value) -> Result<FieldValue, CoerceError> {
    match value {
        serde_json::Value::Null => Ok(FieldValue::Date(None)),
        serde_json::Value::String(text) => parse_date_string(text)
            .map(|date| FieldValue::Date(Some(date)))
            .ok_or_else(|| CoerceError::InvalidDate(storage_key.to_string())),
        serde_json::Value::Number(number) => {
            let date = if let Some(millis) = number.as_i64() {
                Utc.timestamp_millis_opt(millis).single()
            } else {
                // Float timestamps arrive as fractional Unix seconds
                number
                    .as_f64()
                    .and_then(|seconds| Utc.timestamp_opt(seconds.trunc() as i64, 0).single())
            };
            date.map(|date| FieldValue::Date(Some(date)))
                .ok_or_else(|| CoerceError::InvalidDate(storage_key.to_string()))
        }
        _ => Err(CoerceError::InvalidDate(storage_key.to_string())),
    }
}

fn parse_date_string(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn coerce_bool(storage_key: &str, value: &serde_json::Value) -> Result<FieldValue, CoerceError> {
    match value {
        serde_json::Value::Null => Ok(FieldValue::Bool(None)),
        serde_json::Value::Bool(flag) => Ok(FieldValue::Bool(Some(*flag))),
        serde_json::Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(FieldValue::Bool(Some(true))),
            "false" | "0" => Ok(FieldValue::Bool(Some(false))),
            _ => Err(CoerceError::InvalidBool(storage_key.to_string())),
        },
        serde_json::Value::Number(number) => {
            let nonzero = number
                .as_f64()
                .is_some_and(|numeric| numeric != 0.0);
            Ok(FieldValue::Bool(Some(nonzero)))
        }
        _ => Err(CoerceError::InvalidBool(storage_key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date_of(value: FieldValue) -> DateTime<Utc> {
        match value {
            FieldValue::Date(Some(date)) => date,
            other => panic!("expected a date, got {other:?}"),
        }
    }

    #[test]
    fn test_rfc3339_string() {
        let value = coerce(FieldKind::Date, "start_date", &serde_json::json!("2026-08-30T12:00:00Z"))
            .unwrap();
        assert_eq!(date_of(value).timestamp(), 1_788_091_200);
    }

    #[test]
    fn test_rfc3339_with_offset_and_nanos() {
        let a = coerce(
            FieldKind::Date,
            "start_date",
            &serde_json::json!("2026-08-30T14:00:00.500+02:00"),
        )
        .unwrap();
        assert_eq!(date_of(a).timestamp_millis(), 1_788_091_200_500);
    }

    #[test]
    fn test_naive_space_format() {
        let value = coerce(
            FieldKind::Date,
            "end_date",
            &serde_json::json!("2026-08-30 12:00:00"),
        )
        .unwrap();
        assert_eq!(date_of(value).timestamp(), 1_788_091_200);
    }

    #[test]
    fn test_millis_integer_matches_string_form() {
        let from_string = coerce(
            FieldKind::Date,
            "start_date",
            &serde_json::json!("2026-08-30T12:00:00Z"),
        )
        .unwrap();
        let from_millis = coerce(
            FieldKind::Date,
            "start_date",
            &serde_json::json!(1_788_091_200_000_i64),
        )
        .unwrap();
        assert_eq!(from_string, from_millis);
    }

    #[test]
    fn test_float_seconds() {
        let value = coerce(FieldKind::Date, "start_date", &serde_json::json!(1_788_091_200.75))
            .unwrap();
        assert_eq!(date_of(value).timestamp(), 1_788_091_200);
    }

    #[test]
    fn test_null_date_stays_null() {
        let value = coerce(FieldKind::NullableDate, "end_date", &serde_json::Value::Null).unwrap();
        assert_eq!(value, FieldValue::Date(None));
    }

    #[test]
    fn test_bad_date_reports_field() {
        let error =
            coerce(FieldKind::Date, "start_date", &serde_json::json!("tomorrow")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid date format for field: start_date"
        );
    }

    #[test]
    fn test_bool_native_and_strings() {
        for raw in [
            serde_json::json!(true),
            serde_json::json!("true"),
            serde_json::json!("TRUE"),
            serde_json::json!("1"),
        ] {
            let value = coerce(FieldKind::NullableBool, "completed", &raw).unwrap();
            assert_eq!(value, FieldValue::Bool(Some(true)));
        }
        for raw in [
            serde_json::json!(false),
            serde_json::json!("False"),
            serde_json::json!("0"),
        ] {
            let value = coerce(FieldKind::NullableBool, "completed", &raw).unwrap();
            assert_eq!(value, FieldValue::Bool(Some(false)));
        }
    }

    #[test]
    fn test_bool_numeric() {
        let truthy = coerce(FieldKind::Bool, "deleted", &serde_json::json!(2)).unwrap();
        assert_eq!(truthy, FieldValue::Bool(Some(true)));
        let falsy = coerce(FieldKind::Bool, "deleted", &serde_json::json!(0)).unwrap();
        assert_eq!(falsy, FieldValue::Bool(Some(false)));
    }

    #[test]
    fn test_bad_bool_reports_field() {
        let error =
            coerce(FieldKind::NullableBool, "completed", &serde_json::json!("yes")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid boolean format for field: completed"
        );
    }

    #[test]
    fn test_raw_passes_through() {
        let raw = serde_json::json!({"nested": [1, 2, 3]});
        let value = coerce(FieldKind::Raw, "metadata", &raw).unwrap();
        assert_eq!(value, FieldValue::Raw(raw));
    }
}
