//! SQL value conversions shared by the SQLite stores

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Value as SqlValue;

use crate::store::FieldValue;

/// Convert a coerced field value into a SQL parameter.
///
/// Dates persist as Unix-millisecond integers, booleans as 0/1, NULLs as
/// true NULLs. Raw JSON arrays and objects are stored as JSON text.
pub(crate) fn to_sql_value(value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Date(Some(date)) => SqlValue::Integer(date.timestamp_millis()),
        FieldValue::Bool(Some(flag)) => SqlValue::Integer(i64::from(*flag)),
        FieldValue::Date(None) | FieldValue::Bool(None) => SqlValue::Null,
        FieldValue::Raw(json) => match json {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
            serde_json::Value::Number(number) => number.as_i64().map_or_else(
                || SqlValue::Real(number.as_f64().unwrap_or(0.0)),
                SqlValue::Integer,
            ),
            serde_json::Value::String(text) => SqlValue::Text(text.clone()),
            other => SqlValue::Text(other.to_string()),
        },
    }
}

/// Rehydrate a stored Unix-millisecond timestamp
pub(crate) fn datetime_from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_variants_become_sql_null() {
        assert_eq!(to_sql_value(&FieldValue::Date(None)), SqlValue::Null);
        assert_eq!(to_sql_value(&FieldValue::Bool(None)), SqlValue::Null);
        assert_eq!(
            to_sql_value(&FieldValue::Raw(serde_json::Value::Null)),
            SqlValue::Null
        );
    }

    #[test]
    fn test_date_round_trip_via_millis() {
        let now = Utc::now();
        let SqlValue::Integer(millis) = to_sql_value(&FieldValue::Date(Some(now))) else {
            panic!("expected integer");
        };
        assert_eq!(datetime_from_millis(millis).timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_raw_object_stored_as_json_text() {
        let value = to_sql_value(&FieldValue::Raw(serde_json::json!({"a": 1})));
        assert_eq!(value, SqlValue::Text("{\"a\":1}".to_string()));
    }
}
