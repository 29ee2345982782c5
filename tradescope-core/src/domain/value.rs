//! Scalar cell values as delivered by the trade service.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A single cell in a trade record.
///
/// The service sends plain JSON scalars. Nested arrays/objects are kept
/// verbatim in [`Value::Json`] so an unexpected payload never fails a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl Value {
    /// Numeric reading of the cell. Text is trimmed and parsed; NaN counts as
    /// unparseable.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Value::Integer(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            Value::Null | Value::Bool(_) | Value::Json(_) => return None,
        };
        if n.is_nan() {
            None
        } else {
            Some(n)
        }
    }

    /// Temporal reading of the cell.
    ///
    /// Text is tried as RFC 3339, then as a naive date-time (taken as UTC),
    /// then as a bare date at midnight UTC. Integers are epoch seconds.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Integer(secs) => DateTime::from_timestamp(*secs, 0),
            Value::Text(s) => parse_timestamp(s.trim()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual representation used for filtering, text sorting and export.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Json(v) => v.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_representation_matches_display_strings() {
        assert_eq!(Value::Float(2.0).to_text(), "2");
        assert_eq!(Value::Float(1.5).to_text(), "1.5");
        assert_eq!(Value::Integer(42).to_text(), "42");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from("yes").to_text(), "yes");
        assert_eq!(Value::from(json!([1, 2])).to_text(), "[1,2]");
    }

    #[test]
    fn numeric_reading() {
        assert_eq!(Value::from(" 1.50 ").as_f64(), Some(1.5));
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::from("NaN").as_f64(), None);
        assert_eq!(Value::Float(f64::NAN).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn timestamp_reading_accepts_common_shapes() {
        let rfc = Value::from("2024-05-01T12:00:00Z").as_timestamp().unwrap();
        let offset = Value::from("2024-05-01T14:00:00+02:00").as_timestamp().unwrap();
        let naive = Value::from("2024-05-01 12:00:00").as_timestamp().unwrap();
        let fractional = Value::from("2024-05-01T12:00:00.250").as_timestamp().unwrap();
        assert_eq!(rfc, offset);
        assert_eq!(rfc, naive);
        assert!(fractional > rfc);
        assert!(Value::from("2024-05-01").as_timestamp().unwrap() < rfc);
        assert_eq!(Value::Integer(0).as_timestamp().unwrap().timestamp(), 0);
        assert!(Value::from("not a date").as_timestamp().is_none());
        assert!(Value::Float(1.0).as_timestamp().is_none());
    }

    #[test]
    fn json_numbers_keep_integer_precision() {
        assert_eq!(Value::from(json!(17)), Value::Integer(17));
        assert_eq!(Value::from(json!(0.25)), Value::Float(0.25));
        assert_eq!(Value::from(json!(null)), Value::Null);
    }
}
