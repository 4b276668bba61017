use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SqlType {
    Int,
    Float,
    Double,
    Timestamp,
}

/// Scalar cell value as returned by the engine under test.
///
/// Timestamps are microseconds since the Unix epoch; the harness never does
/// calendar arithmetic on them, only exact instant comparison.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i64),
    Float(f32),
    Double(f64),
    Timestamp(i64),
    Null,
}

impl Value {
    pub fn timestamp_from(instant: DateTime<Utc>) -> Value {
        Value::Timestamp(instant.timestamp_micros())
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(micros) => DateTime::from_timestamp_micros(*micros),
            _ => None,
        }
    }

    pub fn type_of(&self) -> Option<SqlType> {
        match self {
            Value::Int(_) => Some(SqlType::Int),
            Value::Float(_) => Some(SqlType::Float),
            Value::Double(_) => Some(SqlType::Double),
            Value::Timestamp(_) => Some(SqlType::Timestamp),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Timestamp(micros) => match DateTime::from_timestamp_micros(*micros) {
                Some(instant) => write!(f, "{}", instant.format("%Y-%m-%d %H:%M:%S%.6f")),
                None => write!(f, "{micros}"),
            },
            Value::Null => write!(f, "NULL"),
        }
    }
}
