//! Field accessor tables
//!
//! Each resource kind declares the fields it knows about, their semantic type
//! and whether they must be present. The wrapper enforces the table on every
//! typed read and on every write.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Uuid,
    /// RFC 3339 string or epoch milliseconds
    Timestamp,
    StringList,
    Any,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Uuid => "uuid",
            FieldKind::Timestamp => "timestamp",
            FieldKind::StringList => "list of strings",
            FieldKind::Any => "any value",
        }
    }

    /// Whether a non-null value can be stored under this kind
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => coerce_i64("", value).is_ok(),
            FieldKind::Boolean => coerce_bool("", value).is_ok(),
            FieldKind::Uuid => coerce_uuid("", value).is_ok(),
            FieldKind::Timestamp => coerce_timestamp("", value).is_ok(),
            FieldKind::StringList => value
                .as_array()
                .map(|arr| arr.iter().all(Value::is_string))
                .unwrap_or(false),
            FieldKind::Any => true,
        }
    }
}

/// One entry of a per-kind accessor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    /// Check a value about to be stored under this field
    pub fn check(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if self.required {
                return Err(Error::conversion(self.name, self.kind.name(), value));
            }
            return Ok(());
        }
        if self.kind.accepts(value) {
            Ok(())
        } else {
            Err(Error::conversion(self.name, self.kind.name(), value))
        }
    }
}

/// Find a field in an accessor table
pub fn lookup<'a>(table: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    table.iter().find(|spec| spec.name == name)
}

pub(crate) fn coerce_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::conversion(field, "string", value))
}

/// Integers come either as JSON numbers or as numeric strings
pub(crate) fn coerce_i64(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::conversion(field, "integer", value)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::conversion(field, "integer", value)),
        _ => Err(Error::conversion(field, "integer", value)),
    }
}

pub(crate) fn coerce_bool(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(Error::conversion(field, "boolean", value)),
    }
}

pub(crate) fn coerce_uuid(field: &str, value: &Value) -> Result<Uuid> {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| Error::conversion(field, "uuid", value))
}

pub(crate) fn coerce_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| Error::conversion(field, "timestamp", value)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(|| Error::conversion(field, "timestamp", value)),
        _ => Err(Error::conversion(field, "timestamp", value)),
    }
}
