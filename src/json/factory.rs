//! Element factories
//!
//! Convert one raw JSON entry into a typed in-memory element. Used by the
//! wrapper for list fields and nested object fields.

use super::fields::coerce_str;
use super::wrapper::JsonWrapper;
use crate::error::{Error, Result};
use serde_json::Value;

pub trait ElementFactory {
    type Output;

    /// Build an element from `raw`, found under `field`
    fn new_object(&self, field: &str, raw: &Value) -> Result<Self::Output>;
}

impl<F, T> ElementFactory for F
where
    F: Fn(&str, &Value) -> Result<T>,
{
    type Output = T;

    fn new_object(&self, field: &str, raw: &Value) -> Result<T> {
        self(field, raw)
    }
}

/// Plain strings; numbers and booleans are rendered to text
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFactory;

impl ElementFactory for StringFactory {
    type Output = String;

    fn new_object(&self, field: &str, raw: &Value) -> Result<String> {
        match raw {
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => coerce_str(field, other).map(str::to_string),
        }
    }
}

/// Nested objects as untyped wrappers
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapperFactory;

impl ElementFactory for WrapperFactory {
    type Output = JsonWrapper;

    fn new_object(&self, field: &str, raw: &Value) -> Result<JsonWrapper> {
        if raw.is_object() {
            Ok(JsonWrapper::from_value(raw.clone()))
        } else {
            Err(Error::conversion(field, "object", raw))
        }
    }
}
