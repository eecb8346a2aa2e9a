//! JSON value cell
//!
//! A [`JsonWrapper`] owns one JSON value and tracks which top-level fields
//! were changed since the last load, so a resource can send a partial update.

use super::factory::ElementFactory;
use super::fields::{
    coerce_bool, coerce_i64, coerce_str, coerce_timestamp, coerce_uuid, lookup, FieldSpec,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct JsonWrapper {
    value: Value,
    dirty: BTreeSet<String>,
    fields: &'static [FieldSpec],
}

impl Default for JsonWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWrapper {
    /// Empty object, for a new unsaved instance
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Wrap a value loaded from the server (nothing is dirty)
    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            dirty: BTreeSet::new(),
            fields: &[],
        }
    }

    /// Attach the accessor table of a resource kind
    pub fn with_fields(mut self, fields: &'static [FieldSpec]) -> Self {
        self.fields = fields;
        self
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replace the whole value, as when reloading from the server
    pub fn replace(&mut self, value: Value) {
        self.value = value;
        self.dirty.clear();
    }

    /// Overlay the fields the server echoed after an update
    pub fn merge(&mut self, updates: Map<String, Value>) {
        match &mut self.value {
            Value::Object(map) => map.extend(updates),
            other => *other = Value::Object(updates),
        }
        self.dirty.clear();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Raw value of a field; `None` when missing or null
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.value.get(name).filter(|v| !v.is_null())
    }

    /// Raw value, failing only when a required field is absent
    fn present(&self, name: &str) -> Result<Option<&Value>> {
        match self.get_field(name) {
            Some(value) => Ok(Some(value)),
            None => match lookup(self.fields, name) {
                Some(spec) if spec.required => {
                    Err(Error::conversion(name, spec.kind.name(), &Value::Null))
                }
                _ => Ok(None),
            },
        }
    }

    pub fn get_str(&self, name: &str) -> Result<Option<String>> {
        self.present(name)?
            .map(|v| coerce_str(name, v).map(str::to_string))
            .transpose()
    }

    pub fn get_i64(&self, name: &str) -> Result<Option<i64>> {
        self.present(name)?.map(|v| coerce_i64(name, v)).transpose()
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.present(name)?.map(|v| coerce_bool(name, v)).transpose()
    }

    pub fn get_uuid(&self, name: &str) -> Result<Option<Uuid>> {
        self.present(name)?.map(|v| coerce_uuid(name, v)).transpose()
    }

    pub fn get_timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        self.present(name)?
            .map(|v| coerce_timestamp(name, v))
            .transpose()
    }

    /// Build a fresh list from a list field.
    ///
    /// A missing field reads as an empty list and a single non-array value
    /// reads as a one-element list.
    pub fn get_list_field<F: ElementFactory>(
        &self,
        name: &str,
        factory: &F,
    ) -> Result<Vec<F::Output>> {
        match self.present(name)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(idx, raw)| factory.new_object(&format!("{}[{}]", name, idx), raw))
                .collect(),
            Some(single) => Ok(vec![factory.new_object(name, single)?]),
        }
    }

    /// Build a nested typed object from an object field
    pub fn get_object_field<F: ElementFactory>(
        &self,
        name: &str,
        factory: &F,
    ) -> Result<Option<F::Output>> {
        self.present(name)?
            .map(|raw| factory.new_object(name, raw))
            .transpose()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    fn object_mut(&mut self, name: &str) -> Result<&mut Map<String, Value>> {
        match &mut self.value {
            Value::Object(map) => Ok(map),
            other => Err(Error::conversion(name, "object root", other)),
        }
    }

    /// Store `value` under `name` and mark it dirty.
    ///
    /// Storing the current value again still marks the field dirty.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let value = value.into();
        if let Some(spec) = lookup(self.fields, name) {
            spec.check(&value)?;
        }
        self.object_mut(name)?.insert(name.to_string(), value);
        self.dirty.insert(name.to_string());
        Ok(self)
    }

    /// Append the serialized form of `element` to a list field
    pub fn add_to_list_field<T: Serialize>(&mut self, name: &str, element: T) -> Result<&mut Self> {
        let element = to_json(name, element)?;
        let mut items = match self.get_field(name) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        };
        items.push(element);
        self.set_field(name, Value::Array(items))
    }

    /// Replace a list field with the serialized form of `elements`
    pub fn set_list_field<T, I>(&mut self, name: &str, elements: I) -> Result<&mut Self>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let items = elements
            .into_iter()
            .map(|element| to_json(name, element))
            .collect::<Result<Vec<_>>>()?;
        self.set_field(name, Value::Array(items))
    }

    // =========================================================================
    // Dirty tracking
    // =========================================================================

    pub fn mark_dirty(&mut self, name: &str) {
        self.dirty.insert(name.to_string());
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.dirty.contains(name)
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty field names with their current values (null when absent)
    pub fn dirty_fields(&self) -> Map<String, Value> {
        self.dirty
            .iter()
            .map(|name| {
                let value = self.value.get(name).cloned().unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}

fn to_json<T: Serialize>(field: &str, element: T) -> Result<Value> {
    serde_json::to_value(element).map_err(|e| Error::TypeConversion {
        field: field.to_string(),
        expected: "JSON value",
        found: e.to_string(),
    })
}

impl Serialize for JsonWrapper {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl FromStr for JsonWrapper {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(|e| Error::TypeConversion {
                field: "$".to_string(),
                expected: "JSON document",
                found: e.to_string(),
            })
    }
}

impl From<Value> for JsonWrapper {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{FieldKind, StringFactory, WrapperFactory};
    use serde_json::json;

    const TABLE: &[FieldSpec] = &[
        FieldSpec::optional("name", FieldKind::String),
        FieldSpec::optional("hosts", FieldKind::StringList),
        FieldSpec::required("version", FieldKind::Integer),
    ];

    fn wrapper(value: Value) -> JsonWrapper {
        JsonWrapper::from_value(value).with_fields(TABLE)
    }

    #[test]
    fn test_missing_optional_field_is_absent() {
        let w = wrapper(json!({"name": null, "version": 1}));
        assert!(w.get_field("name").is_none());
        assert_eq!(w.get_str("name").unwrap(), None);
        assert_eq!(w.get_str("description").unwrap(), None);
    }

    #[test]
    fn test_required_integer_must_be_coercible() {
        assert_eq!(wrapper(json!({"version": "3"})).get_i64("version").unwrap(), Some(3));

        let err = wrapper(json!({"version": "three"})).get_i64("version").unwrap_err();
        assert!(matches!(err, Error::TypeConversion { .. }));

        let err = wrapper(json!({})).get_i64("version").unwrap_err();
        assert!(matches!(err, Error::TypeConversion { .. }));
    }

    #[test]
    fn test_set_field_marks_dirty() {
        let mut w = wrapper(json!({"name": "prod", "version": 1}));
        assert!(!w.has_changes());

        w.set_field("name", "staging").unwrap();
        assert!(w.is_dirty("name"));
        assert_eq!(w.dirty_fields(), json!({"name": "staging"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_same_value_still_dirty() {
        let mut w = wrapper(json!({"name": "prod", "version": 1}));
        w.set_field("name", "prod").unwrap();
        assert!(w.is_dirty("name"));
    }

    #[test]
    fn test_set_field_checks_declared_kind() {
        let mut w = wrapper(json!({"version": 1}));
        assert!(w.set_field("version", "not a number").is_err());
        assert!(w.set_field("version", Value::Null).is_err());
        assert!(w.set_field("hosts", json!(["a", 1])).is_err());
        assert!(!w.has_changes());
        // Undeclared fields are free-form
        w.set_field("extra", json!({"a": 1})).unwrap();
    }

    #[test]
    fn test_set_field_requires_object_root() {
        let mut w = JsonWrapper::from_value(json!([1, 2]));
        assert!(w.set_field("name", "x").is_err());
        assert!(w.get_field("name").is_none());
    }

    #[test]
    fn test_list_field_returns_snapshot() {
        let w = wrapper(json!({"hosts": ["h1", "h2"], "version": 1}));
        let mut hosts = w.get_list_field("hosts", &StringFactory).unwrap();
        hosts.push("h3".to_string());
        assert_eq!(w.get_list_field("hosts", &StringFactory).unwrap(), vec!["h1", "h2"]);
        assert_eq!(w.get_field("hosts"), Some(&json!(["h1", "h2"])));
    }

    #[test]
    fn test_list_field_coercion() {
        let w = JsonWrapper::from_value(json!({"single": "only", "none": null}));
        assert_eq!(w.get_list_field("single", &StringFactory).unwrap(), vec!["only"]);
        assert!(w.get_list_field("none", &StringFactory).unwrap().is_empty());
        assert!(w.get_list_field("missing", &StringFactory).unwrap().is_empty());
    }

    #[test]
    fn test_list_factory_errors_name_the_entry() {
        let w = JsonWrapper::from_value(json!({"users": ["a", {"b": 1}]}));
        match w.get_list_field("users", &StringFactory).unwrap_err() {
            Error::TypeConversion { field, .. } => assert_eq!(field, "users[1]"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_add_to_list_field_appends_and_marks_dirty() {
        let mut w = wrapper(json!({"version": 1}));
        w.add_to_list_field("hosts", "h1").unwrap();
        w.add_to_list_field("hosts", "h2").unwrap();
        assert_eq!(w.get_field("hosts"), Some(&json!(["h1", "h2"])));
        assert!(w.is_dirty("hosts"));
    }

    #[test]
    fn test_add_to_list_field_serializes_nested_wrappers() {
        let mut w = JsonWrapper::new();
        let nested = JsonWrapper::from_value(json!({"key": "timeout"}));
        w.add_to_list_field("settings", &nested).unwrap();
        assert_eq!(w.get_field("settings"), Some(&json!([{"key": "timeout"}])));
    }

    #[test]
    fn test_set_list_field_replaces() {
        let mut w = wrapper(json!({"hosts": ["old"], "version": 1}));
        w.set_list_field("hosts", ["a", "b"]).unwrap();
        assert_eq!(w.get_list_field("hosts", &StringFactory).unwrap(), vec!["a", "b"]);
        w.set_list_field("hosts", Vec::<String>::new()).unwrap();
        assert!(w.get_list_field("hosts", &StringFactory).unwrap().is_empty());
    }

    #[test]
    fn test_object_field_is_built_lazily() {
        let w = JsonWrapper::from_value(json!({"owner": {"name": "ops"}}));
        let owner = w.get_object_field("owner", &WrapperFactory).unwrap().unwrap();
        assert_eq!(owner.get_str("name").unwrap().as_deref(), Some("ops"));
        assert!(w.get_object_field("missing", &WrapperFactory).unwrap().is_none());
    }

    #[test]
    fn test_replace_clears_dirty() {
        let mut w = wrapper(json!({"name": "a", "version": 1}));
        w.set_field("name", "b").unwrap();
        w.replace(json!({"name": "c", "version": 2}));
        assert!(!w.has_changes());
        assert_eq!(w.get_str("name").unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn test_merge_overlays_and_clears_dirty() {
        let mut w = wrapper(json!({"key": "timeout", "value": "30", "version": 4}));
        w.set_field("value", "60").unwrap();
        let mut echoed = Map::new();
        echoed.insert("version".into(), json!(5));
        w.merge(echoed);
        assert_eq!(w.as_value(), &json!({"key": "timeout", "value": "60", "version": 5}));
        assert!(!w.has_changes());
    }

    #[test]
    fn test_dirty_field_removed_reads_null() {
        let mut w = JsonWrapper::new();
        w.mark_dirty("ghost");
        assert_eq!(w.dirty_fields().get("ghost"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_from_text() {
        let w: JsonWrapper = r#"{"name": "prod"}"#.parse().unwrap();
        assert_eq!(w.get_str("name").unwrap().as_deref(), Some("prod"));
        assert!("{not json".parse::<JsonWrapper>().is_err());
    }
}
