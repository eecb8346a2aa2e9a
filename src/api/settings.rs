//! Host settings
//!
//! A host's setting has a key, a value and a version number. Settings are
//! addressed by key rather than by UUID. The server checks the version on
//! every update and answers with a conflict when it is stale, so
//! [`Setting::set_value`] always sends the version it was loaded with.

use crate::error::{Error, Result};
use crate::json::{ElementFactory, FieldKind, FieldSpec};
use crate::resource::show::{self, Show};
use crate::resource::{Collection, Endpoint, Resource, ResourceState};
use serde_json::Value;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("key", FieldKind::String),
    FieldSpec::optional("value", FieldKind::String),
    FieldSpec::optional("status", FieldKind::String),
    FieldSpec::required("version", FieldKind::Integer),
];

#[derive(Debug, Clone)]
pub struct Setting {
    state: ResourceState,
    collection: SettingCollection,
}

impl Setting {
    /// New setting, saved with a POST to the host's settings
    pub fn new(collection: &SettingCollection, key: &str, value: &str) -> Result<Self> {
        let mut state = ResourceState::new(FIELDS);
        state
            .fields_mut()?
            .set_field("key", key)?
            .set_field("value", value)?;
        Ok(Self {
            state,
            collection: collection.clone(),
        })
    }

    pub fn key(&self) -> Result<Option<String>> {
        self.state.fields()?.get_str("key")
    }

    pub fn value(&self) -> Result<Option<String>> {
        self.state.fields()?.get_str("value")
    }

    pub fn status(&self) -> Result<Option<String>> {
        self.state.fields()?.get_str("status")
    }

    /// Version number; a setting without a numeric version is malformed
    pub fn version(&self) -> Result<i64> {
        self.state
            .fields()?
            .get_i64("version")?
            .ok_or_else(|| Error::conversion("version", "integer", &Value::Null))
    }

    /// Change the value. The current version is sent along for conflict checks;
    /// a version echoed by the update response is adopted on save. Without one,
    /// `refresh()` before the next change.
    pub fn set_value(&mut self, value: &str) -> Result<()> {
        let fields = self.state.fields_mut()?;
        fields.set_field("value", value)?;
        if fields.get_field("version").is_some() {
            fields.mark_dirty("version");
        }
        Ok(())
    }
}

impl Show for Setting {
    fn show(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        show::line(&mut out, indent, "Key", show::or_dash(self.key()?));
        show::line(&mut out, indent, "Value", show::or_dash(self.value()?));
        show::line(&mut out, indent, "Status", show::or_dash(self.status()?));
        Ok(out)
    }
}

impl Resource for Setting {
    type Source = SettingCollection;
    const KIND: &'static str = "setting";

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn collection(&self) -> &SettingCollection {
        &self.collection
    }
}

/// Builds settings from a nested list field
#[derive(Debug, Clone)]
pub struct SettingFactory {
    collection: SettingCollection,
}

impl SettingFactory {
    pub fn new(collection: &SettingCollection) -> Self {
        Self {
            collection: collection.clone(),
        }
    }
}

impl ElementFactory for SettingFactory {
    type Output = Setting;

    fn new_object(&self, field: &str, raw: &Value) -> Result<Setting> {
        if !raw.is_object() {
            return Err(Error::conversion(field, "setting object", raw));
        }
        Ok(self.collection.new_resource(raw.clone()))
    }
}

/// Settings of one host
#[derive(Debug, Clone)]
pub struct SettingCollection {
    endpoint: Endpoint,
}

impl SettingCollection {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Collection for SettingCollection {
    type Item = Setting;

    const ID_FIELD: &'static str = "key";

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn new_resource(&self, data: Value) -> Setting {
        Setting {
            state: ResourceState::loaded(FIELDS, data),
            collection: self.clone(),
        }
    }
}
