//! Organizations

use crate::error::Result;
use crate::json::{FieldKind, FieldSpec};
use crate::resource::show::{self, Show};
use crate::resource::{Collection, Endpoint, Resource, ResourceState};
use serde_json::Value;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("uuid", FieldKind::Uuid),
    FieldSpec::optional("name", FieldKind::String),
    FieldSpec::optional("description", FieldKind::String),
];

#[derive(Debug, Clone)]
pub struct Organization {
    state: ResourceState,
    collection: OrganizationCollection,
}

impl Organization {
    pub fn new(collection: &OrganizationCollection) -> Self {
        Self {
            state: ResourceState::new(FIELDS),
            collection: collection.clone(),
        }
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.state.fields()?.get_str("name")
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.state.fields_mut()?.set_field("name", name)?;
        Ok(())
    }

    pub fn description(&self) -> Result<Option<String>> {
        self.state.fields()?.get_str("description")
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        self.state.fields_mut()?.set_field("description", description)?;
        Ok(())
    }
}

impl Show for Organization {
    fn show(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        show::line(&mut out, indent, "UUID", show::or_dash(self.get_uuid()?));
        show::line(&mut out, indent, "Name", show::or_dash(self.name()?));
        show::line(&mut out, indent, "Description", show::or_dash(self.description()?));
        Ok(out)
    }
}

impl Resource for Organization {
    type Source = OrganizationCollection;
    const KIND: &'static str = "organization";

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn collection(&self) -> &OrganizationCollection {
        &self.collection
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationCollection {
    endpoint: Endpoint,
}

impl OrganizationCollection {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Collection for OrganizationCollection {
    type Item = Organization;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn new_resource(&self, data: Value) -> Organization {
        Organization {
            state: ResourceState::loaded(FIELDS, data),
            collection: self.clone(),
        }
    }
}
