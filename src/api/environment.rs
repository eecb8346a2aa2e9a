//! Environments
//!
//! An environment belongs to an organization and groups a set of hosts. Its
//! display identifier is `<organization-name>/<environment-name>`, resolved
//! against the organization collection every time it is asked for.

use super::organization::OrganizationCollection;
use crate::error::{Error, Result};
use crate::json::{FieldKind, FieldSpec, StringFactory};
use crate::resource::show::{self, Show};
use crate::resource::{Collection, Endpoint, Resource, ResourceState};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("uuid", FieldKind::Uuid),
    FieldSpec::optional("name", FieldKind::String),
    FieldSpec::optional("description", FieldKind::String),
    FieldSpec::optional("organization", FieldKind::Uuid),
    FieldSpec::optional("hosts", FieldKind::StringList),
];

#[derive(Debug, Clone)]
pub struct Environment {
    state: ResourceState,
    collection: EnvironmentCollection,
}

impl Environment {
    pub fn new(collection: &EnvironmentCollection) -> Self {
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

    /// UUID of the owning organization
    pub fn organization(&self) -> Result<Option<Uuid>> {
        self.state.fields()?.get_uuid("organization")
    }

    pub fn set_organization(&mut self, organization: Uuid) -> Result<()> {
        self.state
            .fields_mut()?
            .set_field("organization", organization.to_string())?;
        Ok(())
    }

    pub fn hosts(&self) -> Result<Vec<String>> {
        self.state.fields()?.get_list_field("hosts", &StringFactory)
    }

    pub fn set_hosts(&mut self, hosts: &[&str]) -> Result<()> {
        self.state.fields_mut()?.set_list_field("hosts", hosts)?;
        Ok(())
    }

    pub fn add_host(&mut self, host: &str) -> Result<()> {
        self.state.fields_mut()?.add_to_list_field("hosts", host)?;
        Ok(())
    }
}

impl Show for Environment {
    fn show(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        show::line(&mut out, indent, "UUID", show::or_dash(self.get_uuid()?));
        show::line(&mut out, indent, "Name", show::or_dash(self.name()?));
        show::line(&mut out, indent, "Description", show::or_dash(self.description()?));
        show::line(&mut out, indent, "Organization", show::or_dash(self.organization()?));
        show::list(&mut out, indent, "Hosts", &self.hosts()?);
        Ok(out)
    }
}

#[async_trait]
impl Resource for Environment {
    type Source = EnvironmentCollection;
    const KIND: &'static str = "environment";

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn collection(&self) -> &EnvironmentCollection {
        &self.collection
    }

    /// `<organization-name>/<environment-name>`
    async fn identifier(&self) -> Result<String> {
        let organization = self
            .organization()?
            .ok_or_else(|| Error::conversion("organization", "uuid", &Value::Null))?;
        let name = self.name()?.unwrap_or_default();

        let organization = self
            .collection
            .organizations()
            .get(&organization.to_string())
            .await?;
        let org_name = organization.name()?.unwrap_or_default();

        Ok(format!("{}/{}", org_name, name))
    }
}

/// Environments, with the organization collection used to name them
#[derive(Debug, Clone)]
pub struct EnvironmentCollection {
    endpoint: Endpoint,
    organizations: OrganizationCollection,
}

impl EnvironmentCollection {
    pub fn new(endpoint: Endpoint, organizations: OrganizationCollection) -> Self {
        Self {
            endpoint,
            organizations,
        }
    }

    pub fn organizations(&self) -> &OrganizationCollection {
        &self.organizations
    }
}

impl Collection for EnvironmentCollection {
    type Item = Environment;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn new_resource(&self, data: Value) -> Environment {
        Environment {
            state: ResourceState::loaded(FIELDS, data),
            collection: self.clone(),
        }
    }
}
