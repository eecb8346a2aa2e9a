//! Users

use crate::error::Result;
use crate::json::{FieldKind, FieldSpec, StringFactory};
use crate::resource::show::{self, Show};
use crate::resource::{Collection, Endpoint, Resource, ResourceState};
use serde_json::Value;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("uuid", FieldKind::Uuid),
    FieldSpec::optional("username", FieldKind::String),
    FieldSpec::optional("roles", FieldKind::StringList),
];

#[derive(Debug, Clone)]
pub struct User {
    state: ResourceState,
    collection: UserCollection,
}

impl User {
    pub fn new(collection: &UserCollection) -> Self {
        Self {
            state: ResourceState::new(FIELDS),
            collection: collection.clone(),
        }
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.state.fields()?.get_str("username")
    }

    pub fn set_name(&mut self, username: &str) -> Result<()> {
        self.state.fields_mut()?.set_field("username", username)?;
        Ok(())
    }

    pub fn roles(&self) -> Result<Vec<String>> {
        self.state.fields()?.get_list_field("roles", &StringFactory)
    }

    pub fn set_roles(&mut self, roles: &[&str]) -> Result<()> {
        self.state.fields_mut()?.set_list_field("roles", roles)?;
        Ok(())
    }
}

impl Show for User {
    fn show(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        show::line(&mut out, indent, "UUID", show::or_dash(self.get_uuid()?));
        show::line(&mut out, indent, "User name", show::or_dash(self.name()?));
        show::list(&mut out, indent, "Roles", &self.roles()?);
        Ok(out)
    }
}

impl Resource for User {
    type Source = UserCollection;
    const KIND: &'static str = "user";

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn collection(&self) -> &UserCollection {
        &self.collection
    }
}

#[derive(Debug, Clone)]
pub struct UserCollection {
    endpoint: Endpoint,
}

impl UserCollection {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Collection for UserCollection {
    type Item = User;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn new_resource(&self, data: Value) -> User {
        User {
            state: ResourceState::loaded(FIELDS, data),
            collection: self.clone(),
        }
    }
}
