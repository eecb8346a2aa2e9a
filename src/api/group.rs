//! Groups of users

use crate::error::Result;
use crate::json::{FieldKind, FieldSpec, StringFactory};
use crate::resource::show::{self, Show};
use crate::resource::{Collection, Endpoint, Resource, ResourceState};
use serde_json::Value;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("uuid", FieldKind::Uuid),
    FieldSpec::optional("name", FieldKind::String),
    FieldSpec::optional("users", FieldKind::StringList),
];

#[derive(Debug, Clone)]
pub struct Group {
    state: ResourceState,
    collection: GroupCollection,
}

impl Group {
    pub fn new(collection: &GroupCollection) -> Self {
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

    /// Member user names
    pub fn users(&self) -> Result<Vec<String>> {
        self.state.fields()?.get_list_field("users", &StringFactory)
    }

    pub fn add_user(&mut self, user: &str) -> Result<()> {
        self.state.fields_mut()?.add_to_list_field("users", user)?;
        Ok(())
    }

    pub fn clear_users(&mut self) -> Result<()> {
        self.state
            .fields_mut()?
            .set_list_field("users", Vec::<String>::new())?;
        Ok(())
    }
}

impl Show for Group {
    fn show(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        show::line(&mut out, indent, "Name", show::or_dash(self.name()?));
        show::list(&mut out, indent, "Users", &self.users()?);
        Ok(out)
    }
}

impl Resource for Group {
    type Source = GroupCollection;
    const KIND: &'static str = "group";

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn collection(&self) -> &GroupCollection {
        &self.collection
    }
}

#[derive(Debug, Clone)]
pub struct GroupCollection {
    endpoint: Endpoint,
}

impl GroupCollection {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Collection for GroupCollection {
    type Item = Group;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn new_resource(&self, data: Value) -> Group {
        Group {
            state: ResourceState::loaded(FIELDS, data),
            collection: self.clone(),
        }
    }
}
