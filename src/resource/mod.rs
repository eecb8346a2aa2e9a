//! Resource abstraction layer
//!
//! A resource is a JSON value cell bound to an identity and to the
//! collection that fetched it. Concrete kinds live in [`crate::api`]; they only
//! declare their accessor table, typed accessors and rendering.
//!
//! # Architecture
//!
//! - [`collection`] - Generic list/get/create/update/delete against an endpoint
//! - [`show`] - Diagnostic rendering
//!
//! # Lifecycle
//!
//! ```text
//! New --save--> Persisted --save/refresh--> Persisted --delete--> Deleted
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cortex_client::{Collection, CortexClient, Resource};
//!
//! async fn rename(client: &CortexClient, uuid: &str) -> cortex_client::Result<()> {
//!     let mut group = client.groups().get(uuid).await?;
//!     group.set_name("operators")?;
//!     group.save().await // sends {"name": "operators"} only
//! }
//! ```

pub mod collection;
pub mod show;

pub use collection::{Collection, Endpoint, Listing, ResourceFilter};
pub use show::Show;

use crate::error::{Error, Result};
use crate::json::{FieldSpec, JsonWrapper};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not yet saved, no identifier
    New,
    Persisted,
    /// Terminal
    Deleted,
}

/// Value cell plus lifecycle, embedded in every concrete resource
#[derive(Debug, Clone)]
pub struct ResourceState {
    fields: JsonWrapper,
    lifecycle: Lifecycle,
}

impl ResourceState {
    /// Empty, unsaved instance
    pub fn new(table: &'static [FieldSpec]) -> Self {
        Self {
            fields: JsonWrapper::new().with_fields(table),
            lifecycle: Lifecycle::New,
        }
    }

    /// Instance loaded from server JSON
    pub fn loaded(table: &'static [FieldSpec], data: Value) -> Self {
        Self {
            fields: JsonWrapper::from_value(data).with_fields(table),
            lifecycle: Lifecycle::Persisted,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn fields(&self) -> Result<&JsonWrapper> {
        match self.lifecycle {
            Lifecycle::Deleted => Err(Error::UseAfterDelete),
            _ => Ok(&self.fields),
        }
    }

    pub fn fields_mut(&mut self) -> Result<&mut JsonWrapper> {
        match self.lifecycle {
            Lifecycle::Deleted => Err(Error::UseAfterDelete),
            _ => Ok(&mut self.fields),
        }
    }

    /// Identifier value, readable in any state
    fn identity(&self, id_field: &str) -> Option<String> {
        match self.fields.get_field(id_field)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn adopt_identifier(&mut self, id_field: &str, identifier: String) -> Result<()> {
        let mut fields = self.fields.clone();
        fields.set_field(id_field, identifier)?;
        fields.clear_dirty();
        self.fields = fields;
        self.lifecycle = Lifecycle::Persisted;
        Ok(())
    }

    fn reload(&mut self, data: Value) {
        self.fields.replace(data);
    }

    fn mark_deleted(&mut self) {
        self.lifecycle = Lifecycle::Deleted;
    }
}

/// A remote domain object with identity.
///
/// Implementors expose their embedded [`ResourceState`] and the collection
/// that produced them; load/save/delete/refresh are provided.
#[async_trait]
pub trait Resource: Show + Send + Sync + Sized {
    /// The collection this kind is fetched from and persisted to
    type Source: Collection<Item = Self>;

    /// Human-readable kind name for messages
    const KIND: &'static str;

    fn state(&self) -> &ResourceState;

    fn state_mut(&mut self) -> &mut ResourceState;

    fn collection(&self) -> &Self::Source;

    fn lifecycle(&self) -> Lifecycle {
        self.state().lifecycle()
    }

    /// `None` for unsaved instances and for kinds keyed otherwise
    fn get_uuid(&self) -> Result<Option<Uuid>> {
        self.state().fields()?.get_uuid("uuid")
    }

    /// Identifier used in item paths
    fn address(&self) -> Result<String> {
        let id_field = <Self::Source as Collection>::ID_FIELD;
        match self.lifecycle() {
            Lifecycle::Deleted => Err(Error::UseAfterDelete),
            Lifecycle::New => Err(Error::Unsaved { kind: Self::KIND }),
            Lifecycle::Persisted => self
                .state()
                .identity(id_field)
                .ok_or_else(|| Error::conversion(id_field, "identifier", &Value::Null)),
        }
    }

    /// Display identity; kinds with derived keys override this
    async fn identifier(&self) -> Result<String> {
        self.address()
    }

    /// Create when new, otherwise send only the dirty fields.
    /// An object in the update response is merged into the local value.
    /// Local state is untouched when the server refuses.
    async fn save(&mut self) -> Result<()> {
        let collection = self.collection().clone();
        match self.lifecycle() {
            Lifecycle::Deleted => Err(Error::UseAfterDelete),
            Lifecycle::New => {
                let identifier = collection.create(self.state().fields()?).await?;
                let id_field = <Self::Source as Collection>::ID_FIELD;
                self.state_mut().adopt_identifier(id_field, identifier)
            }
            Lifecycle::Persisted => {
                let identifier = self.address()?;
                let dirty = self.state().fields()?.dirty_fields();
                if dirty.is_empty() {
                    tracing::debug!("{} {} has no changes to save", Self::KIND, identifier);
                    return Ok(());
                }
                let echoed = collection.update(&identifier, &dirty).await?;
                let fields = self.state_mut().fields_mut()?;
                match echoed {
                    Value::Object(updates) => fields.merge(updates),
                    _ => fields.clear_dirty(),
                }
                Ok(())
            }
        }
    }

    /// Remove the remote resource. The instance is unusable afterwards.
    async fn delete(&mut self) -> Result<()> {
        if self.lifecycle() == Lifecycle::Deleted {
            let id_field = <Self::Source as Collection>::ID_FIELD;
            let identifier = self.state().identity(id_field).unwrap_or_default();
            return Err(Error::NotFound {
                path: self.collection().endpoint().item_path(&identifier),
            });
        }
        let identifier = self.address()?;
        let collection = self.collection().clone();
        collection.delete(&identifier).await?;
        self.state_mut().mark_deleted();
        Ok(())
    }

    /// Reload from the server, discarding unsaved changes
    async fn refresh(&mut self) -> Result<()> {
        let identifier = self.address()?;
        let path = self.collection().endpoint().item_path(&identifier);
        let data = self
            .collection()
            .endpoint()
            .call(crate::transport::Method::GET, &path, None)
            .await?;
        self.state_mut().reload(data);
        Ok(())
    }
}
