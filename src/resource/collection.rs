//! Remote collections
//!
//! A collection is the addressable set of resources of one kind. It holds no
//! per-call state and caches nothing: every operation is one fresh round-trip.

use crate::error::{Error, Result};
use crate::json::fields::lookup;
use crate::json::JsonWrapper;
use crate::transport::{Method, Transport};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Filter for listings, sent as `param=value` query pairs
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pub param: String,
    pub values: Vec<String>,
}

impl ResourceFilter {
    pub fn new(param: &str, values: Vec<String>) -> Self {
        Self {
            param: param.to_string(),
            values,
        }
    }

    /// Single-valued filter
    pub fn eq(param: &str, value: &str) -> Self {
        Self::new(param, vec![value.to_string()])
    }
}

/// Collection path bound to the shared transport
#[derive(Clone)]
pub struct Endpoint {
    transport: Arc<dyn Transport>,
    path: String,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("path", &self.path).finish()
    }
}

impl Endpoint {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into().trim_matches('/').to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `<path>/<identifier>`, identifier percent-encoded
    pub fn item_path(&self, identifier: &str) -> String {
        format!("{}/{}", self.path, urlencoding::encode(identifier))
    }

    /// `<path>` with filters appended as a query string
    pub fn list_path(&self, filters: &[ResourceFilter]) -> String {
        let query: Vec<String> = filters
            .iter()
            .flat_map(|filter| {
                filter.values.iter().map(move |value| {
                    format!(
                        "{}={}",
                        urlencoding::encode(&filter.param),
                        urlencoding::encode(value)
                    )
                })
            })
            .collect();

        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query.join("&"))
        }
    }

    /// Send one request and interpret the status
    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let response = self.transport.request(method, path, body).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(Error::from_status(response.status, path, &response.body))
        }
    }
}

/// Operations shared by every resource kind.
///
/// Implementors supply the endpoint and the [`new_resource`](Collection::new_resource)
/// factory hook; everything else is generic.
#[async_trait]
pub trait Collection: Clone + Send + Sync + Sized + 'static {
    type Item: Send;

    /// Field holding the identifier used in item paths
    const ID_FIELD: &'static str = "uuid";

    fn endpoint(&self) -> &Endpoint;

    /// Wrap raw server JSON into this collection's item type.
    /// Must not perform any I/O.
    fn new_resource(&self, data: Value) -> Self::Item;

    /// List the collection; an empty filter slice lists everything
    async fn list(&self, filters: &[ResourceFilter]) -> Result<Listing<Self>> {
        let path = self.endpoint().list_path(filters);
        let body = self.endpoint().call(Method::GET, &path, None).await?;
        let items = extract_items(body, &path)?;
        tracing::debug!("Listed {} entries from {}", items.len(), path);
        Ok(Listing::new(self.clone(), items))
    }

    async fn get(&self, identifier: &str) -> Result<Self::Item> {
        let path = self.endpoint().item_path(identifier);
        let body = self.endpoint().call(Method::GET, &path, None).await?;
        Ok(self.new_resource(body))
    }

    /// Submit a full value cell; returns the identifier the server assigned
    async fn create(&self, fields: &JsonWrapper) -> Result<String> {
        let path = self.endpoint().path().to_string();
        let body = self
            .endpoint()
            .call(Method::POST, &path, Some(fields.as_value()))
            .await?;

        let raw = extract_identifier(&body, Self::ID_FIELD).ok_or_else(|| {
            Error::transport(format!("{} returned no '{}' for the new resource", path, Self::ID_FIELD))
        })?;
        // The resource exists remotely at this point; a bad id is a broken response
        if let Some(spec) = lookup(fields.fields(), Self::ID_FIELD) {
            spec.check(raw).map_err(|_| {
                Error::transport(format!(
                    "{} created a resource but returned malformed '{}': {}",
                    path,
                    Self::ID_FIELD,
                    raw
                ))
            })?;
        }
        let identifier = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        tracing::info!("Created {}/{}", path, identifier);
        Ok(identifier)
    }

    /// Submit a partial payload; returns the response body (`null` when empty)
    async fn update(&self, identifier: &str, dirty_fields: &Map<String, Value>) -> Result<Value> {
        let path = self.endpoint().item_path(identifier);
        let body = Value::Object(dirty_fields.clone());
        tracing::debug!(
            "Updating {} ({})",
            path,
            dirty_fields.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        self.endpoint().call(Method::PATCH, &path, Some(&body)).await
    }

    /// Remove a resource; deleting twice fails with `NotFound`
    async fn delete(&self, identifier: &str) -> Result<()> {
        let path = self.endpoint().item_path(identifier);
        self.endpoint().call(Method::DELETE, &path, None).await?;
        tracing::info!("Deleted {}", path);
        Ok(())
    }
}

/// Entries of a list response: a bare array, an object with an `items` array,
/// or an empty body
fn extract_items(body: Value, path: &str) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::transport(format!(
                "Malformed listing from {}: object without an 'items' array",
                path
            ))),
        },
        _ => Err(Error::transport(format!("Malformed listing from {}", path))),
    }
}

/// Identifier from a create response: the id field of an object, or a bare string
fn extract_identifier<'a>(body: &'a Value, id_field: &str) -> Option<&'a Value> {
    let raw = match body {
        Value::Object(map) => map.get(id_field)?,
        other => other,
    };
    match raw {
        Value::String(s) if !s.is_empty() => Some(raw),
        Value::Number(_) => Some(raw),
        _ => None,
    }
}

/// One-shot listing; items are built through the factory hook as they are consumed
pub struct Listing<C: Collection> {
    collection: C,
    items: std::vec::IntoIter<Value>,
}

impl<C: Collection> Listing<C> {
    fn new(collection: C, items: Vec<Value>) -> Self {
        Self {
            collection,
            items: items.into_iter(),
        }
    }
}

impl<C: Collection> Iterator for Listing<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<C::Item> {
        self.items
            .next()
            .map(|raw| self.collection.new_resource(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<C: Collection> ExactSizeIterator for Listing<C> {}
