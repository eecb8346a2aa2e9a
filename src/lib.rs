//! Cortex API client
//!
//! Models the resources exposed by a Cortex server (users, groups,
//! organizations, environments, host settings, audit logs) as JSON-backed
//! objects with typed accessors and dirty tracking.
//!
//! # Module Structure
//!
//! - [`json`] - JSON value cell, accessor tables and element factories
//! - [`resource`] - Generic resource and collection framework
//! - [`api`] - Concrete resource kinds
//! - [`transport`] - Request/response contract and its HTTP implementation
//! - [`client`] - Session context building the collections
//! - [`config`] - Persistent CLI configuration
//!
//! # Example
//!
//! ```ignore
//! use cortex_client::{Collection, CortexClient, Resource, Settings};
//!
//! async fn example() -> cortex_client::Result<()> {
//!     let client = CortexClient::connect(&Settings::new("https://cortex.example.com/api"))?;
//!     for env in client.environments().list(&[]).await? {
//!         println!("{}", env.identifier().await?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod json;
pub mod resource;
pub mod transport;

pub use client::CortexClient;
pub use error::{Error, Result};
pub use json::JsonWrapper;
pub use resource::{Collection, Lifecycle, Resource, ResourceFilter, Show};
pub use transport::{HttpTransport, Settings, Transport};
