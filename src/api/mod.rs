//! Cortex resource kinds
//!
//! Each kind is a thin specialization of [`crate::resource`]: an accessor
//! table, typed getters/setters, a rendering and a collection whose factory
//! hook builds it.
//!
//! - [`user`] - Users and their roles
//! - [`group`] - Groups of users
//! - [`organization`] - Organizations
//! - [`environment`] - Environments of an organization, with their hosts
//! - [`settings`] - Per-host settings, keyed and versioned
//! - [`audit`] - Read-only audit log

pub mod audit;
pub mod environment;
pub mod group;
pub mod organization;
pub mod settings;
pub mod user;

pub use audit::{AuditCollection, Log};
pub use environment::{Environment, EnvironmentCollection};
pub use group::{Group, GroupCollection};
pub use organization::{Organization, OrganizationCollection};
pub use settings::{Setting, SettingCollection, SettingFactory};
pub use user::{User, UserCollection};
