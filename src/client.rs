//! Cortex client
//!
//! Caller-owned session context. Holds the shared transport and builds every
//! collection explicitly; nothing in the crate keeps a process-wide default.

use crate::api::{
    AuditCollection, EnvironmentCollection, GroupCollection, OrganizationCollection,
    SettingCollection, UserCollection,
};
use crate::error::Result;
use crate::resource::Endpoint;
use crate::transport::{HttpTransport, Settings, Transport};
use std::sync::Arc;

const USERS_PATH: &str = "users";
const GROUPS_PATH: &str = "groups";
const ORGANIZATIONS_PATH: &str = "organizations";
const ENVIRONMENTS_PATH: &str = "environments";
const AUDIT_PATH: &str = "audit";

#[derive(Clone)]
pub struct CortexClient {
    transport: Arc<dyn Transport>,
}

impl CortexClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client over HTTP
    pub fn connect(settings: &Settings) -> Result<Self> {
        let transport = HttpTransport::new(settings)?;
        tracing::debug!("Connecting to {}", transport.base_url());
        Ok(Self::new(Arc::new(transport)))
    }

    fn endpoint(&self, path: &str) -> Endpoint {
        Endpoint::new(self.transport.clone(), path)
    }

    pub fn users(&self) -> UserCollection {
        UserCollection::new(self.endpoint(USERS_PATH))
    }

    pub fn groups(&self) -> GroupCollection {
        GroupCollection::new(self.endpoint(GROUPS_PATH))
    }

    pub fn organizations(&self) -> OrganizationCollection {
        OrganizationCollection::new(self.endpoint(ORGANIZATIONS_PATH))
    }

    pub fn environments(&self) -> EnvironmentCollection {
        EnvironmentCollection::new(self.endpoint(ENVIRONMENTS_PATH), self.organizations())
    }

    /// Settings of one host
    pub fn settings(&self, host: &str) -> SettingCollection {
        SettingCollection::new(self.endpoint(&settings_path(host)))
    }

    pub fn audit(&self) -> AuditCollection {
        AuditCollection::new(self.endpoint(AUDIT_PATH))
    }
}

/// Build the settings path of a host
pub fn settings_path(host: &str) -> String {
    format!("hosts/{}/settings", urlencoding::encode(host))
}
