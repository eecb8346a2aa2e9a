//! Audit log
//!
//! Log entries are read-only and carry no identity of their own.

use crate::error::Result;
use crate::json::{FieldKind, FieldSpec, JsonWrapper};
use crate::resource::show::{self, Show};
use crate::resource::{Collection, Endpoint};
use chrono::{DateTime, Utc};
use serde_json::Value;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("timestamp", FieldKind::Timestamp),
    FieldSpec::optional("message", FieldKind::String),
    FieldSpec::optional("initiatorUsername", FieldKind::String),
    FieldSpec::optional("initiatorFullName", FieldKind::String),
];

#[derive(Debug, Clone)]
pub struct Log {
    fields: JsonWrapper,
}

impl Log {
    pub fn timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        self.fields.get_timestamp("timestamp")
    }

    pub fn message(&self) -> Result<Option<String>> {
        self.fields.get_str("message")
    }

    pub fn initiator_username(&self) -> Result<Option<String>> {
        self.fields.get_str("initiatorUsername")
    }

    pub fn initiator_full_name(&self) -> Result<Option<String>> {
        self.fields.get_str("initiatorFullName")
    }
}

impl Show for Log {
    fn show(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        let timestamp = self.timestamp()?.map(|t| t.to_rfc3339());
        show::line(&mut out, indent, "Timestamp", show::or_dash(timestamp));
        show::line(&mut out, indent, "Initiator", show::or_dash(self.initiator_username()?));
        show::line(&mut out, indent, "Message", show::or_dash(self.message()?));
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct AuditCollection {
    endpoint: Endpoint,
}

impl AuditCollection {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Collection for AuditCollection {
    type Item = Log;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn new_resource(&self, data: Value) -> Log {
        Log {
            fields: JsonWrapper::from_value(data).with_fields(FIELDS),
        }
    }
}
