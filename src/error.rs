//! Error types for the Cortex client.
//!
//! Every failure surfaces to the caller. Nothing in the crate retries or
//! recovers locally, so each variant maps to one distinct situation a caller
//! may want to present differently.

use serde_json::Value;
use thiserror::Error;

/// Maximum length of a server message kept in an error or a log line
const MAX_MESSAGE_LENGTH: usize = 200;

#[derive(Debug, Error)]
pub enum Error {
    /// Network failure, 5xx status or malformed response
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    /// Concurrent modification detected by the server
    #[error("Conflicting update on {path}: {message}")]
    Conflict { path: String, message: String },

    /// Validation failure reported by the server (4xx other than 404/409)
    #[error("Request rejected ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("Field '{field}' cannot be read as {expected}: found {found}")]
    TypeConversion {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("Resource has been deleted")]
    UseAfterDelete,

    /// The resource has no identifier yet
    #[error("{kind} has not been saved yet")]
    Unsaved { kind: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn conversion(field: &str, expected: &'static str, found: &Value) -> Self {
        Self::TypeConversion {
            field: field.to_string(),
            expected,
            found: describe(found),
        }
    }

    /// Interpret a non-2xx status returned for `path`.
    pub fn from_status(status: u16, path: &str, body: &Value) -> Self {
        match status {
            404 => Self::NotFound {
                path: path.to_string(),
            },
            409 => Self::Conflict {
                path: path.to_string(),
                message: server_message(body),
            },
            400..=499 => Self::RemoteRejected {
                status,
                message: server_message(body),
            },
            _ => Self::Transport {
                message: format!("{} returned status {}", path, status),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Extract the message a server put in an error body
fn server_message(body: &Value) -> String {
    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .or_else(|| body.pointer("/error/message").and_then(|v| v.as_str()))
        .or_else(|| body.as_str())
        .unwrap_or("no details provided");

    message.chars().take(MAX_MESSAGE_LENGTH).collect()
}

/// Short description of a JSON value for conversion errors
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s.chars().take(40).collect::<String>()),
        Value::Array(arr) => format!("array of {} items", arr.len()),
        Value::Object(_) => "object".to_string(),
    }
}

/// Format an error for display in the CLI
pub fn format_error(error: &Error) -> String {
    match error {
        Error::Transport { .. } => {
            "Cortex service unreachable or failing. Check the URL and try again.".to_string()
        }
        Error::NotFound { .. } => "Resource not found.".to_string(),
        Error::Conflict { .. } => {
            "Resource was modified concurrently. Refresh and try again.".to_string()
        }
        Error::RemoteRejected { status: 401, .. } => {
            "Authentication failed. Run 'cortex configure --token <TOKEN>'.".to_string()
        }
        Error::RemoteRejected { status: 403, .. } => "Permission denied.".to_string(),
        other => other.to_string(),
    }
}
