//! Transport layer
//!
//! The collections only need one primitive from the network: send a method,
//! a path and an optional JSON body, get back a status and a JSON body.
//!
//! - [`http`] - `reqwest` implementation with bearer-token authentication

pub mod http;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use http::{HttpTransport, Settings};
pub use reqwest::Method;

/// Raw server answer, body delivered unmodified
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request/response primitive shared by every collection.
///
/// Implementations return `Error::Transport` when the server could not be
/// reached or answered with something that is not JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response>;
}
