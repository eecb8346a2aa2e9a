//! HTTP transport for the Cortex REST API

use super::{Method, Response, Transport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|idx| body.is_char_boundary(*idx))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Connection settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `reqwest` client bound to one Cortex server
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::transport(format!("Invalid base URL '{}': {}", base, e)))?;

        let client = Client::builder()
            .user_agent(concat!("cortex-client/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: settings.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::transport(format!("Invalid request path '{}': {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} {} - {} - {}", method, path, status, sanitize_for_log(&text));
        }

        // Handle empty response
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) if status.is_success() => {
                    return Err(Error::transport(format!(
                        "Failed to parse response JSON: {}",
                        e
                    )));
                }
                // Error pages are often plain text; keep them for the message
                Err(_) => Value::String(text),
            }
        };

        Ok(Response::new(status.as_u16(), body))
    }
}
