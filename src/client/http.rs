//! reqwest-backed workspace transport.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{Method, WorkspaceTransport};
use crate::credentials::Credentials;
use crate::error::{BridgeError, Result};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("dbx-bridge/", env!("CARGO_PKG_VERSION"));

/// Error envelope returned by Databricks REST APIs on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Workspace transport over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new transport. Timeouts are applied per request.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BridgeError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Joins the credential host and an API path into a full URL.
    ///
    /// Hosts without a scheme are treated as HTTPS.
    pub fn endpoint(host: &str, path: &str) -> Result<Url> {
        let host = host.trim().trim_end_matches('/');
        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        let mut url = Url::parse(&base)
            .map_err(|e| BridgeError::config(format!("Invalid workspace host '{}': {}", host, e)))?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(BridgeError::config(format!(
                "Invalid workspace host '{}'",
                host
            )));
        }

        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        Ok(url)
    }

    /// Sends a request and decodes the JSON body.
    async fn send(&self, method: Method, url: &Url, request: RequestBuilder) -> Result<Value> {
        debug!("{} {}", method, url);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BridgeError::transport(format!("{} {} timed out", method, url.path()))
            } else if e.is_connect() {
                BridgeError::transport(format!(
                    "Failed to connect to {}. Check the workspace host and your network.",
                    url.host_str().unwrap_or_default()
                ))
            } else {
                BridgeError::transport(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        Ok(Self::decode_body(&body))
    }

    /// Turns a non-2xx response into a transport error.
    fn parse_error(status: StatusCode, body: &str) -> BridgeError {
        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(body) {
            match (error.error_code, error.message) {
                (Some(code), Some(message)) => {
                    return BridgeError::transport(format!(
                        "HTTP {}: {} ({})",
                        status.as_u16(),
                        message,
                        code
                    ));
                }
                (None, Some(message)) => {
                    return BridgeError::transport(format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        message
                    ));
                }
                _ => {}
            }
        }

        BridgeError::transport(format!("HTTP {}: {}", status.as_u16(), body.trim()))
    }

    /// Decodes a 2xx body; non-JSON bodies are kept as a JSON string.
    fn decode_body(body: &str) -> Value {
        if body.trim().is_empty() {
            return Value::Null;
        }
        match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Response body is not JSON ({}); keeping it as text", e);
                Value::String(body.to_string())
            }
        }
    }
}

#[async_trait]
impl WorkspaceTransport for HttpTransport {
    async fn get(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Value> {
        let url = Self::endpoint(&credentials.host, path)?;
        let request = self
            .client
            .get(url.clone())
            .bearer_auth(&credentials.token)
            .query(query)
            .timeout(timeout);

        self.send(Method::Get, &url, request).await
    }

    async fn post(
        &self,
        credentials: &Credentials,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value> {
        let url = Self::endpoint(&credentials.host, path)?;
        let request = self
            .client
            .post(url.clone())
            .bearer_auth(&credentials.token)
            .json(body)
            .timeout(timeout);

        self.send(Method::Post, &url, request).await
    }
}
