//! Transport layer for Databricks workspace REST calls.
//!
//! This module provides:
//! - `WorkspaceTransport` trait: authenticated JSON GET/POST calls
//! - `HttpTransport`: reqwest implementation used by the CLI
//! - `MockTransport`: scripted in-memory implementation for tests

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedCall};

use crate::credentials::Credentials;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// HTTP method of a workspace call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Trait for issuing authenticated calls against a workspace.
///
/// `path` is relative to the credential host (e.g. `/api/2.0/sql/statements`).
/// Implementations return the decoded JSON body of a 2xx response and map
/// everything else to a transport error.
#[async_trait]
pub trait WorkspaceTransport: Send + Sync {
    /// Issues a GET with the given query parameters.
    async fn get(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Value>;

    /// Issues a POST with a JSON body.
    async fn post(
        &self,
        credentials: &Credentials,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value>;
}
