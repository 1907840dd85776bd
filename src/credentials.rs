//! Workspace credential resolution.
//!
//! Explicit values (flags or environment) win; a profile fills whatever is
//! still missing.

use std::fmt;

use crate::config::ProfileConfig;
use crate::error::{BridgeError, Result};

/// An authenticated workspace endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
        }
    }

    /// Fails with a configuration error if host or token is blank.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(BridgeError::config("Workspace host is required"));
        }
        if self.token.trim().is_empty() {
            return Err(BridgeError::config("Access token is required"));
        }
        Ok(())
    }
}

/// Resolves credentials from explicit values and an optional profile.
pub fn resolve(
    explicit_host: Option<&str>,
    explicit_token: Option<&str>,
    profile: Option<&ProfileConfig>,
) -> Result<Credentials> {
    let host = present(explicit_host)
        .or_else(|| profile.and_then(|p| present(p.host.as_deref())));
    let token = present(explicit_token)
        .or_else(|| profile.and_then(|p| present(p.token.as_deref())));

    match (host, token) {
        (Some(host), Some(token)) => Ok(Credentials::new(normalize_host(host), token)),
        (None, None) => Err(BridgeError::config(
            "No workspace host or token configured. Pass --host/--token or configure a profile.",
        )),
        (None, Some(_)) => Err(BridgeError::config(
            "No workspace host configured. Pass --host or set it in the profile.",
        )),
        (Some(_), None) => Err(BridgeError::config(
            "No access token configured. Pass --token or set it in the profile.",
        )),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_host(host: &str) -> String {
    host.trim_end_matches('/').to_string()
}
