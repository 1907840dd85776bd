//! Configuration management for dbx-bridge.
//!
//! Handles loading configuration from TOML files, with support for named
//! workspace profiles and statement executor tuning. Profiles missing from
//! the TOML file fall back to the sections of the Databricks CLI's
//! `~/.databrickscfg`.

use crate::error::{BridgeError, Result};
use ini::Ini;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Profile used when no profile name is given.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Main configuration structure for dbx-bridge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named workspace profiles.
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,

    /// Statement executor tuning.
    #[serde(default)]
    pub executor: ExecutorSettings,

    /// Profiles read from `~/.databrickscfg`, consulted after `profiles`.
    #[serde(skip)]
    pub cli_profiles: HashMap<String, ProfileConfig>,
}

/// A named workspace profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Workspace host (e.g., "https://adb-123.azuredatabricks.net").
    pub host: Option<String>,

    /// Personal access token (not recommended to store in config).
    pub token: Option<String>,

    /// SQL warehouse used for `sample`.
    pub warehouse_id: Option<String>,
}

/// Executor tuning as written in the `[executor]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Maximum number of status polls after submission.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Sleep between polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout for the submit request, in seconds.
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,

    /// Timeout for each poll request, in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_max_polls() -> u32 {
    20
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_submit_timeout_secs() -> u64 {
    45
}

fn default_poll_timeout_secs() -> u64 {
    20
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_polls: default_max_polls(),
            poll_interval_ms: default_poll_interval_ms(),
            submit_timeout_secs: default_submit_timeout_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl ExecutorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

impl ProfileConfig {
    /// Returns the profile's warehouse id, ignoring blank values.
    pub fn warehouse_id(&self) -> Option<&str> {
        self.warehouse_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dbx-bridge")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error and yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            BridgeError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Returns the Databricks CLI config path.
    ///
    /// Honors `DATABRICKS_CONFIG_FILE`, otherwise `~/.databrickscfg`.
    pub fn databrickscfg_path() -> PathBuf {
        std::env::var_os("DATABRICKS_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".databrickscfg")
            })
    }

    /// Loads the sections of a Databricks CLI config file as fallback profiles.
    ///
    /// A missing file leaves the configuration unchanged.
    pub fn with_databrickscfg(mut self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(self);
        }

        let ini = Ini::load_from_file(path).map_err(|e| {
            BridgeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.cli_profiles = cli_profiles(&ini);
        debug!(
            "Loaded {} profile(s) from {}",
            self.cli_profiles.len(),
            path.display()
        );
        Ok(self)
    }

    /// Looks up a profile, first in the TOML file, then in `.databrickscfg`.
    ///
    /// A named profile must exist. Without a name, the `DEFAULT` profile is
    /// returned when present.
    pub fn profile(&self, name: Option<&str>) -> Result<Option<&ProfileConfig>> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self.lookup(name).map(Some).ok_or_else(|| {
                BridgeError::config(format!(
                    "Profile '{}' not found in config file or .databrickscfg",
                    name
                ))
            }),
            None => Ok(self.lookup(DEFAULT_PROFILE)),
        }
    }

    fn lookup(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles
            .get(name)
            .or_else(|| self.cli_profiles.get(name))
    }
}

/// Projects named INI sections onto profiles. Keys outside a section are
/// ignored.
fn cli_profiles(ini: &Ini) -> HashMap<String, ProfileConfig> {
    ini.iter()
        .filter_map(|(section, props)| {
            let name = section?;
            let profile = ProfileConfig {
                host: props.get("host").map(String::from),
                token: props.get("token").map(String::from),
                warehouse_id: props.get("warehouse_id").map(String::from),
            };
            Some((name.to_string(), profile))
        })
        .collect()
}
