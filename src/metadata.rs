//! Unity Catalog metadata listing.
//!
//! Lists catalogs, schemas and tables, and describes a single table. Listing
//! follows page tokens; entries without a name are dropped and the rest are
//! sorted by name.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::WorkspaceTransport;
use crate::credentials::Credentials;
use crate::error::{BridgeError, Result};

const CATALOGS_PATH: &str = "/api/2.1/unity-catalog/catalogs";
const SCHEMAS_PATH: &str = "/api/2.1/unity-catalog/schemas";
const TABLES_PATH: &str = "/api/2.1/unity-catalog/tables";

/// Timeout for each metadata request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on pages fetched for a single listing.
const MAX_PAGES: usize = 1000;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub catalog_type: Option<String>,
}

/// A schema entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub catalog_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub table_type: Option<String>,
    #[serde(default)]
    pub data_source_format: Option<String>,
}

/// Entries that carry a sortable name.
trait Named {
    fn name(&self) -> &str;
}

impl Named for CatalogInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for SchemaInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for TableInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Read-only view over a workspace's Unity Catalog.
#[derive(Debug)]
pub struct MetadataBrowser<T> {
    transport: T,
    timeout: Duration,
}

impl<T: WorkspaceTransport> MetadataBrowser<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lists all catalogs visible to the caller.
    pub async fn list_catalogs(&self, credentials: &Credentials) -> Result<Vec<CatalogInfo>> {
        self.list(credentials, CATALOGS_PATH, &[], "catalogs").await
    }

    /// Lists the schemas of a catalog.
    pub async fn list_schemas(
        &self,
        credentials: &Credentials,
        catalog: &str,
    ) -> Result<Vec<SchemaInfo>> {
        let catalog = required("catalog", catalog)?;
        self.list(credentials, SCHEMAS_PATH, &[("catalog_name", catalog)], "schemas")
            .await
    }

    /// Lists the tables of a schema.
    pub async fn list_tables(
        &self,
        credentials: &Credentials,
        catalog: &str,
        schema: &str,
    ) -> Result<Vec<TableInfo>> {
        let catalog = required("catalog", catalog)?;
        let schema = required("schema", schema)?;
        self.list(
            credentials,
            TABLES_PATH,
            &[("catalog_name", catalog), ("schema_name", schema)],
            "tables",
        )
        .await
    }

    /// Returns the full table description as returned by the workspace.
    pub async fn describe_table(
        &self,
        credentials: &Credentials,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> Result<Value> {
        let full_name = format!(
            "{}.{}.{}",
            required("catalog", catalog)?,
            required("schema", schema)?,
            required("table", table)?
        );
        let path = format!("{}/{}", TABLES_PATH, full_name);
        self.transport
            .get(credentials, &path, &[], self.timeout)
            .await
    }

    /// Fetches every page of a listing and projects the entries under `key`.
    async fn list<E>(
        &self,
        credentials: &Credentials,
        path: &str,
        params: &[(&str, &str)],
        key: &str,
    ) -> Result<Vec<E>>
    where
        E: DeserializeOwned + Named,
    {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let mut query = params.to_vec();
            if let Some(token) = page_token.as_deref() {
                query.push(("page_token", token));
            }

            let body = self
                .transport
                .get(credentials, path, &query, self.timeout)
                .await?;
            entries.extend(project::<E>(&body, key));

            page_token = body
                .get("next_page_token")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(String::from);

            debug!("{} page {}: {} entries so far", key, page, entries.len());
            if page_token.is_none() {
                break;
            }
            if page == MAX_PAGES {
                warn!("Stopping {} listing after {} pages", key, MAX_PAGES);
            }
        }

        entries.sort_by(|a: &E, b: &E| a.name().cmp(b.name()));
        Ok(entries)
    }
}

/// Projects the array under `key` onto entries, dropping unnamed or
/// malformed items.
fn project<E>(body: &Value, key: &str) -> Vec<E>
where
    E: DeserializeOwned + Named,
{
    body.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<E>(item.clone()).ok())
                .filter(|entry| !entry.name().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn required<'a>(kind: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BridgeError::config(format!("{} name must not be empty", kind)));
    }
    Ok(value)
}
