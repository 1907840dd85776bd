//! Command dispatch for dbx-bridge.
//!
//! Resolves configuration and credentials for a parsed [`Cli`] and runs the
//! requested command against a [`WorkspaceTransport`].

use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::client::{HttpTransport, WorkspaceTransport};
use crate::config::Config;
use crate::credentials::{self, Credentials};
use crate::error::{BridgeError, Result};
use crate::metadata::MetadataBrowser;
use crate::statement::{ExecutorConfig, SampleQuery, StatementExecutor};

/// Runs the CLI command over HTTPS and returns the JSON document to print.
pub async fn run(cli: &Cli) -> Result<Value> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config =
        Config::load_from_file(&config_path)?.with_databrickscfg(&Config::databrickscfg_path())?;

    run_with(cli, &config, HttpTransport::new()?).await
}

/// Runs the CLI command against the given transport.
pub async fn run_with<T: WorkspaceTransport>(
    cli: &Cli,
    config: &Config,
    transport: T,
) -> Result<Value> {
    let profile = config.profile(cli.profile_name())?;
    let credentials = credentials::resolve(cli.host.as_deref(), cli.token.as_deref(), profile)?;
    info!("Workspace: {}", credentials.host);

    match &cli.command {
        Command::Catalogs => {
            let browser = MetadataBrowser::new(transport);
            to_json(browser.list_catalogs(&credentials).await?)
        }
        Command::Schemas { catalog } => {
            let browser = MetadataBrowser::new(transport);
            to_json(browser.list_schemas(&credentials, catalog).await?)
        }
        Command::Tables { catalog, schema } => {
            let browser = MetadataBrowser::new(transport);
            to_json(browser.list_tables(&credentials, catalog, schema).await?)
        }
        Command::Describe(table) => {
            let browser = MetadataBrowser::new(transport);
            browser
                .describe_table(&credentials, &table.catalog, &table.schema, &table.table)
                .await
        }
        Command::Sample {
            table,
            limit,
            warehouse_id,
        } => {
            let warehouse_id = warehouse_id
                .as_deref()
                .filter(|w| !w.trim().is_empty())
                .or_else(|| profile.and_then(|p| p.warehouse_id()))
                .unwrap_or_default();
            let query = SampleQuery::new(&table.catalog, &table.schema, &table.table, *limit);
            sample(transport, config, &query, warehouse_id, &credentials).await
        }
    }
}

async fn sample<T: WorkspaceTransport>(
    transport: T,
    config: &Config,
    query: &SampleQuery,
    warehouse_id: &str,
    credentials: &Credentials,
) -> Result<Value> {
    let executor =
        StatementExecutor::with_config(transport, ExecutorConfig::from(&config.executor));
    let result = executor.execute(query, warehouse_id, credentials).await?;
    to_json(result)
}

fn to_json<S: serde::Serialize>(value: S) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| BridgeError::protocol(format!("Failed to encode output: {}", e)))
}
