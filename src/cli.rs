//! Command-line argument parsing for dbx-bridge.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default number of rows fetched by `sample`.
pub const DEFAULT_SAMPLE_LIMIT: i64 = 20;

/// Query Databricks catalog metadata and sample tables, printing JSON.
#[derive(Parser, Debug)]
#[command(name = "dbx-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Profile name from the config file
    #[arg(long, global = true, value_name = "NAME", env = "DATABRICKS_CONFIG_PROFILE")]
    pub profile: Option<String>,

    /// Workspace host (e.g., https://adb-123.azuredatabricks.net)
    #[arg(long, global = true, value_name = "HOST", env = "DATABRICKS_HOST")]
    pub host: Option<String>,

    /// Personal access token
    #[arg(
        long,
        global = true,
        value_name = "TOKEN",
        env = "DATABRICKS_TOKEN",
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Config file path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Bridge subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List catalogs
    Catalogs,

    /// List schemas of a catalog
    Schemas {
        #[arg(long)]
        catalog: String,
    },

    /// List tables of a schema
    Tables {
        #[arg(long)]
        catalog: String,
        #[arg(long)]
        schema: String,
    },

    /// Describe a table
    Describe(TableArgs),

    /// Run `SELECT * ... LIMIT n` against a SQL warehouse
    Sample {
        #[command(flatten)]
        table: TableArgs,

        /// Number of rows (clamped to 1..=200)
        #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT, allow_negative_numbers = true)]
        limit: i64,

        /// SQL warehouse id
        #[arg(long, value_name = "ID", env = "DATABRICKS_WAREHOUSE_ID")]
        warehouse_id: Option<String>,
    },
}

/// A fully qualified table.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TableArgs {
    #[arg(long)]
    pub catalog: String,
    #[arg(long)]
    pub schema: String,
    #[arg(long)]
    pub table: String,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the named profile to use, if specified.
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}
