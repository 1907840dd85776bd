//! SQL Statement Execution API support.
//!
//! Submits a sample query to a SQL warehouse, polls until the statement
//! reaches a terminal state, and normalizes the response into a
//! [`StatementResult`].

mod executor;
mod parse;

pub use executor::{ExecutorConfig, StatementExecutor};
pub use parse::{parse_response, parse_status, StatusFields};

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::{BridgeError, Result};

/// Path of the statement submission endpoint.
pub const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";

/// Server-side wait before the submit call returns.
pub const WAIT_TIMEOUT: &str = "30s";

/// Results embedded in the response rather than fetched from external links.
pub const INLINE_DISPOSITION: &str = "INLINE";

/// Bounds applied to the sample row limit.
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 200;

/// Execution state reported by the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    /// Missing, empty, or unrecognized state.
    Unknown,
}

impl StatementState {
    /// Parses a state string case-insensitively. Unrecognized values map to
    /// `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELED" => Self::Canceled,
            "CLOSED" => Self::Closed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true once polling should stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Canceled | Self::Closed
        )
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StatementState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Request body for `POST /api/2.0/sql/statements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    pub wait_timeout: String,
    pub disposition: String,
}

impl StatementRequest {
    /// Creates an inline-disposition request with the fixed wait timeout.
    pub fn new(warehouse_id: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            warehouse_id: warehouse_id.into(),
            statement: statement.into(),
            wait_timeout: WAIT_TIMEOUT.to_string(),
            disposition: INLINE_DISPOSITION.to_string(),
        }
    }
}

/// A `SELECT *` sample of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleQuery {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub limit: i64,
}

impl SampleQuery {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
        limit: i64,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
            limit,
        }
    }

    /// Renders the SQL text, validating every identifier.
    pub fn statement(&self) -> Result<String> {
        let catalog = quote_identifier("catalog", &self.catalog)?;
        let schema = quote_identifier("schema", &self.schema)?;
        let table = quote_identifier("table", &self.table)?;
        Ok(format!(
            "SELECT * FROM {}.{}.{} LIMIT {}",
            catalog,
            schema,
            table,
            clamp_limit(self.limit)
        ))
    }
}

/// Clamps a requested row limit into `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Renders one identifier for interpolation.
///
/// Surrounding whitespace is trimmed. Plain names (ASCII alphanumerics and
/// `_`) pass through unchanged; anything else is backtick-quoted with embedded
/// backticks doubled.
pub fn quote_identifier(kind: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BridgeError::config(format!("{} name must not be empty", kind)));
    }

    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name.to_string())
    } else {
        Ok(format!("`{}`", name.replace('`', "``")))
    }
}

/// Normalized outcome of a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementResult {
    pub status: StatementState,
    pub statement: String,
    #[serde(flatten)]
    pub outcome: StatementOutcome,
}

/// Payload of a [`StatementResult`]: rows on success, an error otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatementOutcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        row_count: usize,
    },
    Failed {
        error: Value,
    },
}

impl StatementResult {
    /// Creates a successful result; `row_count` follows `rows`.
    pub fn succeeded(
        statement: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        let row_count = rows.len();
        Self {
            status: StatementState::Succeeded,
            statement: statement.into(),
            outcome: StatementOutcome::Rows {
                columns,
                rows,
                row_count,
            },
        }
    }

    /// Creates a non-successful result carrying an error payload.
    pub fn failed(status: StatementState, statement: impl Into<String>, error: Value) -> Self {
        Self {
            status,
            statement: statement.into(),
            outcome: StatementOutcome::Failed { error },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StatementState::Succeeded
    }

    pub fn columns(&self) -> &[String] {
        match &self.outcome {
            StatementOutcome::Rows { columns, .. } => columns,
            StatementOutcome::Failed { .. } => &[],
        }
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        match &self.outcome {
            StatementOutcome::Rows { rows, .. } => rows,
            StatementOutcome::Failed { .. } => &[],
        }
    }

    pub fn row_count(&self) -> usize {
        match &self.outcome {
            StatementOutcome::Rows { row_count, .. } => *row_count,
            StatementOutcome::Failed { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&Value> {
        match &self.outcome {
            StatementOutcome::Rows { .. } => None,
            StatementOutcome::Failed { error } => Some(error),
        }
    }
}
