//! Submit, poll, and normalize a sample statement.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::parse::{parse_response, parse_status};
use super::{
    SampleQuery, StatementRequest, StatementResult, StatementState, StatusFields, STATEMENTS_PATH,
};
use crate::client::WorkspaceTransport;
use crate::config::ExecutorSettings;
use crate::credentials::Credentials;
use crate::error::{BridgeError, Result};

/// Polling and timeout parameters for [`StatementExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Maximum number of status polls after submission.
    pub max_polls: u32,
    /// Fixed sleep before each poll.
    pub poll_interval: Duration,
    /// Timeout for the submit call.
    pub submit_timeout: Duration,
    /// Timeout for each poll call.
    pub poll_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from(&ExecutorSettings::default())
    }
}

impl From<&ExecutorSettings> for ExecutorConfig {
    fn from(settings: &ExecutorSettings) -> Self {
        Self {
            max_polls: settings.max_polls,
            poll_interval: settings.poll_interval(),
            submit_timeout: settings.submit_timeout(),
            poll_timeout: settings.poll_timeout(),
        }
    }
}

impl ExecutorConfig {
    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of polls.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }
}

/// Runs sample statements against a SQL warehouse.
///
/// One submit call, then up to `max_polls` sequential status polls at a fixed
/// interval. Running out of polls is not an error: the last observed state is
/// returned as a non-successful result.
#[derive(Debug)]
pub struct StatementExecutor<T> {
    transport: T,
    config: ExecutorConfig,
}

impl<T: WorkspaceTransport> StatementExecutor<T> {
    /// Creates an executor with the default polling parameters.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ExecutorConfig::default())
    }

    pub fn with_config(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executes `query` on `warehouse_id` and returns the normalized result.
    ///
    /// Fails with a configuration error before any network call when the
    /// warehouse id, credentials, or identifiers are missing.
    pub async fn execute(
        &self,
        query: &SampleQuery,
        warehouse_id: &str,
        credentials: &Credentials,
    ) -> Result<StatementResult> {
        let warehouse_id = warehouse_id.trim();
        if warehouse_id.is_empty() {
            return Err(BridgeError::config(
                "No SQL warehouse configured. Pass --warehouse-id or set warehouse_id in the profile.",
            ));
        }
        credentials.validate()?;
        let statement = query.statement()?;

        let request = StatementRequest::new(warehouse_id, statement.as_str());
        let body = serde_json::to_value(&request)
            .map_err(|e| BridgeError::protocol(format!("Failed to encode request: {}", e)))?;

        info!("Submitting statement to warehouse {}", warehouse_id);
        let mut raw = self
            .transport
            .post(credentials, STATEMENTS_PATH, &body, self.config.submit_timeout)
            .await?;
        let StatusFields {
            state,
            statement_id,
        } = observe(&raw);

        match statement_id {
            Some(id) if !state.is_terminal() => {
                raw = self.poll(credentials, &id, raw, state).await?;
            }
            None if !state.is_terminal() => {
                warn!("Statement is {} but no statement_id was returned", state);
            }
            _ => debug!("Statement finished on submit with state {}", state),
        }

        Ok(normalize(&raw, &statement))
    }

    /// Polls until a terminal state or the poll budget runs out.
    async fn poll(
        &self,
        credentials: &Credentials,
        statement_id: &str,
        mut raw: Value,
        mut state: StatementState,
    ) -> Result<Value> {
        let path = format!("{}/{}", STATEMENTS_PATH, statement_id);

        for attempt in 1..=self.config.max_polls {
            tokio::time::sleep(self.config.poll_interval).await;

            raw = self
                .transport
                .get(credentials, &path, &[], self.config.poll_timeout)
                .await?;
            state = observe(&raw).state;

            debug!(
                "Poll {}/{} for statement {}: {}",
                attempt, self.config.max_polls, statement_id, state
            );

            if state.is_terminal() {
                return Ok(raw);
            }
        }

        warn!(
            "Statement {} still {} after {} polls; returning last observed state",
            statement_id, state, self.config.max_polls
        );
        Ok(raw)
    }
}

/// Extracts the status fields, treating an unparseable body as `Unknown`.
fn observe(raw: &Value) -> StatusFields {
    parse_status(raw).unwrap_or_else(|e| {
        warn!("Unexpected statement response: {}", e);
        StatusFields {
            state: StatementState::Unknown,
            statement_id: None,
        }
    })
}

/// Normalizes the final body, degrading protocol errors to `Unknown`.
fn normalize(raw: &Value, statement: &str) -> StatementResult {
    parse_response(raw, statement).unwrap_or_else(|e| {
        warn!("Unexpected statement response: {}", e);
        StatementResult::failed(StatementState::Unknown, statement, raw.clone())
    })
}
