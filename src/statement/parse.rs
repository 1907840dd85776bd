//! Tolerant parsing of Statement Execution API responses.
//!
//! The same endpoint returns inline results, pending statements, and error
//! envelopes of varying shape. Everything here is pure: absent or malformed
//! optional fields degrade to empty values, and only a body that is not a
//! JSON object is rejected.

use serde_json::{Map, Value};
use tracing::warn;

use super::{StatementResult, StatementState};
use crate::error::{BridgeError, Result};

/// Fields needed to drive the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFields {
    pub state: StatementState,
    pub statement_id: Option<String>,
}

/// Extracts `status.state` and `statement_id` from a response body.
pub fn parse_status(raw: &Value) -> Result<StatusFields> {
    let body = as_object(raw)?;

    let state = body
        .get("status")
        .and_then(|status| status.get("state"))
        .and_then(Value::as_str)
        .map(StatementState::parse)
        .unwrap_or(StatementState::Unknown);

    let statement_id = body
        .get("statement_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .filter(|id| {
            let safe = is_safe_statement_id(id);
            if !safe {
                warn!("Ignoring statement_id {:?}: not a single path segment", id);
            }
            safe
        })
        .map(String::from);

    Ok(StatusFields {
        state,
        statement_id,
    })
}

/// Normalizes a response body into a [`StatementResult`].
pub fn parse_response(raw: &Value, statement: &str) -> Result<StatementResult> {
    let body = as_object(raw)?;
    let state = parse_status(raw)?.state;

    if state != StatementState::Succeeded {
        return Ok(StatementResult::failed(
            state,
            statement,
            error_payload(body, raw),
        ));
    }

    let result = body.get("result");
    let manifest = body
        .get("manifest")
        .filter(|m| !m.is_null())
        .or_else(|| result.and_then(|r| r.get("manifest")));

    Ok(StatementResult::succeeded(
        statement,
        columns(manifest),
        rows(result),
    ))
}

/// Picks the error payload: `status.error`, then top-level `error`, then the
/// whole body.
fn error_payload(body: &Map<String, Value>, raw: &Value) -> Value {
    body.get("status")
        .and_then(|status| status.get("error"))
        .filter(|e| !e.is_null())
        .or_else(|| body.get("error").filter(|e| !e.is_null()))
        .unwrap_or(raw)
        .clone()
}

fn columns(manifest: Option<&Value>) -> Vec<String> {
    manifest
        .and_then(|m| m.get("schema"))
        .and_then(|s| s.get("columns"))
        .and_then(Value::as_array)
        .map(|columns| {
            columns
                .iter()
                .filter_map(Value::as_object)
                .map(|column| {
                    column
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Statement ids are interpolated into the poll path, so they must stay one
/// plain segment.
fn is_safe_statement_id(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn rows(result: Option<&Value>) -> Vec<Vec<Value>> {
    let Some(data) = result
        .and_then(|r| r.get("data_array"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let rows: Vec<Vec<Value>> = data
        .iter()
        .filter_map(Value::as_array)
        .map(|row| row.to_vec())
        .collect();
    if rows.len() != data.len() {
        warn!(
            "Dropped {} of {} rows in data_array that are not arrays",
            data.len() - rows.len(),
            data.len()
        );
    }
    rows
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        BridgeError::protocol(format!(
            "expected a JSON object, got {}",
            json_kind(raw)
        ))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
