//! JSON output for the CLI.
//!
//! Every invocation prints exactly one JSON document on stdout: the command
//! result on success, or an error payload on failure.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{BridgeError, Result};

/// Serializes a command result as a single-line JSON document.
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| BridgeError::protocol(format!("Failed to encode output: {}", e)))
}

/// Builds the payload printed when a command fails.
pub fn error_document(err: &BridgeError) -> Value {
    let message = match err {
        BridgeError::Configuration(msg)
        | BridgeError::Transport(msg)
        | BridgeError::Protocol(msg) => msg.as_str(),
    };
    json!({
        "error": message,
        "category": err.kind(),
    })
}
