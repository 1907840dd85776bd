//! Error types for dbx-bridge.
//!
//! Defines the main error enum used throughout the bridge.

use thiserror::Error;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration errors (missing credentials, warehouse id, unknown profile, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport errors (connection refused, timeouts, non-2xx responses, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol errors (response body with an unexpected shape)
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl BridgeError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a protocol error with the given message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration Error",
            Self::Transport(_) => "Transport Error",
            Self::Protocol(_) => "Protocol Error",
        }
    }

    /// Returns the machine-readable error kind used in JSON payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
        }
    }
}

/// Result type alias using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;
