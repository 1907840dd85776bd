//! Logging configuration for dbx-bridge.
//!
//! Stdout carries the JSON document consumed by callers, so every log line
//! goes to stderr.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "warn";

/// Initializes logging to stderr.
///
/// Honours `RUST_LOG`; falls back to `warn` so a normal run prints nothing
/// besides the JSON result.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Builds the env filter from `RUST_LOG`, or the default level.
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
