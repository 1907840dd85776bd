//! dbx-bridge - Databricks catalog metadata and SQL samples as JSON.
//!
//! The core is [`statement::StatementExecutor`], which submits a sample query
//! to a SQL warehouse, polls the Statement Execution API until the statement
//! is terminal, and normalizes the response into a
//! [`statement::StatementResult`].

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod statement;

pub use error::{BridgeError, Result};
