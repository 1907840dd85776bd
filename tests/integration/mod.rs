//! Integration tests for dbx-bridge.

pub mod app_test;
pub mod executor_test;
