//! Mock workspace transport for testing.
//!
//! Replies are scripted per method and path. The last reply scripted for a
//! path keeps being returned once the earlier ones are used up, so a single
//! `on_get` covers any number of polls.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{Method, WorkspaceTransport};
use crate::credentials::Credentials;
use crate::error::{BridgeError, Result};

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Fail(String),
}

/// A transport that returns predefined replies and records every call.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Creates a mock with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON reply for `GET path`.
    pub fn on_get(self, path: impl Into<String>, reply: Value) -> Self {
        self.push(Method::Get, path.into(), Reply::Json(reply))
    }

    /// Queues a JSON reply for `POST path`.
    pub fn on_post(self, path: impl Into<String>, reply: Value) -> Self {
        self.push(Method::Post, path.into(), Reply::Json(reply))
    }

    /// Queues a transport failure for `GET path`.
    pub fn fail_get(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(Method::Get, path.into(), Reply::Fail(message.into()))
    }

    /// Queues a transport failure for `POST path`.
    pub fn fail_post(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(Method::Post, path.into(), Reply::Fail(message.into()))
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Returns the total number of calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns the number of calls made with the given method.
    pub fn count(&self, method: Method) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    fn push(self, method: Method, path: String, reply: Reply) -> Self {
        lock(&self.replies)
            .entry((method, path))
            .or_default()
            .push_back(reply);
        self
    }

    fn reply(&self, call: RecordedCall) -> Result<Value> {
        let key = (call.method, call.path.clone());
        lock(&self.calls).push(call);

        let mut replies = lock(&self.replies);
        let queue = replies.get_mut(&key).ok_or_else(|| {
            BridgeError::transport(format!("No mock reply for {} {}", key.0, key.1))
        })?;

        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Fail(message)) => Err(BridgeError::transport(message)),
            None => Err(BridgeError::transport(format!(
                "No mock reply for {} {}",
                key.0, key.1
            ))),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl WorkspaceTransport for MockTransport {
    async fn get(
        &self,
        _credentials: &Credentials,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Value> {
        self.reply(RecordedCall {
            method: Method::Get,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
            timeout,
        })
    }

    async fn post(
        &self,
        _credentials: &Credentials,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value> {
        self.reply(RecordedCall {
            method: Method::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
            timeout,
        })
    }
}
