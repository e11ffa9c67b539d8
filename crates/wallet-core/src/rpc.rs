//! JSON-RPC 2.0 transport seam.
//!
//! Chain strategies talk to their node only through [`RpcTransport`]. The
//! HTTP implementation is used in production. With the `test-util` feature,
//! `MockTransport` scripts node responses for tests.

#[cfg(any(test, feature = "test-util"))]
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(any(test, feature = "test-util"))]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-util"))]
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ChainConfig;
use crate::error::WalletError;

/// One JSON-RPC request, one response. No retries.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Returns the `result` member on success. A node `error` member maps to
    /// `RpcRejected`; anything that prevents a well-formed response maps to
    /// `NetworkFailure`.
    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError>;
}

/// JSON-RPC over HTTP(S) with a per-request timeout.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: &ChainConfig) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, endpoint = %self.endpoint, "rpc request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::NetworkFailure(format!("{method}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WalletError::NetworkFailure(format!("{method}: {e}")))?;

        // Nodes often return JSON-RPC errors with non-2xx codes; prefer the
        // JSON error when the body has one.
        match serde_json::from_str::<Value>(&text) {
            Ok(envelope) => parse_response(method, envelope),
            Err(_) if !status.is_success() => Err(WalletError::NetworkFailure(format!(
                "{method}: HTTP {status}: {text}"
            ))),
            Err(e) => Err(WalletError::NetworkFailure(format!(
                "{method}: invalid JSON response: {e}"
            ))),
        }
    }
}

/// Extract `result` from a JSON-RPC response envelope.
pub fn parse_response(method: &str, mut envelope: Value) -> Result<Value, WalletError> {
    if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(WalletError::RpcRejected { code, message });
    }

    match envelope.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(WalletError::NetworkFailure(format!(
            "{method}: response has neither result nor error"
        ))),
    }
}

/// Scripted reply for one method.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone)]
pub enum MockReply {
    Result(Value),
    Rejected { code: i64, message: String },
    NetworkFailure(String),
}

/// In-memory node for tests: every method answers with its scripted reply
/// and every call is recorded.
///
/// A reply scripted for an exact `(method, params)` pair wins over the
/// method-wide reply.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, MockReply>>,
    exact: Mutex<Vec<(String, Value, MockReply)>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, Value)>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` with `result`.
    pub fn respond(&self, method: &str, result: Value) -> &Self {
        self.replies
            .lock()
            .insert(method.to_string(), MockReply::Result(result));
        self
    }

    /// Answer `method` with a JSON-RPC error.
    pub fn reject(&self, method: &str, code: i64, message: &str) -> &Self {
        self.replies.lock().insert(
            method.to_string(),
            MockReply::Rejected {
                code,
                message: message.to_string(),
            },
        );
        self
    }

    /// Fail `method` as if the connection dropped.
    pub fn fail(&self, method: &str, message: &str) -> &Self {
        self.replies.lock().insert(
            method.to_string(),
            MockReply::NetworkFailure(message.to_string()),
        );
        self
    }

    /// Answer `method` with `result`, but only when called with `params`.
    pub fn respond_when(&self, method: &str, params: Value, result: Value) -> &Self {
        self.script_exact(method, params, MockReply::Result(result))
    }

    /// Fail `method` with a network error, but only when called with `params`.
    pub fn fail_when(&self, method: &str, params: Value, message: &str) -> &Self {
        self.script_exact(method, params, MockReply::NetworkFailure(message.to_string()))
    }

    /// Hold every answer to `method` for `latency`.
    pub fn delay(&self, method: &str, latency: Duration) -> &Self {
        self.delays.lock().insert(method.to_string(), latency);
        self
    }

    fn script_exact(&self, method: &str, params: Value, reply: MockReply) -> &Self {
        let mut exact = self.exact.lock();
        exact.retain(|(m, p, _)| !(m == method && *p == params));
        exact.push((method.to_string(), params, reply));
        drop(exact);
        self
    }

    fn reply_for(&self, method: &str, params: &Value) -> Option<MockReply> {
        let exact = self
            .exact
            .lock()
            .iter()
            .find(|(m, p, _)| m == method && p == params)
            .map(|(_, _, reply)| reply.clone());
        exact.or_else(|| self.replies.lock().get(method).cloned())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn methods_called(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let reply = self.reply_for(method, &params);
        self.calls.lock().push((method.to_string(), params));

        let latency = self.delays.lock().get(method).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(MockReply::Result(value)) => Ok(value),
            Some(MockReply::Rejected { code, message }) => {
                Err(WalletError::RpcRejected { code, message })
            }
            Some(MockReply::NetworkFailure(message)) => Err(WalletError::NetworkFailure(message)),
            None => Err(WalletError::NetworkFailure(format!(
                "no scripted reply for {method}"
            ))),
        }
    }
}
