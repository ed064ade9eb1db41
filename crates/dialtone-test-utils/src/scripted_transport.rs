// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport double that replays scripted outcomes.
//!
//! Outcomes are popped from a FIFO queue in call order. When the queue is
//! empty the fallback outcome (HTTP 200 unless changed) is used. Every call
//! is captured with its tokio timestamp so tests can assert stagger spacing.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use dialtone_core::{AdapterType, DialtoneError, HealthStatus, PluginAdapter, ReportTransport};

/// One scripted transport outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedResponse {
    /// The collector answers with this status.
    Status(u16),
    /// The request times out.
    Timeout,
    /// The connection is reset.
    Reset,
    /// The task running the request panics.
    Panic,
}

/// A captured call.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub url: String,
    pub body: Value,
    pub at: Instant,
}

pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptedResponse>>,
    fallback: Mutex<ScriptedResponse>,
    latency: Duration,
    dispatches: Mutex<Vec<Dispatch>>,
}

impl ScriptedTransport {
    /// Transport answering 200 to everything.
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// Transport replaying `script`, then answering 200.
    pub fn with_script(script: Vec<ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            fallback: Mutex::new(ScriptedResponse::Status(200)),
            latency: Duration::ZERO,
            dispatches: Mutex::new(Vec::new()),
        }
    }

    /// Delay every response by `latency` (tokio time).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Append outcomes to the script.
    pub async fn push(&self, responses: impl IntoIterator<Item = ScriptedResponse>) {
        self.script.lock().await.extend(responses);
    }

    /// Change the outcome used once the script runs out.
    pub async fn set_fallback(&self, response: ScriptedResponse) {
        *self.fallback.lock().await = response;
    }

    /// Every call made so far, in call order.
    pub async fn dispatches(&self) -> Vec<Dispatch> {
        self.dispatches.lock().await.clone()
    }

    pub async fn dispatch_count(&self) -> usize {
        self.dispatches.lock().await.len()
    }

    async fn next_response(&self) -> ScriptedResponse {
        match self.script.lock().await.pop_front() {
            Some(response) => response,
            None => *self.fallback.lock().await,
        }
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, DialtoneError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DialtoneError> {
        Ok(())
    }
}

#[async_trait]
impl ReportTransport for ScriptedTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<u16, DialtoneError> {
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        self.dispatches.lock().await.push(Dispatch {
            url: url.to_string(),
            body,
            at: Instant::now(),
        });
        let response = self.next_response().await;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match response {
            ScriptedResponse::Status(status) => Ok(status),
            ScriptedResponse::Timeout => Err(DialtoneError::Timeout {
                duration: self.latency,
            }),
            ScriptedResponse::Reset => Err(DialtoneError::Transport {
                message: "connection reset by peer".to_string(),
                source: None,
            }),
            ScriptedResponse::Panic => panic!("scripted transport panic for {url}"),
        }
    }
}
