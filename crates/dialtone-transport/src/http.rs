// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest-backed [`ReportTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use dialtone_core::{AdapterType, DialtoneError, HealthStatus, PluginAdapter, ReportTransport};

/// Posts JSON bodies with a fixed request timeout.
///
/// Redirects are not followed: collectors answer 302 to acknowledge a
/// submission, and the engine needs to see that status as-is.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, DialtoneError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("dialtone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DialtoneError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PluginAdapter for HttpTransport {
    fn name(&self) -> &str {
        "http"
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
impl ReportTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<u16, DialtoneError> {
        let bytes = body.len();
        let response = self
            .client
            .post(url)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DialtoneError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    DialtoneError::Transport {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status().as_u16();
        debug!(url, bytes, status, "report posted");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_timeout() {
        let transport = HttpTransport::new(Duration::from_millis(3000)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_millis(3000));
        assert_eq!(transport.name(), "http");
        assert_eq!(transport.adapter_type(), AdapterType::Transport);
    }
}
