// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for posting encoded reports to a collector.

use async_trait::async_trait;

use crate::error::DialtoneError;
use crate::traits::adapter::PluginAdapter;

/// Adapter that issues a timed HTTP POST with a JSON body.
///
/// Implementations return the raw status code of any response they receive;
/// classifying it as delivered or failed is the engine's job. Network-level
/// failures map to [`DialtoneError::Timeout`] or [`DialtoneError::Transport`].
#[async_trait]
pub trait ReportTransport: PluginAdapter {
    /// POST `body` (already JSON-encoded) to `url`. Returns the HTTP status.
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<u16, DialtoneError>;
}
