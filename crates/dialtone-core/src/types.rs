// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the delivery engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// HTTP status codes the collector may answer with for a delivered report.
pub const ACCEPTED_STATUS_CODES: [u16; 4] = [200, 201, 204, 302];

/// Returns `true` if the collector status confirms delivery.
pub fn is_accepted_status(status: u16) -> bool {
    ACCEPTED_STATUS_CODES.contains(&status)
}

/// Store key of a report category (e.g. `"feedback"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey(pub String);

impl ChannelKey {
    /// Key under which the periodic-report watermark of this category lives.
    pub fn watermark_key(&self) -> String {
        format!("{}.watermark", self.0)
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter plugged into the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Transport,
}
