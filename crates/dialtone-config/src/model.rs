// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Dialtone report-delivery engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Dialtone configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialtoneConfig {
    /// Delivery timings and the master kill-switch.
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Collector endpoints, one per category.
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Identity stamped into every report envelope.
    #[serde(default)]
    pub app: AppConfig,

    /// Store keys and envelope reasons per category.
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Delivery engine and scheduler timings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportingConfig {
    /// Master kill-switch. When `false` every engine operation is a no-op.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Per-request network timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Spacing between successive dispatch starts within one pass, in milliseconds.
    #[serde(default = "default_throttle_delay_ms")]
    pub throttle_delay_ms: u64,

    /// Wait before retrying the undelivered remainder of a pass, in seconds.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Cadence of periodic reports, in seconds.
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,

    /// Slack added to every periodic timer, in seconds.
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,
}

impl ReportingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            request_timeout_ms: default_request_timeout_ms(),
            throttle_delay_ms: default_throttle_delay_ms(),
            retry_backoff_secs: default_retry_backoff_secs(),
            report_interval_secs: default_report_interval_secs(),
            safety_margin_secs: default_safety_margin_secs(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    3_000
}

fn default_throttle_delay_ms() -> u64 {
    500
}

fn default_retry_backoff_secs() -> u64 {
    300
}

fn default_report_interval_secs() -> u64 {
    86_400
}

fn default_safety_margin_secs() -> u64 {
    30
}

/// Collector endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    /// Endpoint that receives queued feedback reports.
    #[serde(default = "default_feedback_url")]
    pub feedback_url: String,

    /// Base URL for periodic URL-usage submissions.
    #[serde(default = "default_url_usage_url")]
    pub url_usage_url: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            feedback_url: default_feedback_url(),
            url_usage_url: default_url_usage_url(),
        }
    }
}

fn default_feedback_url() -> String {
    "https://input.dialtone.invalid/api/v1/feedback".to_string()
}

fn default_url_usage_url() -> String {
    "https://telemetry.dialtone.invalid/submit/telemetry".to_string()
}

/// Application identity stamped into report envelopes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,

    /// Release channel (e.g. `release`, `beta`, `nightly`).
    #[serde(default = "default_update_channel")]
    pub update_channel: String,

    #[serde(default = "default_build_id")]
    pub build_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            update_channel: default_update_channel(),
            build_id: default_build_id(),
        }
    }
}

fn default_app_name() -> String {
    "dialtone".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_update_channel() -> String {
    "release".to_string()
}

fn default_build_id() -> String {
    "unknown".to_string()
}

/// Store keys and envelope reasons for the two report categories.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelsConfig {
    #[serde(default = "default_feedback_key")]
    pub feedback_key: String,

    #[serde(default = "default_url_usage_key")]
    pub url_usage_key: String,

    #[serde(default = "default_feedback_reason")]
    pub feedback_reason: String,

    #[serde(default = "default_url_usage_reason")]
    pub url_usage_reason: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            feedback_key: default_feedback_key(),
            url_usage_key: default_url_usage_key(),
            feedback_reason: default_feedback_reason(),
            url_usage_reason: default_url_usage_reason(),
        }
    }
}

fn default_feedback_key() -> String {
    "feedback".to_string()
}

fn default_url_usage_key() -> String {
    "telemetry-urls".to_string()
}

fn default_feedback_reason() -> String {
    "feedback".to_string()
}

fn default_url_usage_reason() -> String {
    "daily".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("dialtone").join("reports.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "reports.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
