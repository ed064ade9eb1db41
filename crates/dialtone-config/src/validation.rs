// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as parseable collector URLs, positive timings, and distinct store keys.

use crate::diagnostic::ConfigError;
use crate::model::DialtoneConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DialtoneConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    for (name, value) in [
        ("collector.feedback_url", &config.collector.feedback_url),
        ("collector.url_usage_url", &config.collector.url_usage_url),
    ] {
        if let Some(message) = check_http_url(name, value) {
            errors.push(ConfigError::Validation { message });
        }
    }

    let reporting = &config.reporting;
    for (name, value) in [
        ("reporting.request_timeout_ms", reporting.request_timeout_ms),
        ("reporting.retry_backoff_secs", reporting.retry_backoff_secs),
        ("reporting.report_interval_secs", reporting.report_interval_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be greater than zero"),
            });
        }
    }

    // The backoff must dominate the intra-pass throttle, otherwise retries
    // would pile up faster than a single pass can dispatch.
    if reporting.retry_backoff().as_millis() <= u128::from(reporting.throttle_delay_ms) {
        errors.push(ConfigError::Validation {
            message: format!(
                "reporting.retry_backoff_secs ({}s) must be longer than reporting.throttle_delay_ms ({}ms)",
                reporting.retry_backoff_secs, reporting.throttle_delay_ms
            ),
        });
    }

    let channels = &config.channels;
    for (name, value) in [
        ("channels.feedback_key", &channels.feedback_key),
        ("channels.url_usage_key", &channels.url_usage_key),
        ("channels.feedback_reason", &channels.feedback_reason),
        ("channels.url_usage_reason", &channels.url_usage_reason),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{name} must not be empty"),
            });
        }
    }

    if channels.feedback_key == channels.url_usage_key {
        errors.push(ConfigError::Validation {
            message: format!(
                "channels.feedback_key and channels.url_usage_key must differ, both are `{}`",
                channels.feedback_key
            ),
        });
    }

    // Watermarks live under "<key>.watermark"; a channel key must not collide with one.
    for key in [&channels.feedback_key, &channels.url_usage_key] {
        if key.ends_with(".watermark") {
            errors.push(ConfigError::Validation {
                message: format!("channel key `{key}` must not end with `.watermark`"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(name: &str, value: &str) -> Option<String> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(parsed) => Some(format!(
            "{name} must use http or https, got scheme `{}`",
            parsed.scheme()
        )),
        Err(e) => Some(format!("{name} `{value}` is not a valid URL: {e}")),
    }
}
