// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dialtone.toml` > `~/.config/dialtone/dialtone.toml` > `/etc/dialtone/dialtone.toml`
//! with environment variable overrides via `DIALTONE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DialtoneConfig;

/// Config sections, in the order their env prefixes are matched.
const SECTIONS: [&str; 6] = [
    "reporting",
    "collector",
    "app",
    "channels",
    "storage",
    "logging",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dialtone/dialtone.toml` (system-wide)
/// 3. `~/.config/dialtone/dialtone.toml` (user XDG config)
/// 4. `./dialtone.toml` (local directory)
/// 5. `DIALTONE_*` environment variables
pub fn load_config() -> Result<DialtoneConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DialtoneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DialtoneConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DialtoneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DialtoneConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DialtoneConfig::default()))
        .merge(Toml::file("/etc/dialtone/dialtone.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dialtone/dialtone.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dialtone.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")`: keys such as
/// `retry_backoff_secs` contain underscores, so only the first segment
/// that names a section becomes a dot. `DIALTONE_REPORTING_RETRY_BACKOFF_SECS`
/// maps to `reporting.retry_backoff_secs`.
fn env_provider() -> Env {
    Env::prefixed("DIALTONE_").map(|key| map_env_key(key.as_str()).into())
}

/// Turn a lowercased, prefix-stripped env key into a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
