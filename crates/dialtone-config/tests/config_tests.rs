// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Dialtone configuration system.

use std::path::Path;

use dialtone_config::diagnostic::{ConfigError, suggest_key};
use dialtone_config::model::DialtoneConfig;
use dialtone_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_dialtone_config() {
    let toml = r#"
[reporting]
enabled = false
request_timeout_ms = 2500
throttle_delay_ms = 250
retry_backoff_secs = 120
report_interval_secs = 3600
safety_margin_secs = 10

[collector]
feedback_url = "https://collector.example/feedback"
url_usage_url = "https://collector.example/submit"

[app]
name = "ringer"
version = "2.1.0"
update_channel = "beta"
build_id = "20260301120000"

[channels]
feedback_key = "fb"
url_usage_key = "urls"
feedback_reason = "user-sent"
url_usage_reason = "daily"

[storage]
database_path = "/tmp/reports.db"
wal_mode = false

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert!(!config.reporting.enabled);
    assert_eq!(config.reporting.request_timeout_ms, 2500);
    assert_eq!(config.reporting.throttle_delay_ms, 250);
    assert_eq!(config.reporting.retry_backoff_secs, 120);
    assert_eq!(config.reporting.report_interval_secs, 3600);
    assert_eq!(config.reporting.safety_margin_secs, 10);
    assert_eq!(config.collector.feedback_url, "https://collector.example/feedback");
    assert_eq!(config.collector.url_usage_url, "https://collector.example/submit");
    assert_eq!(config.app.name, "ringer");
    assert_eq!(config.app.update_channel, "beta");
    assert_eq!(config.channels.feedback_key, "fb");
    assert_eq!(config.channels.feedback_reason, "user-sent");
    assert_eq!(config.storage.database_path, "/tmp/reports.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.logging.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert!(config.reporting.enabled);
    assert_eq!(config.reporting.request_timeout_ms, 3000);
    assert_eq!(config.reporting.retry_backoff_secs, 300);
    assert_eq!(config.reporting.report_interval_secs, 86_400);
    assert_eq!(config.channels.feedback_key, "feedback");
    assert_eq!(config.channels.url_usage_key, "telemetry-urls");
    assert_eq!(config.app.name, "dialtone");
    assert_eq!(config.logging.level, "info");
}

/// Unknown field in [collector] is rejected.
#[test]
fn unknown_field_in_collector_produces_error() {
    let toml = r#"
[collector]
feedbak_url = "https://collector.example"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("feedbak_url"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[metrics]
port = 9090
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("metrics"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// `DIALTONE_*` environment variables override file values, underscores intact.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "dialtone.toml",
            r#"
[reporting]
retry_backoff_secs = 60

[app]
update_channel = "nightly"
"#,
        )?;
        jail.set_env("DIALTONE_REPORTING_RETRY_BACKOFF_SECS", "900");
        jail.set_env("DIALTONE_REPORTING_ENABLED", "false");
        jail.set_env("DIALTONE_COLLECTOR_FEEDBACK_URL", "https://env.example/fb");

        let config = load_config_from_path(Path::new("dialtone.toml"))?;
        assert_eq!(config.reporting.retry_backoff_secs, 900);
        assert!(!config.reporting.enabled);
        assert_eq!(config.collector.feedback_url, "https://env.example/fb");
        assert_eq!(config.app.update_channel, "nightly");
        Ok(())
    });
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_file_is_silently_skipped() {
    let config = load_config_from_path(Path::new("/nonexistent/path/dialtone.toml"))
        .expect("missing file should be silently skipped");
    assert_eq!(config.channels.feedback_key, "feedback");
}

/// Serialized defaults validate.
#[test]
fn serialized_defaults_validate() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert!(config.reporting.enabled);
    let _ = DialtoneConfig::default();
}

/// Unknown key `enabeld` in [reporting] suggests `enabled` and lists valid keys.
#[test]
fn diagnostic_unknown_key_suggests_and_lists_valid_keys() {
    let toml = r#"
[reporting]
enabeld = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "enabeld"
                && suggestion.as_deref() == Some("enabled")
                && valid_keys.contains("retry_backoff_secs")
        })
    });
    assert!(found, "expected UnknownKey for `enabeld`, got: {errors:?}");
}

/// Distant typos produce no suggestion.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    assert!(suggest_key("zzzzzz", &["enabled", "request_timeout_ms"]).is_none());
}

/// Invalid type (string where number expected) is reported.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[reporting]
throttle_delay_ms = "fast"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("throttle_delay_ms"))),
        "expected InvalidType for throttle_delay_ms, got: {errors:?}"
    );
}

/// Validation failures flow through `load_and_validate_str`.
#[test]
fn validation_catches_zero_interval() {
    let toml = r#"
[reporting]
report_interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero interval should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("report_interval_secs"))
    }));
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "enabeld".to_string(),
        suggestion: Some("enabled".to_string()),
        valid_keys: "enabled, request_timeout_ms".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `enabled`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("enabeld"));
}
