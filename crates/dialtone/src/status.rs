// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dialtone status` command implementation.
//!
//! Reads the persisted queues and watermark and prints them. Transmission
//! state (generation, in-flight requests, pending retry) only reflects this
//! process, so it is always idle here; a running `serve` keeps its own.

use std::io::IsTerminal;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dialtone_config::DialtoneConfig;
use dialtone_core::{DialtoneError, SystemClock};
use dialtone_metrics::ChannelStatus;
use serde::Serialize;

use crate::commands::open_reporter;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub enabled: bool,
    pub database_path: String,
    pub channels: Vec<ChannelStatus>,
}

/// Run the `dialtone status` command.
///
/// `--json` prints structured output for scripting. `--plain`, or a stdout
/// that is not a TTY, disables colors.
pub async fn run_status(config: &DialtoneConfig, json: bool, plain: bool) -> Result<(), DialtoneError> {
    let reporter = open_reporter(config).await?;
    let channels = reporter.status(Arc::new(SystemClock)).await?;
    reporter.shutdown().await?;

    let response = StatusResponse {
        enabled: config.reporting.enabled,
        database_path: config.storage.database_path.clone(),
        channels,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }
    Ok(())
}

fn print_status(response: &StatusResponse, use_color: bool) {
    println!();
    println!("  dialtone status");
    println!("  {}", "-".repeat(35));

    let state = if response.enabled { "enabled" } else { "disabled" };
    if use_color {
        use colored::Colorize;
        let state = if response.enabled {
            state.green()
        } else {
            state.yellow()
        };
        println!("    Reporting: {state}");
    } else {
        println!("    Reporting: {state}");
    }
    println!("    Database:  {}", response.database_path);

    for channel in &response.channels {
        println!();
        println!("    [{}]", channel.key);
        println!("      Collector: {}", channel.collector_url);
        println!("      Pending:   {}", pending_label(channel.pending, use_color));
        if let Some(watermark) = channel.watermark {
            println!("      Last sent: {}", format_watermark(watermark));
        }
    }
    println!();
}

fn pending_label(pending: usize, use_color: bool) -> String {
    let label = match pending {
        0 => "none".to_string(),
        1 => "1 report".to_string(),
        n => format!("{n} reports"),
    };
    if !use_color {
        return label;
    }
    use colored::Colorize;
    if pending == 0 {
        label.green().to_string()
    } else {
        label.yellow().to_string()
    }
}

fn format_watermark(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(key: &str, pending: usize, watermark: Option<DateTime<Utc>>) -> ChannelStatus {
        ChannelStatus {
            key: key.to_string(),
            collector_url: "https://collector.example".to_string(),
            enabled: true,
            pending,
            generation: 0,
            in_flight: 0,
            retry_pending: false,
            watermark,
        }
    }

    #[test]
    fn pending_label_pluralizes() {
        assert_eq!(pending_label(0, false), "none");
        assert_eq!(pending_label(1, false), "1 report");
        assert_eq!(pending_label(4, false), "4 reports");
    }

    #[test]
    fn watermark_formats_in_utc() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T12:30:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_watermark(at), "2026-03-01 12:30:05 UTC");
    }

    #[test]
    fn status_response_serializes() {
        let response = StatusResponse {
            enabled: true,
            database_path: "/tmp/reports.db".to_string(),
            channels: vec![channel("feedback", 2, None), channel("telemetry-urls", 1, None)],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["enabled"], true);
        assert_eq!(json["channels"][0]["pending"], 2);
        assert_eq!(json["channels"][1]["key"], "telemetry-urls");
        assert!(json["channels"][1].get("watermark").is_none());
    }
}
