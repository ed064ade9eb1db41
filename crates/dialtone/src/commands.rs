// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `feedback`, `url-usage`, `flush` and `clear`.
//!
//! Each opens the store, does its work and closes the store again. A retry
//! armed by a failed delivery dies with the process; the report stays queued
//! and the next `flush` or `serve` picks it up.

use std::sync::Arc;

use dialtone_config::DialtoneConfig;
use dialtone_core::{DialtoneError, ReportStore, SystemClock};
use dialtone_metrics::{ChannelKind, FeedbackEvent, FireOutcome, PassSummary, Reporter};
use dialtone_storage::SqliteReportStore;
use dialtone_transport::{AlwaysOnline, HttpTransport};

/// Build a [`Reporter`] over the configured SQLite store and HTTP transport.
pub async fn open_reporter(config: &DialtoneConfig) -> Result<Reporter, DialtoneError> {
    let store = SqliteReportStore::new(config.storage.clone());
    store.initialize().await?;
    let transport = HttpTransport::new(config.reporting.request_timeout())?;
    Ok(Reporter::new(
        config.clone(),
        Arc::new(store),
        Arc::new(transport),
        Arc::new(AlwaysOnline),
    ))
}

pub async fn run_feedback(
    config: &DialtoneConfig,
    happy: bool,
    description: Vec<String>,
    url: Option<String>,
) -> Result<(), DialtoneError> {
    let reporter = open_reporter(config).await?;
    let summary = reporter
        .submit_feedback(FeedbackEvent {
            happy,
            description: description.into(),
            url,
        })
        .await?;
    println!("feedback recorded; {}", describe_pass(&summary));
    reporter.shutdown().await
}

pub async fn run_url_usage(config: &DialtoneConfig, counter: &str) -> Result<(), DialtoneError> {
    let reporter = open_reporter(config).await?;
    reporter.increment_url_counter(counter).await?;
    println!("url counter `{counter}` incremented");
    reporter.shutdown().await
}

pub async fn run_flush(config: &DialtoneConfig) -> Result<(), DialtoneError> {
    let reporter = open_reporter(config).await?;
    let outcome = reporter.flush_all(Arc::new(SystemClock)).await?;
    println!("feedback: {}", describe_pass(&outcome.feedback));
    let url_usage = match outcome.url_usage {
        FireOutcome::Sent(_) => "snapshot sent".to_string(),
        FireOutcome::Failed(summary) => format!("snapshot not delivered; {}", describe_pass(&summary)),
        FireOutcome::NothingToSend => "no snapshot pending".to_string(),
    };
    println!("url usage: {url_usage}");
    reporter.shutdown().await
}

pub async fn run_clear(config: &DialtoneConfig, kind: ChannelKind) -> Result<(), DialtoneError> {
    let reporter = open_reporter(config).await?;
    reporter.clear(kind).await?;
    println!("{kind} cleared");
    reporter.shutdown().await
}

fn describe_pass(summary: &PassSummary) -> String {
    if summary.attempted == 0 {
        return "nothing to deliver".to_string();
    }
    let mut line = format!(
        "{} of {} delivered, {} still queued",
        summary.delivered, summary.attempted, summary.queued
    );
    if summary.dropped > 0 {
        line.push_str(&format!(", {} dropped", summary.dropped));
    }
    if !summary.persisted {
        line.push_str(" (queue could not be updated)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pass_reads_as_nothing_to_deliver() {
        assert_eq!(describe_pass(&PassSummary::default()), "nothing to deliver");
    }

    #[test]
    fn partial_pass_lists_counts() {
        let summary = PassSummary {
            attempted: 3,
            delivered: 2,
            failed: 1,
            queued: 1,
            dropped: 0,
            persisted: true,
            ..PassSummary::default()
        };
        assert_eq!(describe_pass(&summary), "2 of 3 delivered, 1 still queued");
    }

    #[test]
    fn dropped_and_unpersisted_are_flagged() {
        let summary = PassSummary {
            attempted: 2,
            delivered: 1,
            dropped: 1,
            queued: 0,
            persisted: false,
            ..PassSummary::default()
        };
        assert_eq!(
            describe_pass(&summary),
            "1 of 2 delivered, 0 still queued, 1 dropped (queue could not be updated)"
        );
    }

    #[tokio::test]
    async fn clear_then_status_round_trip_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DialtoneConfig::default();
        config.storage.database_path = dir.path().join("reports.db").to_string_lossy().into_owned();

        run_url_usage(&config, "generated").await.unwrap();
        let reporter = open_reporter(&config).await.unwrap();
        assert!(reporter.url_usage().snapshot().await.unwrap().is_some());
        reporter.shutdown().await.unwrap();

        run_clear(&config, ChannelKind::UrlUsage).await.unwrap();
        let reporter = open_reporter(&config).await.unwrap();
        assert!(reporter.url_usage().snapshot().await.unwrap().is_none());
        reporter.shutdown().await.unwrap();
    }
}
