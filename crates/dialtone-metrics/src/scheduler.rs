// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic report scheduler.
//!
//! Ships a channel's current snapshot roughly once per interval, measured
//! from a persisted watermark so the cadence survives restarts and long
//! power-offs. The loop re-arms after every fire and stops when its
//! shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use dialtone_config::model::ReportingConfig;
use dialtone_core::{Clock, DialtoneError, EnvelopeInfo, ReportSet};

use crate::channel::MetricChannel;
use crate::engine::{PassSummary, RetryPolicy, TransmissionEngine};

/// Time of the last confirmed periodic send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watermark {
    pub last_sent_timestamp: DateTime<Utc>,
}

/// What a single fire of the scheduler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The snapshot was delivered and the watermark advanced.
    Sent(PassSummary),
    /// The snapshot was dispatched but not fully delivered.
    Failed(PassSummary),
    /// There was no snapshot to send.
    NothingToSend,
}

/// Wait until the next periodic report is due.
///
/// `max(0, interval - max(0, now - watermark)) + margin`. A watermark in
/// the future (clock skew) counts as zero elapsed time.
pub fn compute_timeout(
    now: DateTime<Utc>,
    watermark: DateTime<Utc>,
    interval: Duration,
    margin: Duration,
) -> Duration {
    let elapsed = (now - watermark).to_std().unwrap_or(Duration::ZERO);
    interval.saturating_sub(elapsed) + margin
}

/// `{base}/{id}/{reason}/{appName}/{appVersion}/{updateChannel}/{buildId}`,
/// each segment percent-encoded.
pub fn build_report_url(base: &str, id: Uuid, envelope: &EnvelopeInfo) -> Result<String, DialtoneError> {
    let mut url = url::Url::parse(base)
        .map_err(|e| DialtoneError::Config(format!("invalid collector URL `{base}`: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| DialtoneError::Config(format!("collector URL `{base}` cannot take a path")))?
        .pop_if_empty()
        .extend([
            id.to_string().as_str(),
            envelope.reason.as_str(),
            envelope.app_name.as_str(),
            envelope.app_version.as_str(),
            envelope.update_channel.as_str(),
            envelope.build_id.as_str(),
        ]);
    Ok(url.into())
}

/// Recurring sender of one channel's snapshot.
pub struct PeriodicReporter {
    channel: Arc<MetricChannel>,
    engine: Arc<TransmissionEngine>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    safety_margin: Duration,
    retry_backoff: Duration,
}

impl PeriodicReporter {
    pub fn new(
        channel: Arc<MetricChannel>,
        engine: Arc<TransmissionEngine>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        safety_margin: Duration,
    ) -> Self {
        let retry_backoff = engine.retry_backoff();
        Self {
            channel,
            engine,
            clock,
            interval,
            safety_margin,
            retry_backoff,
        }
    }

    pub fn from_config(
        config: &ReportingConfig,
        channel: Arc<MetricChannel>,
        engine: Arc<TransmissionEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            channel,
            engine,
            clock,
            config.report_interval(),
            config.safety_margin(),
        )
    }

    /// The persisted watermark, if any.
    pub async fn watermark(&self) -> Result<Option<DateTime<Utc>>, DialtoneError> {
        let key = self.channel.key().watermark_key();
        match self.channel.store().get(&key).await? {
            Some(value) => {
                let watermark: Watermark = serde_json::from_value(value)?;
                Ok(Some(watermark.last_sent_timestamp))
            }
            None => Ok(None),
        }
    }

    async fn write_watermark(&self, at: DateTime<Utc>) -> Result<(), DialtoneError> {
        let key = self.channel.key().watermark_key();
        let value = serde_json::to_value(Watermark {
            last_sent_timestamp: at,
        })?;
        self.channel.store().set(&key, &value).await?;
        debug!(channel = %self.channel.key(), watermark = %at, "watermark updated");
        Ok(())
    }

    /// The watermark, or `now` persisted as one when none exists yet.
    ///
    /// A fresh install then waits a full interval before its first report.
    async fn watermark_or_assume_sent(&self) -> Result<DateTime<Utc>, DialtoneError> {
        if let Some(watermark) = self.watermark().await? {
            return Ok(watermark);
        }
        let now = self.clock.now();
        info!(channel = %self.channel.key(), "no watermark found, assuming a report was just sent");
        self.write_watermark(now).await?;
        Ok(now)
    }

    /// How long to wait before the next fire, from the persisted watermark.
    pub async fn next_timeout(&self) -> Result<Duration, DialtoneError> {
        let watermark = self.watermark_or_assume_sent().await?;
        Ok(compute_timeout(
            self.clock.now(),
            watermark,
            self.interval,
            self.safety_margin,
        ))
    }

    /// Send the current snapshot now, if there is one.
    pub async fn fire(&self) -> Result<FireOutcome, DialtoneError> {
        if !self.channel.is_enabled() {
            return Ok(FireOutcome::NothingToSend);
        }
        let reports = self.channel.pending().await?;
        let Some(first) = reports.first() else {
            debug!(channel = %self.channel.key(), "no snapshot to send");
            return Ok(FireOutcome::NothingToSend);
        };

        let url = build_report_url(self.channel.collector_url(), Uuid::new_v4(), &first.envelope_info)?;
        let summary = self
            .engine
            .transmit_with(&self.channel, ReportSet::List(reports), &url, RetryPolicy::Caller)
            .await;

        if summary.is_complete() {
            self.write_watermark(self.clock.now()).await?;
            info!(channel = %self.channel.key(), delivered = summary.delivered, "periodic report sent");
            Ok(FireOutcome::Sent(summary))
        } else {
            warn!(channel = %self.channel.key(), failed = summary.failed, "periodic report not delivered");
            Ok(FireOutcome::Failed(summary))
        }
    }

    /// Fire on schedule until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        if !self.channel.is_enabled() {
            info!(channel = %self.channel.key(), "reporting disabled, periodic reporter not started");
            return;
        }

        let mut wait = match self.next_timeout().await {
            Ok(wait) => wait,
            Err(e) => {
                error!(channel = %self.channel.key(), error = %e, "could not read watermark");
                self.retry_backoff
            }
        };

        loop {
            info!(
                channel = %self.channel.key(),
                wait_secs = wait.as_secs(),
                "next periodic report scheduled"
            );
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!(channel = %self.channel.key(), "periodic reporter stopped");
                    return;
                }
                () = tokio::time::sleep(wait) => {}
            }

            wait = match self.fire().await {
                Ok(FireOutcome::Sent(_)) => self.next_timeout().await.unwrap_or(self.interval),
                Ok(FireOutcome::NothingToSend) => self.interval,
                Ok(FireOutcome::Failed(_)) => self
                    .next_timeout()
                    .await
                    .map_or(self.retry_backoff, |t| t.max(self.retry_backoff)),
                Err(e) => {
                    error!(channel = %self.channel.key(), error = %e, "periodic report failed");
                    self.retry_backoff
                }
            };
        }
    }
}
