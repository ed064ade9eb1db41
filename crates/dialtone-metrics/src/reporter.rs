// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root wiring channels, engine and scheduler from configuration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::info;

use dialtone_config::DialtoneConfig;
use dialtone_core::{
    Clock, ConnectivityOracle, DialtoneError, EnvelopeInfo, ReportStore, ReportTransport,
};

use crate::channel::{Channel, MetricChannel};
use crate::engine::{PassSummary, TransmissionEngine};
use crate::feedback::{FeedbackChannel, FeedbackEvent};
use crate::scheduler::{FireOutcome, PeriodicReporter};
use crate::url_usage::UrlUsageChannel;

/// The report categories, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ChannelKind {
    Feedback,
    UrlUsage,
}

/// Queue and delivery state of one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatus {
    pub key: String,
    pub collector_url: String,
    pub enabled: bool,
    pub pending: usize,
    pub generation: u64,
    pub in_flight: usize,
    pub retry_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<DateTime<Utc>>,
}

/// Result of flushing every channel once.
#[derive(Debug, Clone, Copy)]
pub struct FlushOutcome {
    pub feedback: PassSummary,
    pub url_usage: FireOutcome,
}

/// Owns one instance of every channel plus the shared engine.
pub struct Reporter {
    config: DialtoneConfig,
    engine: Arc<TransmissionEngine>,
    feedback: FeedbackChannel,
    url_usage: UrlUsageChannel,
}

impl Reporter {
    pub fn new(
        config: DialtoneConfig,
        store: Arc<dyn ReportStore>,
        transport: Arc<dyn ReportTransport>,
        connectivity: Arc<dyn ConnectivityOracle>,
    ) -> Self {
        let enabled = config.reporting.enabled;
        let engine = Arc::new(TransmissionEngine::from_config(
            &config.reporting,
            transport,
            connectivity,
        ));

        let feedback = FeedbackChannel::new(
            Arc::new(MetricChannel::new(
                config.channels.feedback_key.clone(),
                config.collector.feedback_url.clone(),
                enabled,
                Arc::clone(&store),
            )),
            envelope(&config, &config.channels.feedback_reason),
        );
        let url_usage = UrlUsageChannel::new(
            Arc::new(MetricChannel::new(
                config.channels.url_usage_key.clone(),
                config.collector.url_usage_url.clone(),
                enabled,
                store,
            )),
            envelope(&config, &config.channels.url_usage_reason),
        );

        Self {
            config,
            engine,
            feedback,
            url_usage,
        }
    }

    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    pub fn url_usage(&self) -> &UrlUsageChannel {
        &self.url_usage
    }

    pub fn engine(&self) -> &Arc<TransmissionEngine> {
        &self.engine
    }

    /// Queue a feedback report and immediately try to deliver the queue.
    pub async fn submit_feedback(&self, event: FeedbackEvent) -> Result<PassSummary, DialtoneError> {
        self.feedback.record(event).await?;
        self.engine.flush(self.feedback.metric_channel()).await
    }

    /// Bump a URL counter by name.
    pub async fn increment_url_counter(&self, name: &str) -> Result<(), DialtoneError> {
        self.url_usage.increment_named(name).await
    }

    /// Scheduler for the URL usage snapshot.
    pub fn periodic_reporter(&self, clock: Arc<dyn Clock>) -> PeriodicReporter {
        PeriodicReporter::from_config(
            &self.config.reporting,
            Arc::clone(self.url_usage.metric_channel()),
            Arc::clone(&self.engine),
            clock,
        )
    }

    /// Deliver the feedback queue and send the URL usage snapshot now.
    pub async fn flush_all(&self, clock: Arc<dyn Clock>) -> Result<FlushOutcome, DialtoneError> {
        let feedback = self.engine.flush(self.feedback.metric_channel()).await?;
        let url_usage = self.periodic_reporter(clock).fire().await?;
        Ok(FlushOutcome {
            feedback,
            url_usage,
        })
    }

    /// Drop everything queued in one category.
    pub async fn clear(&self, kind: ChannelKind) -> Result<(), DialtoneError> {
        match kind {
            ChannelKind::Feedback => self.feedback.clear().await?,
            ChannelKind::UrlUsage => self.url_usage.clear().await?,
        }
        info!(channel = %kind, "channel cleared");
        Ok(())
    }

    /// Queue and delivery state of every channel.
    pub async fn status(&self, clock: Arc<dyn Clock>) -> Result<Vec<ChannelStatus>, DialtoneError> {
        let watermark = self.periodic_reporter(clock).watermark().await?;
        Ok(vec![
            channel_status(self.feedback.metric_channel(), None).await?,
            channel_status(self.url_usage.metric_channel(), watermark).await?,
        ])
    }

    /// Cancel pending retries and shut the store down.
    pub async fn shutdown(&self) -> Result<(), DialtoneError> {
        for channel in [self.feedback.metric_channel(), self.url_usage.metric_channel()] {
            channel.cancel_retry();
        }
        self.feedback.metric_channel().store().close().await
    }
}

fn envelope(config: &DialtoneConfig, reason: &str) -> EnvelopeInfo {
    EnvelopeInfo {
        reason: reason.to_string(),
        app_name: config.app.name.clone(),
        app_version: config.app.version.clone(),
        update_channel: config.app.update_channel.clone(),
        build_id: config.app.build_id.clone(),
    }
}

async fn channel_status(
    channel: &Arc<MetricChannel>,
    watermark: Option<DateTime<Utc>>,
) -> Result<ChannelStatus, DialtoneError> {
    let transmission = channel.transmission_snapshot();
    Ok(ChannelStatus {
        key: channel.key().to_string(),
        collector_url: channel.collector_url().to_string(),
        enabled: channel.is_enabled(),
        pending: channel.pending().await?.len(),
        generation: transmission.generation,
        in_flight: transmission.in_flight,
        retry_pending: transmission.retry_pending,
        watermark,
    })
}
