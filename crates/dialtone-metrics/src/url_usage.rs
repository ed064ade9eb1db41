// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL usage counters.
//!
//! Unlike feedback, this category keeps a single current-state snapshot.
//! Producers bump a counter and the snapshot is persisted immediately; the
//! periodic scheduler is what ships it.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use dialtone_core::{DialtoneError, EnvelopeInfo, Report, ReportPayload, ReportSet, UrlUsagePayload};

use crate::channel::{Channel, MetricChannel};

/// Counter kinds a producer may bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum UrlCounter {
    /// A call URL was generated.
    Generated,
    /// A call URL was shared.
    Shared,
}

impl UrlCounter {
    /// Parse a counter name, failing on anything unknown.
    pub fn from_name(name: &str) -> Result<Self, DialtoneError> {
        Self::from_str(name).map_err(|_| DialtoneError::UnknownCounter(name.to_string()))
    }

    fn bump(self, counts: &mut UrlUsagePayload) {
        match self {
            Self::Generated => counts.generated_urls += 1,
            Self::Shared => counts.shared_urls += 1,
        }
    }
}

/// Single-snapshot channel of URL usage counters.
pub struct UrlUsageChannel {
    inner: Arc<MetricChannel>,
    envelope: EnvelopeInfo,
}

impl UrlUsageChannel {
    pub fn new(inner: Arc<MetricChannel>, envelope: EnvelopeInfo) -> Self {
        Self { inner, envelope }
    }

    /// Bump `counter` in the stored snapshot, creating a zeroed one if needed.
    pub async fn increment(&self, counter: UrlCounter) -> Result<(), DialtoneError> {
        let envelope = self.envelope.clone();
        let written = self
            .inner
            .update(move |current| {
                let mut snapshot = current
                    .and_then(|set| set.into_reports().pop())
                    .filter(|report| matches!(report.payload, ReportPayload::UrlUsage(_)))
                    .unwrap_or_else(|| Report::url_usage(envelope));
                if let ReportPayload::UrlUsage(counts) = &mut snapshot.payload {
                    counter.bump(counts);
                }
                Ok(ReportSet::Single(snapshot))
            })
            .await?;

        if let Some(ReportSet::Single(Report {
            payload: ReportPayload::UrlUsage(counts),
            ..
        })) = written
        {
            debug!(
                channel = %self.inner.key(),
                counter = %counter,
                generated = counts.generated_urls,
                shared = counts.shared_urls,
                "url counter incremented"
            );
        }
        Ok(())
    }

    /// Bump a counter by name. Unknown names are a caller error.
    pub async fn increment_named(&self, name: &str) -> Result<(), DialtoneError> {
        self.increment(UrlCounter::from_name(name)?).await
    }

    /// The current snapshot, if one is waiting to be sent.
    pub async fn snapshot(&self) -> Result<Option<Report>, DialtoneError> {
        Ok(self.inner.pending().await?.pop())
    }
}

#[async_trait]
impl Channel for UrlUsageChannel {
    type Event = UrlCounter;

    fn metric_channel(&self) -> &Arc<MetricChannel> {
        &self.inner
    }

    async fn record(&self, counter: UrlCounter) -> Result<(), DialtoneError> {
        self.increment(counter).await
    }
}
