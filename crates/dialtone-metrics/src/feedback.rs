// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User feedback channel.
//!
//! Every submission is appended to the queue as its own report; nothing is
//! collapsed. Descriptions are normalized on the way in: an empty one is
//! replaced by a label derived from the verdict, and a list of phrases is
//! joined with `", "`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dialtone_core::{DialtoneError, EnvelopeInfo, FeedbackPayload, Report, ReportSet};

use crate::channel::{Channel, MetricChannel};

/// Description used when a happy user leaves no text.
pub const HAPPY_LABEL: &str = "Happy user";

/// Description used when an unhappy user leaves no text.
pub const SAD_LABEL: &str = "Sad user";

/// Free text, or a list of picked phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Items(Vec<String>),
}

impl Default for Description {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for Description {
    fn from(items: Vec<String>) -> Self {
        Self::Items(items)
    }
}

/// A feedback submission as the UI hands it over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub happy: bool,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub url: Option<String>,
}

impl FeedbackEvent {
    /// Apply the description rules and produce the wire payload.
    pub fn into_payload(self) -> FeedbackPayload {
        let description = match self.description {
            Description::Text(text) => text,
            Description::Items(items) => items.join(", "),
        };
        let description = if description.is_empty() {
            let label = if self.happy { HAPPY_LABEL } else { SAD_LABEL };
            label.to_string()
        } else {
            description
        };
        FeedbackPayload {
            happy: self.happy,
            description,
            url: self.url,
        }
    }
}

/// Append-only queue of feedback reports.
pub struct FeedbackChannel {
    inner: Arc<MetricChannel>,
    envelope: EnvelopeInfo,
}

impl FeedbackChannel {
    pub fn new(inner: Arc<MetricChannel>, envelope: EnvelopeInfo) -> Self {
        Self { inner, envelope }
    }
}

#[async_trait]
impl Channel for FeedbackChannel {
    type Event = FeedbackEvent;

    fn metric_channel(&self) -> &Arc<MetricChannel> {
        &self.inner
    }

    async fn record(&self, event: FeedbackEvent) -> Result<(), DialtoneError> {
        let report = Report::feedback(self.envelope.clone(), event.into_payload());
        debug!(
            channel = %self.inner.key(),
            report_id = %report.id,
            "feedback recorded"
        );
        self.inner
            .update(move |current| {
                let mut reports = current.map(ReportSet::into_reports).unwrap_or_default();
                reports.push(report);
                Ok(ReportSet::List(reports))
            })
            .await?;
        Ok(())
    }
}
