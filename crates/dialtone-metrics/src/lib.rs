// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report channels and delivery for the Dialtone report-delivery engine.
//!
//! Producers record into a [`Channel`]; the [`TransmissionEngine`] delivers
//! a channel's queue with staggered dispatch and backoff retry; the
//! [`PeriodicReporter`] ships snapshot channels on a watermark-driven
//! cadence. [`Reporter`] builds one of each from configuration.

pub mod channel;
pub mod engine;
pub mod feedback;
pub mod reporter;
pub mod scheduler;
pub mod url_usage;

pub use channel::{Channel, MetricChannel, TransmissionSnapshot};
pub use engine::{PassSummary, RetryPolicy, TransmissionEngine};
pub use feedback::{Description, FeedbackChannel, FeedbackEvent, HAPPY_LABEL, SAD_LABEL};
pub use reporter::{ChannelKind, ChannelStatus, FlushOutcome, Reporter};
pub use scheduler::{FireOutcome, PeriodicReporter, Watermark, build_report_url, compute_timeout};
pub use url_usage::{UrlCounter, UrlUsageChannel};
