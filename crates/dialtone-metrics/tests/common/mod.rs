// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the metrics integration suites.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dialtone_core::{EnvelopeInfo, Report, ReportPayload};
use dialtone_metrics::{FeedbackChannel, MetricChannel, TransmissionEngine, UrlUsageChannel};
use dialtone_test_utils::{MemoryStore, ScriptedTransport, SwitchableConnectivity};

pub const THROTTLE: Duration = Duration::from_millis(500);
pub const BACKOFF: Duration = Duration::from_secs(300);
pub const FEEDBACK_URL: &str = "https://input.example/api/v1/feedback";
pub const TELEMETRY_URL: &str = "https://telemetry.example/submit/telemetry";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub transport: Arc<ScriptedTransport>,
    pub connectivity: Arc<SwitchableConnectivity>,
    pub engine: Arc<TransmissionEngine>,
}

impl Fixture {
    pub fn new(transport: ScriptedTransport) -> Self {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(transport);
        let connectivity = Arc::new(SwitchableConnectivity::new(true));
        let engine = Arc::new(TransmissionEngine::new(
            transport.clone(),
            connectivity.clone(),
            THROTTLE,
            BACKOFF,
        ));
        Self {
            store,
            transport,
            connectivity,
            engine,
        }
    }

    pub fn channel(&self, key: &str, url: &str) -> Arc<MetricChannel> {
        Arc::new(MetricChannel::new(key, url, true, self.store.clone()))
    }

    pub fn feedback(&self) -> FeedbackChannel {
        FeedbackChannel::new(self.channel("feedback", FEEDBACK_URL), envelope("feedback"))
    }

    pub fn url_usage(&self) -> UrlUsageChannel {
        UrlUsageChannel::new(self.channel("telemetry-urls", TELEMETRY_URL), envelope("daily"))
    }
}

pub fn envelope(reason: &str) -> EnvelopeInfo {
    EnvelopeInfo {
        reason: reason.into(),
        app_name: "dialtone".into(),
        app_version: "1.4.0".into(),
        update_channel: "release".into(),
        build_id: "20260301120000".into(),
    }
}

pub fn description(report: &Report) -> String {
    match &report.payload {
        ReportPayload::Feedback(payload) => payload.description.clone(),
        other => panic!("expected feedback payload, got {other:?}"),
    }
}
