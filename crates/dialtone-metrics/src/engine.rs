// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transmission engine: staggered delivery passes with backoff retry.
//!
//! A pass works on a frozen snapshot of the reports it was given. Requests
//! start one per throttle tick in queue order and complete in any order.
//! Once every request has an outcome the channel is pruned of delivered
//! reports and, if anything failed, one retry of the remainder is armed.
//!
//! Each pass takes a new generation from its channel. Starting a pass
//! cancels the channel's pending retry but never requests already in flight,
//! so passes may overlap. A pass that settles after a newer one started
//! still prunes what it delivered but leaves retry bookkeeping alone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::{Id, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use dialtone_config::model::ReportingConfig;
use dialtone_core::{
    ConnectivityOracle, DialtoneError, Report, ReportSet, ReportTransport, is_accepted_status,
};

use crate::channel::MetricChannel;

/// Whether a pass arms the backoff retry for what it failed to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry the remainder after the engine's backoff.
    Backoff,
    /// The caller drives retries itself.
    Caller,
}

/// Outcome of one transmission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Generation the pass ran under. For a skipped pass, the channel's current one.
    pub generation: u64,
    /// Reports in the pass snapshot.
    pub attempted: usize,
    /// Reports the collector acknowledged.
    pub delivered: usize,
    /// Reports that stay queued: network failure, rejection, offline.
    pub failed: usize,
    /// Reports discarded because they could not be encoded.
    pub dropped: usize,
    /// Reports left in the channel queue after pruning, appends included.
    pub queued: usize,
    /// Whether pruning the channel queue succeeded.
    pub persisted: bool,
    /// Whether this pass armed a retry.
    pub retry_scheduled: bool,
}

impl PassSummary {
    fn skipped(generation: u64) -> Self {
        Self {
            generation,
            persisted: true,
            ..Self::default()
        }
    }

    /// `true` when every report in the snapshot left the queue.
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.persisted
    }
}

/// Delivers channel queues to collectors.
pub struct TransmissionEngine {
    transport: Arc<dyn ReportTransport>,
    connectivity: Arc<dyn ConnectivityOracle>,
    throttle_delay: Duration,
    retry_backoff: Duration,
}

impl TransmissionEngine {
    pub fn new(
        transport: Arc<dyn ReportTransport>,
        connectivity: Arc<dyn ConnectivityOracle>,
        throttle_delay: Duration,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            transport,
            connectivity,
            throttle_delay,
            retry_backoff,
        }
    }

    pub fn from_config(
        config: &ReportingConfig,
        transport: Arc<dyn ReportTransport>,
        connectivity: Arc<dyn ConnectivityOracle>,
    ) -> Self {
        Self::new(
            transport,
            connectivity,
            config.throttle_delay(),
            config.retry_backoff(),
        )
    }

    pub fn throttle_delay(&self) -> Duration {
        self.throttle_delay
    }

    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Deliver `reports` to `url` on behalf of `channel`, retrying what fails.
    ///
    /// Resolves when every request of this pass has an outcome and the
    /// channel queue has been pruned. A scheduled retry runs detached.
    pub fn transmit(
        self: &Arc<Self>,
        channel: &Arc<MetricChannel>,
        reports: ReportSet,
        url: &str,
    ) -> BoxFuture<'static, PassSummary> {
        self.transmit_with(channel, reports, url, RetryPolicy::Backoff)
    }

    /// Like [`transmit`](Self::transmit) with an explicit retry policy.
    pub fn transmit_with(
        self: &Arc<Self>,
        channel: &Arc<MetricChannel>,
        reports: ReportSet,
        url: &str,
        policy: RetryPolicy,
    ) -> BoxFuture<'static, PassSummary> {
        Box::pin(Self::run_pass(
            Arc::clone(self),
            Arc::clone(channel),
            reports.into_reports(),
            url.to_string(),
            policy,
        ))
    }

    /// Transmit everything the channel holds to its own collector URL.
    pub async fn flush(self: &Arc<Self>, channel: &Arc<MetricChannel>) -> Result<PassSummary, DialtoneError> {
        let pending = channel.pending().await?;
        Ok(self
            .transmit(channel, ReportSet::List(pending), channel.collector_url())
            .await)
    }

    async fn run_pass(
        engine: Arc<Self>,
        channel: Arc<MetricChannel>,
        snapshot: Vec<Report>,
        url: String,
        policy: RetryPolicy,
    ) -> PassSummary {
        if !channel.is_enabled() {
            debug!(channel = %channel.key(), "reporting disabled, transmission skipped");
            return PassSummary::skipped(channel.transmission_snapshot().generation);
        }
        if snapshot.is_empty() {
            debug!(channel = %channel.key(), "nothing to transmit");
            return PassSummary::skipped(channel.transmission_snapshot().generation);
        }

        let attempted = snapshot.len();
        let generation = channel.begin_pass();
        info!(
            channel = %channel.key(),
            generation,
            count = attempted,
            "transmission pass started"
        );

        // 1. Staggered dispatch over the frozen snapshot.
        let mut ticker = (!engine.throttle_delay.is_zero()).then(|| {
            let mut ticker = tokio::time::interval(engine.throttle_delay);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut in_flight = JoinSet::new();
        let mut dispatched: HashMap<Id, (usize, Report)> = HashMap::new();
        let mut dropped = Vec::new();
        let mut failed: Vec<(usize, Report)> = Vec::new();

        for (index, report) in snapshot.into_iter().enumerate() {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            let body = match serde_json::to_vec(&report) {
                Ok(body) => body,
                Err(e) => {
                    error!(
                        channel = %channel.key(),
                        report_id = %report.id,
                        error = %e,
                        "report could not be encoded and is dropped"
                    );
                    dropped.push(report);
                    continue;
                }
            };

            if !engine.connectivity.is_online() {
                warn!(
                    channel = %channel.key(),
                    report_id = %report.id,
                    error = %DialtoneError::Offline,
                    "dispatch skipped"
                );
                failed.push((index, report));
                continue;
            }

            let transport = Arc::clone(&engine.transport);
            let url = url.clone();
            debug!(channel = %channel.key(), report_id = %report.id, index, "dispatching report");
            let task = in_flight.spawn(async move { transport.post_json(&url, body).await });
            dispatched.insert(task.id(), (index, report));
        }

        // 2. Settle: wait for every outcome.
        let mut delivered = Vec::new();
        while let Some(joined) = in_flight.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, Ok(outcome)),
                Err(e) => (e.id(), Err(e)),
            };
            let Some((index, report)) = dispatched.remove(&id) else {
                error!(channel = %channel.key(), task = %id, "outcome for unknown dispatch task");
                continue;
            };
            match outcome {
                Ok(Ok(status)) if is_accepted_status(status) => {
                    debug!(channel = %channel.key(), report_id = %report.id, status, "report delivered");
                    delivered.push(report);
                }
                Ok(Ok(status)) => {
                    warn!(
                        channel = %channel.key(),
                        report_id = %report.id,
                        error = %DialtoneError::Http { status },
                        "report rejected by collector"
                    );
                    failed.push((index, report));
                }
                Ok(Err(e)) => {
                    warn!(
                        channel = %channel.key(),
                        report_id = %report.id,
                        error = %e,
                        "report delivery failed"
                    );
                    failed.push((index, report));
                }
                Err(e) => {
                    error!(
                        channel = %channel.key(),
                        report_id = %report.id,
                        error = %e,
                        "dispatch task aborted"
                    );
                    failed.push((index, report));
                }
            }
        }
        failed.sort_by_key(|(index, _)| *index);
        let remainder: Vec<Report> = failed.into_iter().map(|(_, report)| report).collect();

        // 3. Prune delivered and dropped reports from the current queue.
        let removed: Vec<Report> = delivered.iter().chain(dropped.iter()).cloned().collect();
        let (persisted, queued) = match channel.settle(&removed).await {
            Ok(left) => (true, left.len()),
            Err(e) => {
                error!(channel = %channel.key(), generation, error = %e, "failed to prune delivered reports");
                (false, attempted - removed.len())
            }
        };

        // 4. Arm the retry if this pass is still the newest.
        let is_current = channel.end_pass(generation);
        let retry_scheduled = match policy {
            RetryPolicy::Backoff if !remainder.is_empty() => {
                if is_current {
                    engine.schedule_retry(&channel, generation, remainder.clone(), url)
                } else {
                    debug!(channel = %channel.key(), generation, "newer pass owns retry");
                    false
                }
            }
            _ => false,
        };

        let summary = PassSummary {
            generation,
            attempted,
            delivered: delivered.len(),
            failed: remainder.len(),
            dropped: dropped.len(),
            queued,
            persisted,
            retry_scheduled,
        };
        info!(
            channel = %channel.key(),
            generation,
            attempted,
            delivered = summary.delivered,
            failed = summary.failed,
            dropped = summary.dropped,
            queued,
            retry_scheduled,
            "transmission pass settled"
        );
        summary
    }

    /// Arm one backoff timer that re-enters `transmit` with `remainder`.
    fn schedule_retry(
        self: &Arc<Self>,
        channel: &Arc<MetricChannel>,
        generation: u64,
        remainder: Vec<Report>,
        url: String,
    ) -> bool {
        let Some(token) = channel.arm_retry(generation) else {
            return false;
        };

        let engine = Arc::clone(self);
        let channel = Arc::clone(channel);
        let backoff = self.retry_backoff;
        info!(
            channel = %channel.key(),
            generation,
            count = remainder.len(),
            backoff_secs = backoff.as_secs(),
            "retry scheduled"
        );

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(channel = %channel.key(), generation, "retry discarded");
                    return;
                }
                () = tokio::time::sleep(backoff) => {}
            }
            channel.retry_fired(generation);

            // Only resend what is still queued: a clear or a newer snapshot wins.
            let remainder: Vec<Report> = match channel.pending().await {
                Ok(pending) => remainder
                    .into_iter()
                    .filter(|report| pending.contains(report))
                    .collect(),
                Err(e) => {
                    warn!(channel = %channel.key(), error = %e, "queue unreadable, retrying full remainder");
                    remainder
                }
            };
            if remainder.is_empty() {
                debug!(channel = %channel.key(), generation, "retry found nothing left to send");
                return;
            }
            engine
                .transmit(&channel, ReportSet::List(remainder), &url)
                .await;
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_summary_is_complete() {
        let summary = PassSummary::skipped(3);
        assert!(summary.is_complete());
        assert_eq!(summary.generation, 3);
        assert_eq!(summary.attempted, 0);
    }

    #[test]
    fn failures_or_unpersisted_prune_are_incomplete() {
        let failed = PassSummary {
            failed: 1,
            persisted: true,
            ..PassSummary::default()
        };
        assert!(!failed.is_complete());

        let unpersisted = PassSummary {
            delivered: 2,
            persisted: false,
            ..PassSummary::default()
        };
        assert!(!unpersisted.is_complete());
    }
}
