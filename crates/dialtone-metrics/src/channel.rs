// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric channels: one durable queue per report category.
//!
//! [`MetricChannel`] owns the store key, the collector URL and the
//! transmission bookkeeping for its category. Category-specific producers
//! ([`FeedbackChannel`](crate::feedback::FeedbackChannel),
//! [`UrlUsageChannel`](crate::url_usage::UrlUsageChannel)) embed it and
//! implement [`Channel`].
//!
//! Every read-modify-write of the queue runs under one per-channel async
//! mutex, so completions from overlapping passes never lose an append. The
//! store may be shared with other processes (a one-shot CLI next to a
//! running service), so mutations and [`MetricChannel::pending`] always
//! start from a fresh store read; only [`MetricChannel::get`] is cached.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use dialtone_core::{ChannelKey, DialtoneError, Report, ReportSet, ReportStore};

/// Category-specific front of a [`MetricChannel`].
#[async_trait]
pub trait Channel: Send + Sync {
    /// What a producer hands to [`Channel::record`].
    type Event: Send + 'static;

    /// The shared queue and delivery state.
    fn metric_channel(&self) -> &Arc<MetricChannel>;

    /// Fold `event` into the queue and persist. Never touches the network.
    async fn record(&self, event: Self::Event) -> Result<(), DialtoneError>;

    /// Reports currently waiting for delivery.
    async fn pending(&self) -> Result<Vec<Report>, DialtoneError> {
        self.metric_channel().pending().await
    }

    /// Drop everything queued, leaving an explicit "cleared" marker.
    async fn clear(&self) -> Result<(), DialtoneError> {
        self.metric_channel().clear().await
    }
}

/// Point-in-time view of a channel's delivery bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmissionSnapshot {
    /// Id of the most recent pass. Zero before the first pass.
    pub generation: u64,
    /// Passes dispatched but not yet settled.
    pub in_flight: usize,
    /// Whether a retry timer is armed.
    pub retry_pending: bool,
}

#[derive(Default)]
struct TransmissionState {
    generation: u64,
    in_flight: usize,
    /// Generation that armed the timer, and the timer's token.
    pending_retry: Option<(u64, CancellationToken)>,
}

/// Durable queue plus delivery state for one report category.
pub struct MetricChannel {
    key: ChannelKey,
    collector_url: String,
    enabled: bool,
    store: Arc<dyn ReportStore>,
    /// `None` until the first read; then the last known stored content.
    cache: Mutex<Option<Option<ReportSet>>>,
    transmission: std::sync::Mutex<TransmissionState>,
}

impl MetricChannel {
    pub fn new(
        key: impl Into<String>,
        collector_url: impl Into<String>,
        enabled: bool,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            key: ChannelKey(key.into()),
            collector_url: collector_url.into(),
            enabled,
            store,
            cache: Mutex::new(None),
            transmission: std::sync::Mutex::new(TransmissionState::default()),
        }
    }

    pub fn key(&self) -> &ChannelKey {
        &self.key
    }

    pub fn collector_url(&self) -> &str {
        &self.collector_url
    }

    /// `false` when reporting is switched off; all mutations are then no-ops.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Current queue content.
    ///
    /// `None` if the key was never written, `Some(ReportSet::Cleared)` after
    /// an explicit clear. The store is read once; later calls hit the cache.
    pub async fn get(&self) -> Result<Option<ReportSet>, DialtoneError> {
        let mut cache = self.cache.lock().await;
        self.load(&mut cache).await
    }

    /// Overwrite the queue with `reports`.
    pub async fn save(&self, reports: ReportSet) -> Result<(), DialtoneError> {
        if !self.enabled {
            debug!(channel = %self.key, "reporting disabled, save skipped");
            return Ok(());
        }
        let mut cache = self.cache.lock().await;
        self.persist(&mut cache, reports).await
    }

    /// Read-modify-write the queue under the channel lock.
    ///
    /// `f` receives the content currently in the store (not the cache) and
    /// returns the new content, which is persisted before the lock is
    /// released. Returns what was written.
    pub async fn update<F>(&self, f: F) -> Result<Option<ReportSet>, DialtoneError>
    where
        F: FnOnce(Option<ReportSet>) -> Result<ReportSet, DialtoneError> + Send,
    {
        if !self.enabled {
            debug!(channel = %self.key, "reporting disabled, update skipped");
            return Ok(None);
        }
        let mut cache = self.cache.lock().await;
        let current = self.reload(&mut cache).await?;
        let next = f(current)?;
        self.persist(&mut cache, next.clone()).await?;
        Ok(Some(next))
    }

    /// Reports waiting for delivery, in send order, as stored right now.
    pub async fn pending(&self) -> Result<Vec<Report>, DialtoneError> {
        let mut cache = self.cache.lock().await;
        Ok(self
            .reload(&mut cache)
            .await?
            .map(ReportSet::into_reports)
            .unwrap_or_default())
    }

    /// Replace the queue with the explicit "cleared" marker.
    pub async fn clear(&self) -> Result<(), DialtoneError> {
        self.save(ReportSet::Cleared).await
    }

    /// Remove `delivered` from whatever is stored now and return the rest.
    ///
    /// Removal is by full equality (id and content), so reports appended
    /// while a pass was in flight survive. A snapshot bumped after it was
    /// dispatched stays queued with only the counts added since.
    pub(crate) async fn settle(&self, delivered: &[Report]) -> Result<Vec<Report>, DialtoneError> {
        let written = self
            .update(|current| {
                Ok(match current {
                    Some(set) => set.without(delivered),
                    None => ReportSet::List(Vec::new()),
                })
            })
            .await?;
        Ok(written.map(ReportSet::into_reports).unwrap_or_default())
    }

    async fn load(
        &self,
        cache: &mut Option<Option<ReportSet>>,
    ) -> Result<Option<ReportSet>, DialtoneError> {
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }
        self.reload(cache).await
    }

    async fn reload(
        &self,
        cache: &mut Option<Option<ReportSet>>,
    ) -> Result<Option<ReportSet>, DialtoneError> {
        let loaded = match self.store.get(&self.key.0).await? {
            Some(value) => Some(ReportSet::from_value(value)?),
            None => None,
        };
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    async fn persist(
        &self,
        cache: &mut Option<Option<ReportSet>>,
        reports: ReportSet,
    ) -> Result<(), DialtoneError> {
        let value = reports.to_value()?;
        if let Err(e) = self.store.set(&self.key.0, &value).await {
            error!(channel = %self.key, error = %e, "failed to persist report queue");
            return Err(e);
        }
        debug!(channel = %self.key, count = reports.len(), "report queue persisted");
        *cache = Some(Some(reports));
        Ok(())
    }

    // --- Transmission bookkeeping ---

    fn transmission(&self) -> std::sync::MutexGuard<'_, TransmissionState> {
        // The state is plain counters; a poisoned guard still holds valid data.
        self.transmission
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Start a pass: take a new generation and disarm any pending retry.
    pub(crate) fn begin_pass(&self) -> u64 {
        let mut state = self.transmission();
        state.generation += 1;
        state.in_flight += 1;
        if let Some((armed_by, token)) = state.pending_retry.take() {
            token.cancel();
            debug!(channel = %self.key, armed_by, generation = state.generation, "pending retry cancelled");
        }
        state.generation
    }

    /// Finish a pass. Returns `true` if `generation` is still the newest.
    pub(crate) fn end_pass(&self, generation: u64) -> bool {
        let mut state = self.transmission();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.generation == generation
    }

    /// Arm the retry timer for `generation`.
    ///
    /// Returns `None` when a newer pass has started since; that pass owns
    /// the retry bookkeeping.
    pub(crate) fn arm_retry(&self, generation: u64) -> Option<CancellationToken> {
        let mut state = self.transmission();
        if state.generation != generation {
            return None;
        }
        if let Some((_, previous)) = state.pending_retry.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        state.pending_retry = Some((generation, token.clone()));
        Some(token)
    }

    /// Forget the retry timer armed by `generation` once it has fired.
    pub(crate) fn retry_fired(&self, generation: u64) {
        let mut state = self.transmission();
        if state
            .pending_retry
            .as_ref()
            .is_some_and(|(armed_by, _)| *armed_by == generation)
        {
            state.pending_retry = None;
        }
    }

    /// Cancel a pending retry without starting a pass.
    pub fn cancel_retry(&self) {
        if let Some((_, token)) = self.transmission().pending_retry.take() {
            token.cancel();
        }
    }

    pub fn transmission_snapshot(&self) -> TransmissionSnapshot {
        let state = self.transmission();
        TransmissionSnapshot {
            generation: state.generation,
            in_flight: state.in_flight,
            retry_pending: state.pending_retry.is_some(),
        }
    }
}
