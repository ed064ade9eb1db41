// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Controllable wall clock.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

use dialtone_core::Clock;

/// A wall clock anchored to a chosen instant that advances with tokio time.
///
/// Under `start_paused = true` the tokio clock auto-advances through sleeps,
/// so scheduler loops observe wall time moving exactly as far as they slept.
/// `set` and `advance` jump the clock without sleeping (skew, reboots).
pub struct ManualClock {
    anchor: Mutex<(DateTime<Utc>, Instant)>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            anchor: Mutex::new((start, Instant::now())),
        }
    }

    /// Jump the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = (now, Instant::now());
    }

    /// Jump the clock forward (or backward, for a negative delta).
    pub fn advance(&self, delta: TimeDelta) {
        let now = self.now();
        self.set(now + delta);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, (DateTime<Utc>, Instant)> {
        // A panic while holding the guard cannot leave the tuple half-written.
        self.anchor
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let (base, origin) = *self.lock();
        let elapsed = TimeDelta::from_std(origin.elapsed()).unwrap_or(TimeDelta::MAX);
        base + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test(start_paused = true)]
    async fn follows_tokio_time() {
        let clock = ManualClock::new(epoch());
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(clock.now(), epoch() + TimeDelta::seconds(90));
    }

    #[tokio::test(start_paused = true)]
    async fn set_and_advance_jump() {
        let clock = ManualClock::new(epoch());
        clock.advance(TimeDelta::hours(-2));
        assert_eq!(clock.now(), epoch() - TimeDelta::hours(2));
        clock.set(epoch() + TimeDelta::days(3));
        assert_eq!(clock.now(), epoch() + TimeDelta::days(3));
    }
}
