//! Periodic rig health check and alert policy.
//!
//! Each tick fetches statistics, classifies them and decides what to
//! tell the recipients:
//!
//! - A change of [`Health`] variant sends the new result's message. The
//!   monitor starts from an implicit `Ok`, so a rig that is already
//!   unhealthy on the first tick alerts immediately while a healthy one
//!   stays quiet.
//! - Three hours without an `Ok` tick sends one reminder. Only an `Ok`
//!   tick re-arms it.
//! - Thirty minutes without a successful fetch sends one "pool might be
//!   down" alert, re-armed by the next successful fetch.
//!
//! Fetch and delivery failures are absorbed here; a tick always
//! completes and leaves the state consistent.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api_client::{FetchError, StatsSource};
use crate::health::{self, Health, HealthResult};
use crate::notify::{self, Notifier};
use crate::tracing::prelude::*;
use crate::types::{AlarmStatus, DebouncedAlarm};

/// Time between health checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Unhealthy time after which the outage reminder is sent.
pub const OUTAGE_REMINDER_AFTER: Duration = Duration::from_secs(3 * 60 * 60);

/// Time without pool statistics after which the pool is presumed down.
pub const POOL_DOWN_AFTER: Duration = Duration::from_secs(30 * 60);

const OUTAGE_REMINDER_MESSAGE: &str =
    "URGENT! Unhealthy rig status for more than 3 hours! Please take a look";

/// Everything the monitor remembers between ticks.
#[derive(Debug, Clone)]
pub struct MonitorState {
    /// Result of the previous tick; `None` before the first one.
    previous: Option<HealthResult>,
    /// Condition "not Ok"; its last clear instant is the last healthy
    /// tick and its fired flag is the reminder flag.
    outage: DebouncedAlarm,
    /// Condition "fetch failed"; clear instant is the last pool answer.
    pool_silence: DebouncedAlarm,
}

impl MonitorState {
    /// Fresh state: no previous result, healthy as of `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            previous: None,
            outage: DebouncedAlarm::new(OUTAGE_REMINDER_AFTER, now),
            pool_silence: DebouncedAlarm::new(POOL_DOWN_AFTER, now),
        }
    }

    pub fn previous(&self) -> Option<&HealthResult> {
        self.previous.as_ref()
    }

    /// Instant of the last `Ok` classification (or startup).
    pub fn last_healthy(&self) -> Instant {
        self.outage.last_clear()
    }

    /// Whether the outage reminder went out for the current streak.
    pub fn reminder_sent(&self) -> bool {
        self.outage.is_fired()
    }
}

/// Watches one rig.
pub struct HealthMonitor {
    rig_id: String,
    recipients: Vec<String>,
    source: Box<dyn StatsSource>,
    notifier: Box<dyn Notifier>,
    poll_interval: Duration,
    state: MonitorState,
}

impl HealthMonitor {
    pub fn new(
        rig_id: impl Into<String>,
        recipients: Vec<String>,
        source: Box<dyn StatsSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            rig_id: rig_id.into(),
            recipients,
            source,
            notifier,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: MonitorState::new(Instant::now()),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Tick until cancelled. The first tick runs immediately.
    ///
    /// Ticks never overlap: a tick that overruns the interval causes the
    /// missed ticks to be skipped. A panicking tick is logged and the
    /// loop carries on with the next one.
    pub async fn run(mut self, cancellation: CancellationToken) {
        info!(
            rig = %self.rig_id,
            interval_secs = self.poll_interval.as_secs(),
            recipients = self.recipients.len(),
            "Health monitor started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    break;
                }
                _ = interval.tick() => {
                    if AssertUnwindSafe(self.tick()).catch_unwind().await.is_err() {
                        error!(rig = %self.rig_id, "Health check panicked, skipping tick");
                    }
                }
            }
        }

        info!(rig = %self.rig_id, "Health monitor stopped");
    }

    /// Run one health check.
    pub async fn tick(&mut self) {
        let now = Instant::now();

        let fetched = self.source.fetch(&self.rig_id).await;
        let pool_status = self.state.pool_silence.check(fetched.is_err(), now);

        let result = match fetched {
            Ok(snapshot) => health::classify(&snapshot),
            Err(e) => {
                warn!(rig = %self.rig_id, error = %e, "Failed to fetch pool statistics");
                self.api_error(&e, pool_status.is_raised(), now)
            }
        };

        info!(
            rig = %self.rig_id,
            health = %result.health,
            last_seen = ?result.last_seen,
            "{}",
            result.message
        );

        let previous = self
            .state
            .previous
            .as_ref()
            .map_or(Health::Ok, |r| r.health);

        if result.health != previous {
            info!(
                rig = %self.rig_id,
                previous = %previous,
                current = %result.health,
                "Health changed"
            );
            let message = if result.health.is_ok() {
                let outage = self.state.outage.elapsed_since_clear(now);
                result.clone().with_outage(outage).message
            } else {
                result.message.clone()
            };
            self.alert(&message).await;
        } else if pool_status == AlarmStatus::Triggered {
            // Already in ApiError; resend with the escalated wording.
            warn!(rig = %self.rig_id, "No pool statistics for too long");
            self.alert(&result.message).await;
        }

        if self.state.outage.check(!result.health.is_ok(), now) == AlarmStatus::Triggered {
            warn!(rig = %self.rig_id, "Rig unhealthy for too long");
            self.alert(OUTAGE_REMINDER_MESSAGE).await;
        }

        self.state.previous = Some(result);
    }

    fn api_error(&self, error: &FetchError, escalated: bool, now: Instant) -> HealthResult {
        let message = if escalated {
            let silent_mins = self.state.pool_silence.elapsed_since_clear(now).as_secs() / 60;
            format!(
                "URGENT! No statistics found for the last {silent_mins} minutes. \
                 Pool might be down. Message: {error}"
            )
        } else {
            format!("Warning! Could not fetch pool statistics. Message: {error}")
        };
        HealthResult::api_error(message)
    }

    async fn alert(&self, message: &str) {
        let report = notify::dispatch(self.notifier.as_ref(), &self.recipients, message).await;
        if report.failed > 0 {
            error!(
                rig = %self.rig_id,
                delivered = report.delivered,
                failed = report.failed,
                "Some alerts were not delivered"
            );
        }
    }
}
