//! [`TickScheduler`] – fixed-period driver for [`TfNode::tick`].
//!
//! Ticks run strictly one after another on a single task: the next tick is
//! not started until the previous one (integration and publish) has
//! finished.  When a tick overruns the period, the missed deadlines are
//! skipped rather than queued.  `dt` is measured between the instants the
//! ticks actually started, not between their deadlines, so after an overrun
//! it covers the whole gap.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::node::TfNode;

/// Default tick period (~30 Hz).
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(33);

/// Timing of one tick as handed to the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInstant {
    /// Monotonic time this tick started running.
    pub current: Instant,
    /// Start of the previous tick; `None` on the first tick.
    pub previous: Option<Instant>,
    /// Wall-clock stamp attached to the published pose.
    pub stamp: DateTime<Utc>,
}

impl TickInstant {
    /// Signed seconds from the previous tick to this one, or `None` on the
    /// first tick.  Negative only if the instants were supplied out of order.
    pub fn dt_secs(&self) -> Option<f64> {
        self.previous.map(|previous| {
            if self.current >= previous {
                self.current.duration_since(previous).as_secs_f64()
            } else {
                -previous.duration_since(self.current).as_secs_f64()
            }
        })
    }
}

/// Drives a [`TfNode`] at a fixed period.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    max_ticks: Option<u64>,
}

impl TickScheduler {
    /// Create a scheduler ticking every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            max_ticks: None,
        }
    }

    /// Stop after `max_ticks` ticks instead of running forever (builder-style).
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run the tick loop.  Returns the number of ticks performed once
    /// `max_ticks` is reached; otherwise runs until the task is dropped.
    pub async fn run(self, node: Arc<TfNode>) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut previous: Option<Instant> = None;
        let mut ticks: u64 = 0;

        loop {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            // The deadline `tick` returns lags the real start after an overrun.
            interval.tick().await;
            let current = Instant::now();
            if let Some(previous) = previous {
                let gap = current.saturating_duration_since(previous);
                if gap > self.period + self.period / 2 {
                    debug!(gap_ms = gap.as_millis() as u64, "late tick(s) skipped");
                }
            }

            let instant = TickInstant {
                current,
                previous,
                stamp: Utc::now(),
            };
            if let Err(e) = node.tick(instant).await {
                warn!(error = %e, "tick dropped: publish failed");
            }

            previous = Some(current);
            ticks += 1;
        }

        ticks
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}
