//! Fixed-period refresh.
//!
//! The scheduler only posts ticks. It never waits for a fetch to finish, so a
//! slow source can have several fetches in flight; [`App`](crate::App) sorts
//! out which completion wins by sequence number.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::events::AppEvent;
use crate::source::InventorySource;

/// Default refresh period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(2);

/// Posts [`AppEvent::Tick`] on a fixed period.
#[derive(Debug, Clone, Copy)]
pub struct RefreshScheduler {
    period: Duration,
}

impl RefreshScheduler {
    /// A zero period falls back to [`DEFAULT_PERIOD`].
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_PERIOD
        } else {
            period
        };
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking. The first tick fires immediately. The task ends when
    /// the receiver is dropped.
    pub fn spawn(&self, tx: UnboundedSender<AppEvent>) -> JoinHandle<()> {
        let period = self.period;

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        })
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

/// Run one fetch in the background and post its completion tagged with `seq`.
pub fn spawn_fetch(
    source: Arc<dyn InventorySource>,
    seq: u64,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = source.fetch_snapshot().await;
        if let Err(ref e) = result {
            tracing::warn!(seq, error = %e, "fetch failed");
        }
        // the loop may already be gone on shutdown
        let _ = tx.send(AppEvent::FetchCompleted { seq, result });
    })
}
