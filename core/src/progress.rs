//! Periodic progress snapshots.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::scanner::ScanState;

pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Point-in-time view of a running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
    pub successes: u64,
    pub elapsed: Duration,
}

impl Progress {
    /// Share of the target list already dispatched, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.processed as f64 / self.total as f64).min(1.0)
    }

    /// Linear extrapolation of the time left. `None` until something has
    /// been dispatched.
    pub fn remaining(&self) -> Option<Duration> {
        if self.processed == 0 {
            return None;
        }
        let done = self.fraction();
        if done <= 0.0 {
            return None;
        }
        Some(self.elapsed.mul_f64((1.0 - done) / done))
    }
}

/// Background task that hands a [`Progress`] snapshot to `on_tick` on a
/// fixed cadence. It only reads the shared counters.
pub struct ProgressReporter {
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    pub fn spawn<F>(state: Arc<ScanState>, interval: Duration, on_tick: F) -> Self
    where
        F: Fn(Progress) + Send + 'static,
    {
        let stop = Arc::new(Notify::new());
        let signal = stop.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => on_tick(state.snapshot()),
                    _ = signal.notified() => break,
                }
            }
            // Final figures once the scan is over.
            on_tick(state.snapshot());
        });

        Self { stop, handle }
    }

    /// Stops the reporter after one last tick.
    pub async fn stop(self) {
        self.stop.notify_one();
        if let Err(e) = self.handle.await {
            debug!("Progress reporter ended abnormally: {e}");
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
