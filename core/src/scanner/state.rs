use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::progress::Progress;

/// Counters shared by every worker of one scan.
///
/// `processed` is bumped when an address is handed to a worker, so it
/// counts in-flight work as well as finished work.
#[derive(Debug)]
pub struct ScanState {
    total: u64,
    processed: AtomicU64,
    successes: AtomicU64,
    started: Instant,
}

impl ScanState {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn mark_dispatched(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mark_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            processed: self.processed(),
            total: self.total,
            successes: self.successes(),
            elapsed: self.elapsed(),
        }
    }
}

/// Final figures reported once every worker has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: u64,
    pub processed: u64,
    pub successes: u64,
    pub elapsed: Duration,
}

impl From<&ScanState> for ScanSummary {
    fn from(state: &ScanState) -> Self {
        Self {
            total: state.total(),
            processed: state.processed(),
            successes: state.successes(),
            elapsed: state.elapsed(),
        }
    }
}
