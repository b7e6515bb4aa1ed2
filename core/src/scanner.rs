//! The bounded worker pool that drives a scan to completion.
//!
//! A fixed number of workers share one lazy address iterator. Each worker
//! pulls the next address only when it is free, so production is paced by
//! consumption and no backlog of pending targets ever builds up. Workers run
//! as tasks on the multi-threaded runtime and execute in parallel.
//!
//! The only synchronization points are the [`ScanState`] counters (atomic)
//! and the [`ResultSink`] (mutex).

use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, error};

use sniscan_common::config::ScanConfig;

use crate::probe::{self, ProbeOutcome, Prober};
use crate::sink::ResultSink;

mod state;

pub use state::{ScanState, ScanSummary};

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
    retries: u32,
}

impl Scheduler {
    pub fn new(cfg: &ScanConfig) -> Self {
        Self::with_limits(cfg.concurrency(), cfg.retries())
    }

    pub fn with_limits(concurrency: usize, retries: u32) -> Self {
        Self {
            concurrency: concurrency.max(1),
            retries,
        }
    }

    /// Spawns the worker pool and returns immediately.
    ///
    /// `total` is the number of addresses `targets` will yield; it only feeds
    /// progress reporting. Must be called from within a tokio runtime.
    pub fn start<I, P, W>(
        &self,
        targets: I,
        total: u64,
        prober: Arc<P>,
        sink: Arc<ResultSink<W>>,
    ) -> ScanHandle
    where
        I: IntoIterator<Item = Ipv4Addr>,
        I::IntoIter: Send + 'static,
        P: Prober + ?Sized + 'static,
        W: Write + Send + 'static,
    {
        let state = Arc::new(ScanState::new(total));
        let targets = Arc::new(Mutex::new(targets.into_iter()));
        let mut workers = JoinSet::new();

        debug!(
            "Starting {} workers for {total} targets ({} retries)",
            self.concurrency, self.retries
        );

        for _ in 0..self.concurrency {
            workers.spawn(worker(
                targets.clone(),
                prober.clone(),
                sink.clone(),
                state.clone(),
                self.retries,
            ));
        }

        ScanHandle { state, workers }
    }

    /// Runs a whole scan and waits for it.
    pub async fn run<I, P, W>(
        &self,
        targets: I,
        total: u64,
        prober: Arc<P>,
        sink: Arc<ResultSink<W>>,
    ) -> ScanSummary
    where
        I: IntoIterator<Item = Ipv4Addr>,
        I::IntoIter: Send + 'static,
        P: Prober + ?Sized + 'static,
        W: Write + Send + 'static,
    {
        self.start(targets, total, prober, sink).join().await
    }
}

/// A running scan.
pub struct ScanHandle {
    state: Arc<ScanState>,
    workers: JoinSet<()>,
}

impl ScanHandle {
    /// Live counters, for observers such as the progress reporter.
    pub fn state(&self) -> Arc<ScanState> {
        self.state.clone()
    }

    /// Waits until every address has been dispatched and every dispatched
    /// probe has returned.
    pub async fn join(mut self) -> ScanSummary {
        while let Some(res) = self.workers.join_next().await {
            if let Err(e) = res {
                error!("Scan worker failed: {e}");
            }
        }
        ScanSummary::from(self.state.as_ref())
    }
}

async fn worker<I, P, W>(
    targets: Arc<Mutex<I>>,
    prober: Arc<P>,
    sink: Arc<ResultSink<W>>,
    state: Arc<ScanState>,
    retries: u32,
) where
    I: Iterator<Item = Ipv4Addr>,
    P: Prober + ?Sized,
    W: Write,
{
    while let Some(addr) = next_target(&targets) {
        state.mark_dispatched();

        if probe::probe_with_retry(prober.as_ref(), addr, retries).await != ProbeOutcome::Success {
            continue;
        }
        // Only lines that reached the sink count as successes.
        match sink.record(addr) {
            Ok(()) => state.mark_success(),
            Err(e) => error!("Failed to record {addr}: {e}"),
        }
    }
}

fn next_target<I: Iterator<Item = Ipv4Addr>>(targets: &Mutex<I>) -> Option<Ipv4Addr> {
    targets
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
