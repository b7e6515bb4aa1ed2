//! Probe outcomes and the retry policy wrapped around a single probe.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use tracing::trace;

/// Result of one attempt against one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    /// The handshake completed for the requested server name.
    Success,
    /// The peer answered but the TLS layer refused; retrying will not help.
    Rejected,
    /// Timeout, reset or other transport failure.
    Indeterminate,
}

impl ProbeOutcome {
    /// `Success` and `Rejected` end the retry loop.
    pub fn is_definitive(self) -> bool {
        !matches!(self, ProbeOutcome::Indeterminate)
    }
}

/// Performs a single connect-and-handshake attempt.
///
/// Implementations must bound every await with a timeout and must never
/// report failure through anything but the returned outcome.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, addr: Ipv4Addr) -> ProbeOutcome;
}

/// Probes `addr` up to `retries + 1` times, stopping at the first
/// definitive outcome.
///
/// Exhausting every attempt yields [`ProbeOutcome::Indeterminate`].
pub async fn probe_with_retry<P>(prober: &P, addr: Ipv4Addr, retries: u32) -> ProbeOutcome
where
    P: Prober + ?Sized,
{
    let mut outcome = ProbeOutcome::Indeterminate;
    for attempt in 0..=retries {
        outcome = prober.probe(addr).await;
        if outcome.is_definitive() {
            break;
        }
        trace!("{addr}: attempt {} of {} indeterminate", attempt + 1, retries + 1);
    }
    outcome
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
