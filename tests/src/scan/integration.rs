#![cfg(test)]
use async_trait::async_trait;
use sniscan_common::config::ScanConfig;
use sniscan_common::network::target::TargetList;
use sniscan_core::network::tls::TlsProber;
use sniscan_core::probe::{ProbeOutcome, Prober};
use sniscan_core::scanner::Scheduler;
use sniscan_core::sink::ResultSink;
use std::collections::HashSet;
use std::io::Cursor;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Accepts addresses with an even last octet. Every third call for an odd
/// address times out once before answering, to exercise retries.
#[derive(Default)]
struct EvenOnly {
    calls: AtomicU32,
}

#[async_trait]
impl Prober for EvenOnly {
    async fn probe(&self, addr: Ipv4Addr) -> ProbeOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_micros(200)).await;

        if addr.octets()[3] % 2 == 0 {
            ProbeOutcome::Success
        } else if call % 3 == 0 {
            ProbeOutcome::Indeterminate
        } else {
            ProbeOutcome::Rejected
        }
    }
}

fn recorded(sink: Arc<ResultSink<Vec<u8>>>) -> Vec<Ipv4Addr> {
    let sink = Arc::try_unwrap(sink).ok().unwrap();
    String::from_utf8(sink.into_inner())
        .unwrap()
        .lines()
        .map(|line| line.parse().unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn full_scan_counters_match_output() {
    let list = "\
# lab ranges
10.0.0.0/28

// a counted block and a closed range
10.1.0.250|10
192.168.1.5-192.168.1.9
";
    let targets = TargetList::from_reader(Cursor::new(list)).unwrap();
    let expected: HashSet<Ipv4Addr> = targets.iter().filter(|a| a.octets()[3] % 2 == 0).collect();
    let total = targets.len();
    assert_eq!(total, 16 + 10 + 5);

    for pool in [1, 4, 32] {
        let sink = Arc::new(ResultSink::new(Vec::new()));
        let summary = Scheduler::with_limits(pool, 2)
            .run(targets.clone(), total, Arc::new(EvenOnly::default()), sink.clone())
            .await;

        let hits = recorded(sink);
        assert_eq!(summary.processed, total);
        assert_eq!(summary.successes, hits.len() as u64);
        assert_eq!(hits.iter().copied().collect::<HashSet<_>>(), expected);
    }
}

#[tokio::test]
async fn scan_against_hangup_peer_records_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    let cfg = ScanConfig::new(
        "example.com",
        Duration::from_millis(300),
        Duration::from_millis(300),
        1,
        2,
    )
    .unwrap();
    let prober = Arc::new(TlsProber::new(&cfg).unwrap().with_port(port));
    let targets = TargetList::from_reader(Cursor::new("127.0.0.1\n")).unwrap();
    let sink = Arc::new(ResultSink::new(Vec::new()));

    let summary = Scheduler::new(&cfg)
        .run(targets.clone(), targets.len(), prober, sink.clone())
        .await;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.successes, 0);
    assert!(recorded(sink).is_empty());
}
