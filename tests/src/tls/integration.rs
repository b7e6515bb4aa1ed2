#![cfg(test)]
use rcgen::CertifiedKey;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, SupportedProtocolVersion};
use sniscan_common::config::ScanConfig;
use sniscan_core::network::tls::TlsProber;
use sniscan_core::probe::{probe_with_retry, ProbeOutcome, Prober};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_rustls::TlsAcceptor;

/// TLS 1.2 record carrying a fatal `handshake_failure` alert.
const HANDSHAKE_FAILURE_ALERT: [u8; 7] = [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];

const FRONT: &str = "front.example.com";

#[derive(Clone)]
enum Peer {
    /// Closes the socket as soon as it is accepted.
    Hangup,
    /// Accepts and never answers.
    Stall,
    /// Reads the ClientHello and answers with a fatal alert.
    Alert,
    /// Answers the ClientHello like a plain HTTP server.
    NotTls,
    /// Completes a real handshake and reports the SNI it was asked for.
    Tls {
        acceptor: TlsAcceptor,
        sni: mpsc::UnboundedSender<Option<String>>,
    },
}

/// A server holding a self-signed certificate for a name nobody probes for.
fn tls_acceptor(version: &'static SupportedProtocolVersion) -> TlsAcceptor {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["unrelated.invalid".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(&[version])
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Spawns a loopback peer and returns its port and a counter of accepted
/// connections.
async fn spawn_peer(peer: Peer) -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve(peer.clone(), socket));
        }
    });

    (port, accepted)
}

async fn serve(peer: Peer, mut socket: TcpStream) {
    let mut hello = [0u8; 1024];
    match peer {
        Peer::Hangup => drop(socket),
        Peer::Stall => {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        Peer::Alert => {
            let _ = socket.read(&mut hello).await;
            let _ = socket.write_all(&HANDSHAKE_FAILURE_ALERT).await;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Peer::NotTls => {
            let _ = socket.read(&mut hello).await;
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .await;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Peer::Tls { acceptor, sni } => {
            if let Ok(stream) = acceptor.accept(socket).await {
                let _ = sni.send(stream.get_ref().1.server_name().map(str::to_owned));
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn prober(port: u16, handshake_ms: u64) -> TlsProber {
    prober_for("example.com", port, handshake_ms)
}

fn prober_for(host: &str, port: u16, handshake_ms: u64) -> TlsProber {
    let cfg = ScanConfig::new(
        host,
        Duration::from_millis(500),
        Duration::from_millis(handshake_ms),
        0,
        1,
    )
    .unwrap();
    TlsProber::new(&cfg).unwrap().with_port(port)
}

#[tokio::test]
async fn handshake_succeeds_despite_unrelated_certificate() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let peer = Peer::Tls {
        acceptor: tls_acceptor(&rustls::version::TLS12),
        sni: tx,
    };
    let (port, _) = spawn_peer(peer).await;

    let outcome = prober_for(FRONT, port, 2_000).probe(Ipv4Addr::LOCALHOST).await;
    assert_eq!(outcome, ProbeOutcome::Success);

    let requested = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(requested.as_deref(), Some(FRONT));
}

#[tokio::test]
async fn tls13_only_server_is_rejected() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let peer = Peer::Tls {
        acceptor: tls_acceptor(&rustls::version::TLS13),
        sni: tx,
    };
    let (port, accepted) = spawn_peer(peer).await;

    let outcome = probe_with_retry(&prober_for(FRONT, port, 2_000), Ipv4Addr::LOCALHOST, 2).await;
    assert_eq!(outcome, ProbeOutcome::Rejected);
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn alert_from_peer_is_rejected() {
    let (port, _) = spawn_peer(Peer::Alert).await;
    let outcome = prober(port, 2_000).probe(Ipv4Addr::LOCALHOST).await;
    assert_eq!(outcome, ProbeOutcome::Rejected);
}

#[tokio::test]
async fn non_tls_peer_is_rejected() {
    let (port, _) = spawn_peer(Peer::NotTls).await;
    let outcome = prober(port, 2_000).probe(Ipv4Addr::LOCALHOST).await;
    assert_eq!(outcome, ProbeOutcome::Rejected);
}

#[tokio::test]
async fn hangup_is_indeterminate() {
    let (port, _) = spawn_peer(Peer::Hangup).await;
    let outcome = prober(port, 2_000).probe(Ipv4Addr::LOCALHOST).await;
    assert_eq!(outcome, ProbeOutcome::Indeterminate);
}

#[tokio::test]
async fn stalled_peer_is_retried_until_exhausted() {
    let (port, accepted) = spawn_peer(Peer::Stall).await;
    let prober = prober(port, 150);

    let started = Instant::now();
    let outcome = probe_with_retry(&prober, Ipv4Addr::LOCALHOST, 2).await;

    assert_eq!(outcome, ProbeOutcome::Indeterminate);
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn rejection_is_not_retried() {
    let (port, accepted) = spawn_peer(Peer::Alert).await;
    let prober = prober(port, 2_000);

    let outcome = probe_with_retry(&prober, Ipv4Addr::LOCALHOST, 4).await;

    assert_eq!(outcome, ProbeOutcome::Rejected);
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}
