//! The connect-then-handshake probe against port 443.

use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tracing::trace;

use sniscan_common::config::ScanConfig;
use sniscan_protocols::tls::{self, HandshakeFailure};

use crate::probe::{ProbeOutcome, Prober};

pub const HTTPS_PORT: u16 = 443;

/// Probes one address by opening TCP to it and running a TLS 1.2 client
/// handshake that requests the configured server name.
///
/// Sockets and TLS sessions are owned by the probe future and dropped on
/// every return path.
pub struct TlsProber {
    connector: TlsConnector,
    server_name: ServerName<'static>,
    connect_timeout: Duration,
    handshake_timeout: Duration,
    port: u16,
}

impl TlsProber {
    pub fn new(cfg: &ScanConfig) -> anyhow::Result<Self> {
        Ok(Self {
            connector: tls::connector()?,
            server_name: cfg.server_name().clone(),
            connect_timeout: cfg.connect_timeout(),
            handshake_timeout: cfg.handshake_timeout(),
            port: HTTPS_PORT,
        })
    }

    /// Redirects probes to another port. Used against loopback test peers.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bounds `connect` by the connect timeout.
    async fn connect_within<C>(&self, addr: Ipv4Addr, connect: C) -> Option<TcpStream>
    where
        C: Future<Output = io::Result<TcpStream>>,
    {
        match timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => Some(stream),
            Ok(Err(e)) => {
                trace!("{addr}: connect failed: {e}");
                None
            }
            Err(_elapsed) => {
                trace!("{addr}: connect timed out");
                None
            }
        }
    }

    /// Runs one attempt over the stream produced by `connect`.
    async fn probe_via<C>(&self, addr: Ipv4Addr, connect: C) -> ProbeOutcome
    where
        C: Future<Output = io::Result<TcpStream>>,
    {
        let Some(stream) = self.connect_within(addr, connect).await else {
            return ProbeOutcome::Indeterminate;
        };

        let handshake = self.connector.connect(self.server_name.clone(), stream);
        match timeout(self.handshake_timeout, handshake).await {
            Ok(Ok(_session)) => ProbeOutcome::Success,
            Ok(Err(e)) => match tls::classify_handshake_error(&e) {
                HandshakeFailure::Rejected => ProbeOutcome::Rejected,
                HandshakeFailure::Transport => ProbeOutcome::Indeterminate,
            },
            Err(_elapsed) => {
                trace!("{addr}: handshake timed out");
                ProbeOutcome::Indeterminate
            }
        }
    }
}

#[async_trait]
impl Prober for TlsProber {
    async fn probe(&self, addr: Ipv4Addr) -> ProbeOutcome {
        let socket_addr = SocketAddr::new(IpAddr::V4(addr), self.port);
        self.probe_via(addr, TcpStream::connect(socket_addr)).await
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
