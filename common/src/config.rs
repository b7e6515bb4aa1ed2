use std::time::Duration;

use rustls::pki_types::ServerName;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(3_000);
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Parameters of a scan, frozen before the first probe goes out.
///
/// Fields are private so a constructed config cannot drift; every value has
/// already been validated by [`ScanConfig::new`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    host: String,
    server_name: ServerName<'static>,
    connect_timeout: Duration,
    handshake_timeout: Duration,
    retries: u32,
    concurrency: usize,
}

impl ScanConfig {
    pub fn new(
        host: impl Into<String>,
        connect_timeout: Duration,
        handshake_timeout: Duration,
        retries: u32,
        concurrency: usize,
    ) -> Result<Self, ConfigError> {
        let host: String = host.into();
        let server_name = parse_server_name(&host)?;

        if connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("connect"));
        }
        if handshake_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("handshake"));
        }
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(Self {
            host,
            server_name,
            connect_timeout,
            handshake_timeout,
            retries,
            concurrency,
        })
    }

    /// The SNI host name requested during every handshake.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    /// Extra attempts allowed after an indeterminate first probe.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// Only DNS names are accepted: an IP literal would suppress the SNI extension.
fn parse_server_name(host: &str) -> Result<ServerName<'static>, ConfigError> {
    match ServerName::try_from(host.to_string()) {
        Ok(name @ ServerName::DnsName(_)) => Ok(name),
        _ => Err(ConfigError::InvalidHost(host.to_string())),
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
