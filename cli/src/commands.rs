pub mod input;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sniscan_common::config::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_HOST,
    DEFAULT_RETRIES, ScanConfig,
};
use sniscan_common::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "sniscan", version)]
#[command(about = "Finds IPv4 hosts that complete a TLS handshake for a chosen SNI name.")]
pub struct CommandLine {
    /// Server name to request in every handshake
    #[arg(short = 'n', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Connect and handshake timeouts, in milliseconds
    #[arg(
        short = 't',
        long,
        num_args = 2,
        value_names = ["CONNECT_MS", "HANDSHAKE_MS"]
    )]
    pub timeout: Option<Vec<u64>>,

    /// Number of probes in flight at once
    #[arg(short = 'p', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub parallels: usize,

    /// Extra attempts after a timeout or reset
    #[arg(short = 'r', long, default_value_t = DEFAULT_RETRIES)]
    pub retry: u32,

    /// APNIC delegation file to take ranges from
    #[arg(short = 'a', long, value_name = "FILE")]
    pub apnic: Option<PathBuf>,

    /// Country code filter for --apnic
    #[arg(short = 'c', long, value_name = "CODE", requires = "apnic")]
    pub cc: Option<String>,

    /// Target list, or `stdin`
    #[arg(short = 'i', long = "in", value_name = "FILE|stdin")]
    pub input: Option<String>,

    /// Output file, or `null` for a throwaway file
    #[arg(short = 'o', long, value_name = "FILE|null")]
    pub out: Option<String>,

    /// Hide the banner and the live list of hits
    #[arg(short, long)]
    pub quiet: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Nothing to scan was named and nothing is piped in.
    pub fn lacks_targets(&self, stdin_is_terminal: bool) -> bool {
        self.input.is_none() && self.apnic.is_none() && stdin_is_terminal
    }

    pub fn to_config(&self) -> Result<ScanConfig, ConfigError> {
        let (connect, handshake) = match self.timeout.as_deref() {
            Some([connect, handshake]) => (
                Duration::from_millis(*connect),
                Duration::from_millis(*handshake),
            ),
            _ => (DEFAULT_CONNECT_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT),
        };

        ScanConfig::new(
            self.host.trim(),
            connect,
            handshake,
            self.retry,
            self.parallels,
        )
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
