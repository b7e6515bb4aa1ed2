//! Typed errors raised while turning user input into a scan.
//!
//! All of these surface before the first probe is dispatched. Network
//! failures during the scan are never errors; they become probe outcomes.

use std::net::Ipv4Addr;

use thiserror::Error;

/// A single range notation that could not be turned into addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    #[error("invalid prefix length '{0}', expected 0-32")]
    InvalidPrefix(String),

    #[error("invalid address count '{0}'")]
    InvalidCount(String),

    #[error("range end {end} precedes start {start}")]
    Reversed { start: Ipv4Addr, end: Ipv4Addr },

    #[error("{len} addresses starting at {start} run past 255.255.255.255")]
    Overflow { start: Ipv4Addr, len: u64 },
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("line {line} ('{text}') is not a valid target")]
    Parse {
        line: usize,
        text: String,
        #[source]
        source: RangeError,
    },

    #[error("failed to read target list")]
    Io(#[from] std::io::Error),

    #[error("target list is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry line {line} has an unusable address block")]
    Row {
        line: usize,
        #[source]
        source: RangeError,
    },

    #[error("failed to read registry list")]
    Io(#[from] std::io::Error),

    #[error("registry list contains no IPv4 delegations")]
    NoRecords,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("'{0}' is not a valid TLS server name")]
    InvalidHost(String),

    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),
}
