//! Scan engine: the TLS prober, the retry policy, the worker pool that
//! drives it, and the sinks and reporters that observe a running scan.

pub mod network;
pub mod probe;
pub mod progress;
pub mod scanner;
pub mod sink;
