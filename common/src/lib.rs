//! Shared building blocks for `sniscan`.
//!
//! Everything in here is free of network I/O: address arithmetic, parsing of
//! target lists and registry-delegation files, and the frozen scan
//! configuration handed to the engine.

pub mod config;
pub mod error;
pub mod network;
