//! Wire-level plumbing for the probe engine.

pub mod tls;
