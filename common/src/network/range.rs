//! # IPv4 Range Model
//!
//! A contiguous block of IPv4 addresses, `start` inclusive and `end`
//! exclusive. Addresses are produced on demand, so even a `/0` block costs
//! a few bytes until it is iterated.

use std::iter::Map;
use std::net::Ipv4Addr;
use std::ops::Range;

use crate::error::RangeError;

/// One past the highest IPv4 address, as a 64-bit integer.
pub const ADDRESS_SPACE: u64 = 1 << 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    start: u64,
    end: u64,
}

impl Ipv4Range {
    /// `len` consecutive addresses beginning at `start_addr`.
    pub fn new(start_addr: Ipv4Addr, len: u64) -> Result<Self, RangeError> {
        let start = u64::from(u32::from(start_addr));
        let end = start
            .checked_add(len)
            .filter(|end| *end <= ADDRESS_SPACE)
            .ok_or(RangeError::Overflow {
                start: start_addr,
                len,
            })?;
        Ok(Self { start, end })
    }

    pub fn single(addr: Ipv4Addr) -> Self {
        let start = u64::from(u32::from(addr));
        Self {
            start,
            end: start + 1,
        }
    }

    /// Both endpoints included, as in `10.0.0.5-10.0.0.7`.
    pub fn inclusive(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Result<Self, RangeError> {
        if end_addr < start_addr {
            return Err(RangeError::Reversed {
                start: start_addr,
                end: end_addr,
            });
        }
        let len = u64::from(u32::from(end_addr)) - u64::from(u32::from(start_addr)) + 1;
        Self::new(start_addr, len)
    }

    /// `2^(32 - prefix)` addresses counted from `start_addr` itself.
    ///
    /// The base is not masked down to the network address: `10.0.0.5/30`
    /// covers `10.0.0.5..=10.0.0.8`.
    pub fn cidr(start_addr: Ipv4Addr, prefix: u8) -> Result<Self, RangeError> {
        if prefix > 32 {
            return Err(RangeError::InvalidPrefix(prefix.to_string()));
        }
        Self::new(start_addr, 1u64 << (32 - u32::from(prefix)))
    }

    pub fn start_addr(&self) -> Ipv4Addr {
        to_addr(self.start)
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        (self.start..self.end).contains(&u64::from(u32::from(addr)))
    }

    pub fn iter(&self) -> AddrIter {
        (self.start..self.end).map(to_addr as fn(u64) -> Ipv4Addr)
    }
}

pub type AddrIter = Map<Range<u64>, fn(u64) -> Ipv4Addr>;

impl IntoIterator for Ipv4Range {
    type Item = Ipv4Addr;
    type IntoIter = AddrIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Values are always below [`ADDRESS_SPACE`], so the narrowing is lossless.
fn to_addr(value: u64) -> Ipv4Addr {
    Ipv4Addr::from(value as u32)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
