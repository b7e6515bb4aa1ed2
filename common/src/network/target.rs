//! # Scan Target Model
//!
//! Parses target-list input into address ranges.
//!
//! Each non-blank line holds one of:
//! * A single address (e.g., `192.168.1.1`).
//! * An inclusive range (e.g., `192.168.1.0-192.168.1.255`).
//! * A CIDR-style block (e.g., `192.168.1.0/24`).
//! * A base address plus a count (e.g., `192.168.1.0|256`).
//!
//! Lines starting with `#` or `//` are comments.

use std::io::BufRead;
use std::iter::Flatten;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::vec;

use tracing::debug;

use crate::error::{RangeError, RegistryError, TargetError};
use crate::network::range::Ipv4Range;
use crate::network::registry::RegistryRecord;

/// One line of target-list input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    Single(Ipv4Addr),
    Inclusive { start: Ipv4Addr, end: Ipv4Addr },
    Cidr { base: Ipv4Addr, prefix: u8 },
    Count { base: Ipv4Addr, count: u32 },
}

impl RangeSpec {
    pub fn to_range(&self) -> Result<Ipv4Range, RangeError> {
        match *self {
            RangeSpec::Single(addr) => Ok(Ipv4Range::single(addr)),
            RangeSpec::Inclusive { start, end } => Ipv4Range::inclusive(start, end),
            RangeSpec::Cidr { base, prefix } => Ipv4Range::cidr(base, prefix),
            RangeSpec::Count { base, count } => Ipv4Range::new(base, u64::from(count)),
        }
    }
}

impl FromStr for RangeSpec {
    type Err = RangeError;

    /// Separators are tried in the order `-`, `/`, `|`; a line with none of
    /// them must be a bare address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((start, end)) = s.split_once('-') {
            return Ok(RangeSpec::Inclusive {
                start: parse_addr(start)?,
                end: parse_addr(end)?,
            });
        }

        if let Some((base, prefix)) = s.split_once('/') {
            let prefix = prefix.trim();
            let prefix = prefix
                .parse::<u8>()
                .ok()
                .filter(|p| *p <= 32)
                .ok_or_else(|| RangeError::InvalidPrefix(prefix.to_string()))?;
            return Ok(RangeSpec::Cidr {
                base: parse_addr(base)?,
                prefix,
            });
        }

        if let Some((base, count)) = s.split_once('|') {
            let count = count.trim();
            let count = count
                .parse::<u32>()
                .map_err(|_| RangeError::InvalidCount(count.to_string()))?;
            return Ok(RangeSpec::Count {
                base: parse_addr(base)?,
                count,
            });
        }

        Ok(RangeSpec::Single(parse_addr(s)?))
    }
}

fn parse_addr(s: &str) -> Result<Ipv4Addr, RangeError> {
    let s = s.trim();
    s.parse::<Ipv4Addr>()
        .map_err(|_| RangeError::InvalidAddress(s.to_string()))
}

/// Returns `true` for lines that carry no target.
pub fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#') || line.starts_with("//")
}

/// Expands one line of input, or `None` for blanks and comments.
pub fn parse_line(line: &str) -> Result<Option<Ipv4Range>, RangeError> {
    if is_skippable(line) {
        return Ok(None);
    }
    let spec: RangeSpec = line.parse()?;
    spec.to_range().map(Some)
}

/// Every range queued for a scan, in load order.
///
/// The list stores ranges, never addresses; the address sequence is
/// produced lazily when the list is iterated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    ranges: Vec<Ipv4Range>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        if !range.is_empty() {
            self.ranges.push(range);
        }
    }

    /// Appends every range found in `reader`.
    ///
    /// Fails on the first malformed line; nothing from that reader is kept
    /// in that case.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<u64, TargetError> {
        let mut parsed: Vec<Ipv4Range> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let range = parse_line(&line).map_err(|source| TargetError::Parse {
                line: idx + 1,
                text: line.trim().to_string(),
                source,
            })?;
            if let Some(range) = range {
                parsed.push(range);
            }
        }

        let added: u64 = parsed.iter().map(Ipv4Range::len).sum();
        debug!("Parsed {} ranges holding {added} addresses", parsed.len());
        parsed.into_iter().for_each(|range| self.add_range(range));
        Ok(added)
    }

    /// Appends the blocks of the given registry records.
    pub fn extend_from_registry<'a, I>(&mut self, records: I) -> Result<u64, RegistryError>
    where
        I: IntoIterator<Item = &'a RegistryRecord>,
    {
        let mut added: u64 = 0;
        for record in records {
            let range = record.to_range().map_err(|source| RegistryError::Row {
                line: record.line,
                source,
            })?;
            added += range.len();
            self.add_range(range);
        }
        Ok(added)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TargetError> {
        let mut list = Self::new();
        list.extend_from_reader(reader)?;
        Ok(list)
    }

    /// Total number of addresses, computed without enumerating them.
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(Ipv4Range::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[Ipv4Range] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.ranges.iter().flat_map(Ipv4Range::iter)
    }
}

impl IntoIterator for TargetList {
    type Item = Ipv4Addr;
    type IntoIter = Flatten<vec::IntoIter<Ipv4Range>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter().flatten()
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
