//! Reader for registry-delegation statistics files.
//!
//! Rows are pipe-delimited, e.g. `apnic|JP|ipv4|1.0.16.0|4096|20100101|allocated`.
//! Only IPv4 rows with a concrete country code are kept.
//!
//! The fifth column is a literal number of addresses. It is not a prefix
//! exponent and is not required to be a power of two.

use std::io::BufRead;
use std::net::Ipv4Addr;

use tracing::{debug, trace};

use crate::error::{RangeError, RegistryError};
use crate::network::range::Ipv4Range;

const REGISTRY: &str = "apnic";
const ADDRESS_FAMILY: &str = "ipv4";
const MIN_FIELDS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRecord {
    pub country: String,
    pub start_addr: Ipv4Addr,
    pub count: u32,
    /// 1-based line in the source file, kept for error messages.
    pub line: usize,
}

impl RegistryRecord {
    pub fn to_range(&self) -> Result<Ipv4Range, RangeError> {
        Ipv4Range::new(self.start_addr, u64::from(self.count))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryReader {
    records: Vec<RegistryRecord>,
}

impl RegistryReader {
    /// Reads every candidate row. Fails if a candidate row is malformed or
    /// if the file holds no candidate rows at all.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, RegistryError> {
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(record) = parse_row(&line, idx + 1)? {
                records.push(record);
            }
        }

        if records.is_empty() {
            return Err(RegistryError::NoRecords);
        }
        debug!("Loaded {} registry delegations", records.len());
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, or only those of one country code (ASCII case-insensitive).
    pub fn records<'a>(
        &'a self,
        country: Option<&'a str>,
    ) -> impl Iterator<Item = &'a RegistryRecord> + 'a {
        self.records.iter().filter(move |record| match country {
            Some(cc) => record.country.eq_ignore_ascii_case(cc),
            None => true,
        })
    }
}

fn parse_row(line: &str, line_no: usize) -> Result<Option<RegistryRecord>, RegistryError> {
    let fields: Vec<&str> = line.trim().split('|').collect();
    let is_candidate = fields.len() >= MIN_FIELDS
        && fields[0] == REGISTRY
        && fields[2] == ADDRESS_FAMILY
        && fields[1] != "*";
    if !is_candidate {
        trace!("Skipping registry line {line_no}");
        return Ok(None);
    }

    let row_error = |source: RangeError| RegistryError::Row {
        line: line_no,
        source,
    };

    let start_addr = fields[3]
        .parse::<Ipv4Addr>()
        .map_err(|_| row_error(RangeError::InvalidAddress(fields[3].to_string())))?;
    let count = fields[4]
        .parse::<u32>()
        .map_err(|_| row_error(RangeError::InvalidCount(fields[4].to_string())))?;

    Ok(Some(RegistryRecord {
        country: fields[1].to_string(),
        start_addr,
        count,
        line: line_no,
    }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
