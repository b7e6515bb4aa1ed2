//! Resolves where targets come from and where hits go.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use tracing::debug;

use sniscan_common::error::TargetError;
use sniscan_common::network::registry::RegistryReader;
use sniscan_common::network::target::TargetList;

use crate::commands::CommandLine;

const STDIN_MARKER: &str = "stdin";
const DISCARD_MARKER: &str = "null";
const DISCARD_FILE: &str = "sni_temp.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// `--in stdin` reads standard input explicitly. Without `--in`, piped
    /// standard input is used when it is not a terminal.
    pub fn resolve(arg: Option<&str>, stdin_is_terminal: bool) -> Option<Self> {
        match arg.map(str::trim) {
            Some(arg) if arg.eq_ignore_ascii_case(STDIN_MARKER) => Some(InputSource::Stdin),
            Some(path) => Some(InputSource::File(PathBuf::from(path))),
            None if !stdin_is_terminal => Some(InputSource::Stdin),
            None => None,
        }
    }
}

/// Builds the target list: registry ranges first, then the `--in` list.
pub fn load_targets(cmd: &CommandLine) -> anyhow::Result<TargetList> {
    let input = InputSource::resolve(cmd.input.as_deref(), io::stdin().is_terminal());
    let mut targets = TargetList::new();

    if let Some(path) = &cmd.apnic {
        let file = File::open(path)
            .with_context(|| format!("failed to open registry file {}", path.display()))?;
        add_registry(&mut targets, BufReader::new(file), cmd.cc.as_deref())
            .with_context(|| format!("failed to read registry list {}", path.display()))?;
    }

    match input {
        Some(InputSource::File(path)) => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open target list {}", path.display()))?;
            add_list(&mut targets, BufReader::new(file))
                .with_context(|| format!("failed to parse target list {}", path.display()))?;
        }
        Some(InputSource::Stdin) => {
            add_list(&mut targets, io::stdin().lock())
                .context("failed to parse target list from stdin")?;
        }
        None => {}
    }

    ensure_not_empty(targets)
}

fn add_registry<R: BufRead>(
    targets: &mut TargetList,
    reader: R,
    country: Option<&str>,
) -> anyhow::Result<()> {
    let registry = RegistryReader::load(reader)?;
    let added = targets.extend_from_registry(registry.records(country))?;
    debug!(
        "Registry: {} records, {added} addresses for {}",
        registry.len(),
        country.unwrap_or("all countries")
    );
    Ok(())
}

fn add_list<R: BufRead>(targets: &mut TargetList, reader: R) -> anyhow::Result<()> {
    let added = targets.extend_from_reader(reader)?;
    debug!("Target list: {added} addresses");
    Ok(())
}

fn ensure_not_empty(targets: TargetList) -> anyhow::Result<TargetList> {
    if targets.is_empty() {
        return Err(TargetError::Empty).context("nothing to scan, pass --in or --apnic");
    }
    Ok(targets)
}

/// Default is a timestamped file in the working directory; `null` or an
/// empty argument writes to a scratch file in the temp directory.
pub fn resolve_output_path(out: Option<&str>, now: DateTime<Local>) -> PathBuf {
    match out.map(str::trim) {
        None => PathBuf::from(format!("sni_{}.txt", now.format("%Y%m%d_%H%M%S"))),
        Some(arg) if arg.is_empty() || arg.eq_ignore_ascii_case(DISCARD_MARKER) => {
            std::env::temp_dir().join(DISCARD_FILE)
        }
        Some(path) => PathBuf::from(path),
    }
}

pub fn is_discarded(path: &Path) -> bool {
    path == std::env::temp_dir().join(DISCARD_FILE)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
