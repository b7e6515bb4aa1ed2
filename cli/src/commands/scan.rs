use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use colored::*;
use tracing::{Instrument, info, info_span};

use sniscan_common::config::ScanConfig;
use sniscan_common::network::target::TargetList;
use sniscan_core::network::tls::TlsProber;
use sniscan_core::progress::{ProgressReporter, REPORT_INTERVAL};
use sniscan_core::scanner::{ScanSummary, Scheduler};
use sniscan_core::sink::ResultSink;

use crate::commands::{CommandLine, input};
use crate::mprint;
use crate::terminal::title::TitleGuard;
use crate::terminal::{colors, print, progress};

const KEY_WIDTH: usize = 10;

pub async fn scan(cmd: &CommandLine) -> anyhow::Result<()> {
    let cfg: ScanConfig = cmd.to_config().context("invalid scan parameters")?;
    let targets: TargetList = input::load_targets(cmd)?;
    let out_path = input::resolve_output_path(cmd.out.as_deref(), Local::now());

    print_parameters(&cfg, &targets, &out_path, cmd.quiet);

    let prober = Arc::new(TlsProber::new(&cfg).context("failed to build TLS client")?);
    let quiet = cmd.quiet;
    let sink = ResultSink::create(&out_path)
        .with_context(|| format!("failed to create output file {}", out_path.display()))?
        .with_echo(move |addr| {
            if !quiet {
                info!("{}", hit_line(addr));
            }
        });

    print::header("scanning", quiet);

    let span = info_span!("scan", indicatif.pb_show = true);
    progress::attach_bar(&span, targets.len());

    let title = TitleGuard::new(&format!("sniscan | {}", cfg.host()));
    let set_title = title.setter();
    let host = cfg.host().to_string();
    let bar_span = span.clone();

    let total = targets.len();
    let handle = Scheduler::new(&cfg).start(targets, total, prober, Arc::new(sink));
    let reporter = ProgressReporter::spawn(handle.state(), REPORT_INTERVAL, move |snapshot| {
        progress::update_bar(&bar_span, &snapshot);
        set_title(&format!("sniscan | {host} | {}", progress::status_line(&snapshot)));
    });

    let summary = handle.join().instrument(span).await;
    reporter.stop().await;
    drop(title);

    print_summary(&summary, &out_path, quiet);
    Ok(())
}

fn hit_line(addr: Ipv4Addr) -> String {
    addr.to_string().color(colors::IPV4_ADDR).to_string()
}

fn print_parameters(cfg: &ScanConfig, targets: &TargetList, out_path: &Path, quiet: bool) {
    if quiet {
        return;
    }

    print::header("scan parameters", quiet);
    print::aligned_line("Host", cfg.host(), KEY_WIDTH);
    print::aligned_line(
        "Targets",
        format!("{} addresses in {} ranges", targets.len(), targets.ranges().len()),
        KEY_WIDTH,
    );
    print::aligned_line(
        "Timeouts",
        format!(
            "{}ms connect, {}ms handshake",
            cfg.connect_timeout().as_millis(),
            cfg.handshake_timeout().as_millis()
        ),
        KEY_WIDTH,
    );
    print::aligned_line("Parallels", cfg.concurrency().to_string(), KEY_WIDTH);
    print::aligned_line("Retries", cfg.retries().to_string(), KEY_WIDTH);
    print::aligned_line(
        "Output",
        out_path.display().to_string().color(colors::ACCENT),
        KEY_WIDTH,
    );
}

fn print_summary(summary: &ScanSummary, out_path: &Path, quiet: bool) {
    let hits: ColoredString = format!("{}/{}", summary.successes, summary.total)
        .bold()
        .green();
    let total_time: ColoredString = format!("{:.2}s", summary.elapsed.as_secs_f64())
        .bold()
        .yellow();
    let output = format!("Complete: {hits} hosts accepted in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    if quiet {
        info!("{output}");
    } else {
        mprint!();
        print::fat_separator();
        print::centerln(&output);
    }

    if input::is_discarded(out_path) {
        info!("Results were written to the scratch file {}", out_path.display());
    } else {
        info!("Results saved to {}", out_path.display());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_line_colors_the_address() {
        colored::control::set_override(false);
        let plain = hit_line(Ipv4Addr::new(203, 0, 113, 7));
        colored::control::set_override(true);
        let painted = hit_line(Ipv4Addr::new(203, 0, 113, 7));
        colored::control::unset_override();

        assert_eq!(plain, "203.0.113.7");
        assert!(painted.contains("203.0.113.7"));
        assert!(painted.starts_with("\u{1b}["));
    }
}
