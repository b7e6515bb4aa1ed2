use std::time::Duration;

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use sniscan_core::progress::Progress;

use crate::terminal::logging::SniscanFormatter;

const BAR_TEMPLATE: &str =
    "{spinner:.blue} [{elapsed_precise}] [{bar:32.green/bright_black}] {pos}/{len} {msg}";

/// Installs the global subscriber. Log lines are routed through the
/// indicatif layer so they print above any live progress bar.
pub fn init_logging() {
    let indicatif_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .event_format(SniscanFormatter)
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .init();
}

pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ])
}

/// Attaches a bar of `total` steps to `span`.
pub fn attach_bar(span: &Span, total: u64) {
    span.pb_set_style(&bar_style());
    span.pb_set_length(total);
}

pub fn update_bar(span: &Span, progress: &Progress) {
    span.pb_set_position(progress.processed);
    span.pb_set_message(&bar_message(progress));
}

fn bar_message(progress: &Progress) -> String {
    format!(
        "{} {}",
        format!("{} hits", progress.successes).green().bold(),
        format!("ETA {}", eta(progress)).bright_black()
    )
}

/// Uncolored one-line status, also used for the window title.
pub fn status_line(progress: &Progress) -> String {
    format!(
        "{:.2}% | {} hits | ETA {}",
        progress.fraction() * 100.0,
        progress.successes,
        eta(progress)
    )
}

fn eta(progress: &Progress) -> String {
    progress
        .remaining()
        .map(clock)
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
