//! Report Module
//!
//! End-of-run summaries: a short human table on stderr, or the full
//! `RunReport` as JSON.

use crate::conversion::RunReport;
use console::style;
use std::time::Duration;

/// Megabytes with one decimal, e.g. `2.4MB`.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / 1024.0 / 1024.0)
}

pub fn print_summary_report(report: &RunReport, duration: Duration) {
    let tally = &report.tally;
    let label = if report.tag == crate::optimize_batch::OPTIMIZE_TAG {
        "Optimized"
    } else {
        "Converted"
    };

    eprintln!();
    eprintln!("{}", style(format!("[{}] Summary", report.tag)).bold());
    eprintln!("  Files:     {:>6}", tally.total);
    eprintln!("  {:<10} {:>6}", format!("{}:", label), style(tally.converted).green());
    eprintln!("  Skipped:   {:>6}", style(tally.skipped).dim());
    eprintln!("  Failed:    {:>6}", style(tally.failed).red());
    eprintln!("  Time:      {:>5.1}s", duration.as_secs_f64());

    let (before, after) = report
        .outcomes
        .iter()
        .filter(|o| o.is_converted())
        .filter_map(|o| Some((o.input_size?, o.output_size?)))
        .fold((0u64, 0u64), |(b, a), (i, o)| (b + i, a + o));
    if before > 0 {
        eprintln!(
            "  Size:      {} → {} (saved {})",
            format_mb(before),
            format_mb(after),
            format_mb(before.saturating_sub(after))
        );
    }

    if !tally.errors.is_empty() {
        eprintln!();
        eprintln!("{}", style("Errors encountered:").red().bold());
        for (path, error) in &tally.errors {
            eprintln!("   {} → {}", path.display(), error);
        }
    }
}

pub fn report_to_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
