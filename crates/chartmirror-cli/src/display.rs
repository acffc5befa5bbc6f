//! Display formatting for CLI output

use chartmirror_scan::{RewriteReport, ScanOutcome, Strategy};
use console::style;
use std::path::Path;

/// Print the images found in a chart, one block per image
pub fn print_scan(chart: &Path, outcome: &ScanOutcome) {
    let source = match outcome.strategy {
        Strategy::Manifest => style("rendered manifests").green(),
        Strategy::Values => style("values tree").yellow(),
    };
    println!(
        "{} {} (from {})",
        style("Chart").cyan().bold(),
        chart.display(),
        source
    );

    if let Some(error) = &outcome.render_error {
        println!("  {} rendering failed: {}", style("⚠").yellow(), error);
    }

    if outcome.discovery.is_empty() {
        println!("  {}", style("No images found").dim());
        return;
    }

    for finding in outcome.discovery.findings() {
        println!();
        println!("  {}", style(finding.image.reference()).bold());
        for path in &finding.paths {
            println!("    {} {}", style("at").dim(), path);
        }
    }

    println!();
    let distinct = outcome.discovery.images().len();
    print!("{} image(s)", distinct);
    if outcome.discovery.skipped() > 0 {
        print!(
            ", {} item(s) skipped",
            style(outcome.discovery.skipped()).yellow()
        );
    }
    println!();
}

/// Summarize a rewrite on stderr, keeping stdout for the rewritten YAML
pub fn print_rewrite(destination: &str, report: &RewriteReport, written_to: Option<&Path>) {
    for path in &report.rewritten {
        eprintln!("{} {}", style("rewrote").green(), path);
    }
    for path in &report.skipped {
        eprintln!(
            "{} {} (not a valid image reference)",
            style("skipped").yellow(),
            path
        );
    }

    let target = written_to
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default();
    eprintln!(
        "{} {} field(s) now point at {}{}",
        style("✓").green().bold(),
        report.rewritten.len(),
        style(destination).cyan(),
        target
    );
}
