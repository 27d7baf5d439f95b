//! CLI output formatting for the pipeline reports.
//!
//! Each report has a `format_*` function returning lines (pure, testable) and
//! a `print_*` wrapper that writes them to stdout. Diagnostics go through
//! `tracing` on stderr; only these summaries go to stdout.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Source: 3 comics
//! Catalog: 2 comics
//! New
//!     001 b.png
//!     002 c.png
//! Missing dimensions: 1
//! ```
//!
//! ## Build
//!
//! ```text
//! Catalog: 3 comics (1 new)
//!     + c.png
//! Images: 1 published, 2 already present
//! Pages: 4 written
//! ```

use crate::pipeline::{BuildReport, CheckReport, PublishReport, RenderReport, SyncReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn numbered_list(heading: &str, names: &[String], lines: &mut Vec<String>) {
    if names.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    for (i, name) in names.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), name));
    }
}

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![
        format!("Source: {}", plural(report.scanned, "comic")),
        format!("Catalog: {}", plural(report.tracked, "comic")),
    ];
    numbered_list("New", &report.new, &mut lines);
    if report.missing_dimensions > 0 {
        lines.push(format!("Missing dimensions: {}", report.missing_dimensions));
    }
    numbered_list("Source missing", &report.orphaned, &mut lines);
    if report.new.is_empty() && report.missing_dimensions == 0 {
        lines.push("Catalog is up to date".to_string());
    }
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut detail = Vec::new();
    if !report.added.is_empty() {
        detail.push(format!("{} new", report.added.len()));
    }
    if report.backfilled > 0 {
        detail.push(format!("{} measured", report.backfilled));
    }

    let mut header = format!("Catalog: {}", plural(report.total, "comic"));
    if !detail.is_empty() {
        header.push_str(&format!(" ({})", detail.join(", ")));
    }

    let mut lines = vec![header];
    for name in &report.added {
        lines.push(format!("{}+ {}", indent(1), name));
    }
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    for line in format_sync_report(report) {
        println!("{}", line);
    }
}

pub fn format_publish_report(report: &PublishReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Images: {} published, {} already present",
        report.published, report.skipped
    )];
    for name in &report.unavailable {
        lines.push(format!("{}! {} (source missing)", indent(1), name));
    }
    lines
}

pub fn print_publish_report(report: &PublishReport) {
    for line in format_publish_report(report) {
        println!("{}", line);
    }
}

pub fn format_render_report(report: &RenderReport) -> Vec<String> {
    vec![format!("Pages: {} written", report.pages)]
}

pub fn print_render_report(report: &RenderReport) {
    for line in format_render_report(report) {
        println!("{}", line);
    }
}

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = format_sync_report(&report.sync);
    lines.extend(format_publish_report(&report.publish));
    lines.extend(format_render_report(&report.render));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}
