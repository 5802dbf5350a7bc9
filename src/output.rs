//! Text and JSON presentation of report tables.

use crate::report::Report;
use clap::ValueEnum;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// One JSON document with an array of row objects per table
    Json,
}

/// Format a report for stdout.
pub fn format_report(report: &Report, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

fn format_text(report: &Report) -> String {
    let mut out = String::new();
    match report {
        Report::Yearly(stats) => {
            let _ = writeln!(out, "{} - {}", report.kind().label(), stats.year);
        }
        Report::Recession(_) => {
            let _ = writeln!(out, "{}", report.kind().label());
        }
    }

    for (name, table) in report.tables() {
        let _ = writeln!(out);
        let _ = writeln!(out, "== {} ({} rows)", name, table.height());
        if table.is_empty() {
            let _ = writeln!(out, "(no matching rows)");
        } else {
            let _ = writeln!(out, "{}", table);
        }
    }
    out
}
