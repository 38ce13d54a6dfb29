//! Plain-text rendering for command output.

use std::fmt::Write as _;

use board::MigrationStatus;
use board::safety::{SafetyReport, Status};
use owo_colors::OwoColorize;

fn marker(status: Status, color: bool) -> String {
    let symbol = match status {
        Status::Ok => "✓",
        Status::Warn => "!",
        Status::Fail => "✗",
        Status::Info => "·",
    };
    if !color {
        return symbol.to_owned();
    }
    match status {
        Status::Ok => symbol.green().to_string(),
        Status::Warn => symbol.yellow().to_string(),
        Status::Fail => symbol.red().to_string(),
        Status::Info => symbol.dimmed().to_string(),
    }
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_owned()
    }
}

/// One block per section, then a failure/warning tally.
pub fn render_report(report: &SafetyReport, color: bool) -> String {
    let mut out = String::new();
    for section in &report.sections {
        let _ = writeln!(out, "{}", heading(section.title, color));
        for finding in &section.findings {
            let _ = writeln!(out, "  {} {}", marker(finding.status, color), finding.message);
        }
        out.push('\n');
    }
    let _ = write!(
        out,
        "failures: {}, warnings: {}",
        report.count(Status::Fail),
        report.count(Status::Warn)
    );
    out
}

pub fn render_status(statuses: &[MigrationStatus], color: bool) -> String {
    let width = statuses.iter().map(|s| s.version.len()).max().unwrap_or(0);
    let lines: Vec<String> = statuses
        .iter()
        .map(|s| match s.applied_at {
            Some(at) => format!(
                "{} {:width$}  applied {}",
                marker(Status::Ok, color),
                s.version,
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None if s.applied => format!("{} {}", marker(Status::Ok, color), s.version),
            None => format!(
                "{} {:width$}  pending",
                marker(Status::Warn, color),
                s.version
            ),
        })
        .collect();

    if lines.is_empty() {
        "no migrations registered".to_owned()
    } else {
        lines.join("\n")
    }
}

pub fn render_flags<'a>(flags: impl IntoIterator<Item = (&'a str, bool)>, color: bool) -> String {
    let flags: Vec<(&str, bool)> = flags.into_iter().collect();
    let width = flags.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    flags
        .iter()
        .map(|&(name, on)| {
            let (status, word) = if on {
                (Status::Ok, "on")
            } else {
                (Status::Info, "off")
            };
            format!("{} {name:width$}  {word}", marker(status, color))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
