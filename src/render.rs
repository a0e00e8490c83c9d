//! Text and JSON output of a ranking.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use crossterm::style::{StyledContent, Stylize};
use serde::Serialize;

use bigdirs_analyze::{CategoryShare, Delta, RankedDirectory, TopReport};
use bigdirs_core::{DirStatus, ScanOutcome, SkipReason};

/// Label printed above results of an interrupted scan.
pub const PARTIAL_LABEL: &str = "(partial results — scan interrupted)";

/// Human-oriented report.
pub struct TextRenderer {
    color: bool,
    now: SystemTime,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            now: SystemTime::now(),
        }
    }

    pub fn render<W: Write>(
        &self,
        out: &mut W,
        outcome: &ScanOutcome,
        report: &TopReport,
    ) -> io::Result<()> {
        if outcome.is_partial() {
            writeln!(out, "{}", self.paint(PARTIAL_LABEL.yellow().bold()))?;
        }

        let compared = match report.compared_to {
            Some(taken) => format!(
                " (compared with snapshot from {})",
                self.since(taken).map_or_else(
                    || taken.to_rfc3339(),
                    |age| format!("{} ago", format_age(age))
                )
            ),
            None => String::new(),
        };
        writeln!(
            out,
            "Top {} largest directories in '{}'{}:",
            report.directories.len(),
            outcome.root.display(),
            compared
        )?;

        if report.is_empty() {
            writeln!(out, "  No directories found.")?;
        }

        for dir in &report.directories {
            self.render_directory(out, dir)?;
        }

        writeln!(out)?;
        let mut summary = format!(
            "{} directories in {:.2}s",
            outcome.dir_count(),
            outcome.scan_duration.as_secs_f64()
        );
        if outcome.has_warnings() {
            summary.push_str(&format!(", {} warning(s)", outcome.warnings.len()));
        }
        writeln!(out, "{summary}")
    }

    fn render_directory<W: Write>(&self, out: &mut W, dir: &RankedDirectory) -> io::Result<()> {
        let delta = match dir.delta {
            Some(delta) => format!(" {:>12}", self.delta(delta)),
            None => String::new(),
        };
        writeln!(
            out,
            "{:>3}. {:>12}{}  {}{}",
            dir.rank,
            format_size(dir.total_size),
            delta,
            self.paint(dir.path.display().to_string().bold()),
            status_note(dir.status)
        )?;

        let mut details = format!(
            "File types: {}",
            format_composition(&dir.composition, dir.total_size)
        );
        if let Some(age) = dir.newest_modified.and_then(|t| self.now.duration_since(t).ok()) {
            details.push_str(&format!(" | newest file {} ago", format_age(age)));
        }
        writeln!(out, "       -> {details}")
    }

    fn delta(&self, delta: Delta) -> String {
        let text = format_delta(delta);
        match delta {
            Delta::New => self.paint(text.cyan()),
            Delta::Changed(bytes) if bytes > 0 => self.paint(text.red()),
            Delta::Changed(bytes) if bytes < 0 => self.paint(text.green()),
            Delta::Changed(_) => text,
        }
    }

    fn since(&self, then: DateTime<Utc>) -> Option<Duration> {
        (DateTime::<Utc>::from(self.now) - then).to_std().ok()
    }

    fn paint<D: Display>(&self, styled: StyledContent<D>) -> String {
        if self.color {
            styled.to_string()
        } else {
            styled.content().to_string()
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    completed: bool,
    directories_scanned: usize,
    warnings: usize,
    scan_duration_secs: f64,
    compared_to: Option<DateTime<Utc>>,
    top: &'a [RankedDirectory],
}

/// Machine-readable report.
pub fn render_json<W: Write>(
    mut out: W,
    outcome: &ScanOutcome,
    report: &TopReport,
) -> serde_json::Result<()> {
    let json = JsonReport {
        root: &outcome.root,
        completed: outcome.completed,
        directories_scanned: outcome.dir_count(),
        warnings: outcome.warnings.len(),
        scan_duration_secs: outcome.scan_duration.as_secs_f64(),
        compared_to: report.compared_to,
        top: &report.directories,
    };
    serde_json::to_writer_pretty(&mut out, &json)?;
    writeln!(out).map_err(serde_json::Error::io)
}

fn status_note(status: DirStatus) -> &'static str {
    match status {
        DirStatus::Scanned => "",
        DirStatus::Skipped(SkipReason::Slow) => " (partial: too slow)",
        DirStatus::Skipped(SkipReason::ReadFailed) => " (unreadable)",
        DirStatus::Skipped(SkipReason::Excluded) => " (excluded)",
        DirStatus::Duplicate => " (duplicate)",
    }
}

/// Format size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Signed size change, or "new".
pub fn format_delta(delta: Delta) -> String {
    match delta {
        Delta::New => "new".to_string(),
        Delta::Changed(bytes) if bytes < 0 => format!("-{}", format_size(bytes.unsigned_abs())),
        Delta::Changed(bytes) => format!("+{}", format_size(bytes.unsigned_abs())),
    }
}

/// "80.00% Video, 20.00% Image", or "No files" for an empty directory.
pub fn format_composition(shares: &[CategoryShare], total_size: u64) -> String {
    if total_size == 0 {
        return "No files".to_string();
    }
    if shares.is_empty() {
        return "unclassified".to_string();
    }
    shares
        .iter()
        .map(|s| format!("{:.2}% {}", s.percent, s.category))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coarse age, e.g. "3 days".
pub fn format_age(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs} seconds")
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if secs < 86400 {
        format!("{} hours", secs / 3600)
    } else if secs < 2592000 {
        format!("{} days", secs / 86400)
    } else if secs < 31536000 {
        format!("{} months", secs / 2592000)
    } else {
        format!("{:.1} years", secs as f64 / 31536000.0)
    }
}
