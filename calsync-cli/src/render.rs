//! TUI rendering traits for calsync types.
//!
//! Extension traits that add colored terminal rendering to calsync-core
//! types using owo_colors.

use calsync_core::diff::{DiffKind, EventDiff, SyncPlan};
use calsync_core::sync::{OperationOutcome, OutcomeStatus, SyncReport};
use calsync_core::{CalendarProfile, OperationKind};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

/// Colorize text according to the diff kind
fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for EventDiff {
    fn render(&self) -> String {
        let Some(event) = self.event() else {
            return self.kind.render();
        };
        let summary = colorize_diff(self.kind, &format!("\"{}\"", event.summary));
        let uid = event.uid().unwrap_or_default();

        format!(
            "{} {} {} {}",
            self.kind.render(),
            summary,
            event.start.to_string().dimmed(),
            uid.dimmed()
        )
    }
}

impl Render for OperationOutcome {
    fn render(&self) -> String {
        let line = self.to_string();
        match &self.status {
            OutcomeStatus::Succeeded => format!("{} {}", "✓".green(), line),
            OutcomeStatus::Conflict => format!("{} {}", "!".yellow(), line.yellow()),
            OutcomeStatus::Failed(_) => format!("{} {}", "✗".red(), line.red()),
        }
    }
}

pub fn render_calendar(name: &str, profile: &CalendarProfile) -> String {
    format!("📅 {} {}", name, format!("(@{})", profile.domain).dimmed())
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

/// Planned changes, one line per event unless there are many and verbose is off.
pub fn render_plan(plan: &SyncPlan, verbose: bool) -> String {
    if plan.is_empty() {
        return "   No changes".dimmed().to_string();
    }

    let diffs = plan.diffs();
    let mut lines = Vec::new();

    if verbose || diffs.len() <= COMPACT_THRESHOLD {
        for diff in &diffs {
            lines.push(format!("   {}", diff.render()));
            if let Some((old, new)) = diff.summary_change() {
                lines.push(format!(
                    "      {}: {} → {}",
                    "summary".dimmed(),
                    old.red(),
                    new.green()
                ));
            }
        }
    } else {
        for kind in [DiffKind::Delete, DiffKind::Update, DiffKind::Create] {
            let count = plan.count(kind);
            if count > 0 {
                let label = colorize_diff(kind, &format!("({} {} {})", count, label(kind), pluralize("event", count)));
                lines.push(format!("   {} {}", kind.render(), label));
            }
        }
    }

    lines.join("\n")
}

/// Outcome lines of a run. Without verbose, successes are folded into counts
/// once there are many of them.
pub fn render_report(report: &SyncReport, verbose: bool) -> String {
    let show_all = verbose || report.outcomes.len() <= COMPACT_THRESHOLD;

    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .filter(|o| show_all || o.status != OutcomeStatus::Succeeded)
        .map(|o| format!("   {}", o.render()))
        .collect();

    let created = report.succeeded(OperationKind::Create);
    let updated = report.succeeded(OperationKind::Update);
    let deleted = report.succeeded(OperationKind::Delete);
    let failed = report.failed().count();

    let mut summary = format!("{created} created, {updated} updated, {deleted} deleted");
    if failed > 0 {
        summary.push_str(&format!(", {}", format!("{failed} failed").red()));
    }
    lines.push(String::new());
    lines.push(summary);

    lines.join("\n")
}

fn label(kind: DiffKind) -> &'static str {
    match kind {
        DiffKind::Create => "new",
        DiffKind::Update => "updated",
        DiffKind::Delete => "deleted",
    }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
