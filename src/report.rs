// src/report.rs
use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::aggregate::{percent, PerformanceBand};
use crate::model::{Branch, DailyEntry};

// --- Report Formatter ---
// Renders aggregated figures into the plain-text status messages posted to
// the notification channel. All formatting is deterministic: fixed section
// order, fixed rounding, alphabetical branch ordering.

#[derive(Debug, Clone, PartialEq)]
pub struct BranchSummary {
    pub branch_name: String,
    pub has_entry: bool,
    pub total_target: i64,
    pub total_achieved: i64,
    pub executive_count: usize,
}

/// Multi-section status message: entered branches with their ratios and
/// band markers, then not-entered branch names, then the overall line.
/// Overall totals count entered branches only. Both "no branches at all"
/// and "nothing entered yet" are valid states and render as such.
pub fn format_summary_report(date: NaiveDate, branch_summaries: &[BranchSummary]) -> String {
    let mut summaries: Vec<&BranchSummary> = branch_summaries.iter().collect();
    summaries.sort_by(|a, b| {
        a.branch_name
            .to_lowercase()
            .cmp(&b.branch_name.to_lowercase())
    });

    let (entered, missing): (Vec<&BranchSummary>, Vec<&BranchSummary>) =
        summaries.into_iter().partition(|s| s.has_entry);

    let total_target: i64 = entered.iter().map(|s| s.total_target).sum();
    let total_achieved: i64 = entered.iter().map(|s| s.total_achieved).sum();
    let overall_percent = percent(total_achieved, total_target);

    let mut msg = String::new();
    let _ = writeln!(msg, "📊 Daily Collection Report for {}", date);
    let _ = writeln!(msg);

    let _ = writeln!(msg, "✅ Entered:");
    if entered.is_empty() {
        let _ = writeln!(msg, "(none)");
    }
    for s in &entered {
        let pct = percent(s.total_achieved, s.total_target);
        let _ = writeln!(
            msg,
            "{} {}: {}/{} ({:.0}%) | {} exec",
            PerformanceBand::classify(pct).marker(),
            s.branch_name,
            s.total_achieved,
            s.total_target,
            pct,
            s.executive_count,
        );
    }

    let _ = writeln!(msg);
    let _ = writeln!(msg, "❌ Not Entered:");
    if missing.is_empty() {
        let _ = writeln!(msg, "(none)");
    }
    for s in &missing {
        let _ = writeln!(msg, "• {}", s.branch_name);
    }

    let _ = writeln!(msg);
    let _ = writeln!(
        msg,
        "Overall: {}/{} ({:.1}%)",
        total_achieved, total_target, overall_percent
    );
    let _ = write!(
        msg,
        "Branches Reported: {}/{}",
        entered.len(),
        entered.len() + missing.len()
    );

    msg
}

/// Single-entry message posted when a branch saves figures. Phrasing
/// distinguishes a brand-new entry from an update of an existing one.
pub fn format_entry_notification(
    branch_name: &str,
    executive_name: &str,
    entry: &DailyEntry,
    is_new: bool,
) -> String {
    let pct = entry.achievement_percent();
    let mut msg = String::new();
    let _ = writeln!(
        msg,
        "{}",
        if is_new {
            "🆕 New Collection Entry"
        } else {
            "✏️ Collection Entry Updated"
        }
    );
    let _ = writeln!(msg, "Branch: {}", branch_name);
    let _ = writeln!(msg, "Executive: {}", executive_name);
    let _ = writeln!(msg, "Date: {}", entry.date);
    let _ = writeln!(
        msg,
        "Target: {} | ACH: {} | Cash: {}",
        entry.target, entry.achieved, entry.cash
    );
    let _ = writeln!(msg, "Balance: {}", entry.balance());
    let _ = write!(
        msg,
        "Achievement: {:.1}% {}",
        pct,
        PerformanceBand::classify(pct).marker()
    );
    msg
}

/// Joins the full branch list against one day's entries and renders the
/// summary report. A branch counts as entered iff at least one entry
/// exists for it on the date; per-branch totals sum over all of that
/// branch's executives.
pub fn format_branch_status_update(
    date: NaiveDate,
    all_branches: &[Branch],
    entries_for_date: &[DailyEntry],
) -> String {
    let summaries: Vec<BranchSummary> = all_branches
        .iter()
        .map(|branch| {
            let branch_entries: Vec<&DailyEntry> = entries_for_date
                .iter()
                .filter(|e| e.branch_id == branch.id && e.date == date)
                .collect();
            let executives: HashSet<&str> = branch_entries
                .iter()
                .map(|e| e.executive_id.as_str())
                .collect();
            BranchSummary {
                branch_name: branch.name.clone(),
                has_entry: !branch_entries.is_empty(),
                total_target: branch_entries.iter().map(|e| e.target).sum(),
                total_achieved: branch_entries.iter().map(|e| e.achieved).sum(),
                executive_count: executives.len(),
            }
        })
        .collect();

    format_summary_report(date, &summaries)
}
