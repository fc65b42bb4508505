// src/export.rs
use std::collections::HashMap;
use std::io;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::DailyEntry;

// --- Export Projection ---
// Flattens entries into the tabular shape the exported document carries.
// Callers pre-sort (by branch name ascending); this module adds no
// ordering of its own.

/// One spreadsheet row. Achievement is pre-formatted ("92.5%") because the
/// document is read by humans, not re-parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Executive")]
    pub executive: String,
    #[serde(rename = "Target")]
    pub target: i64,
    #[serde(rename = "ACH")]
    pub achieved: i64,
    #[serde(rename = "Cash")]
    pub cash: i64,
    #[serde(rename = "Balance")]
    pub balance: i64,
    #[serde(rename = "Achievement %")]
    pub achievement: String,
}

/// Projects entries into rows. Branch and executive names come from
/// read-only lookup tables populated once per reporting session; ids with
/// no lookup hit fall back to the raw id (deleted branches and executives
/// leave orphaned foreign keys by design).
pub fn project_for_export(
    entries: &[DailyEntry],
    branch_names: &HashMap<String, String>,
    executive_names: &HashMap<String, String>,
) -> Vec<ExportRow> {
    entries
        .iter()
        .map(|e| ExportRow {
            date: e.date,
            branch: branch_names
                .get(&e.branch_id)
                .cloned()
                .unwrap_or_else(|| e.branch_id.clone()),
            executive: executive_names
                .get(&e.executive_id)
                .cloned()
                .unwrap_or_else(|| e.executive_id.clone()),
            target: e.target,
            achieved: e.achieved,
            cash: e.cash,
            balance: e.balance(),
            achievement: format!("{:.1}%", e.achievement_percent()),
        })
        .collect()
}

/// Names the exported artifact from the reporting window alone: a
/// single-day window gets a daily label, a window inside one calendar
/// month gets a monthly label ("May 2024"), anything else a range label.
/// Never used for filtering contents.
pub fn export_filename(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        format!("daily_collection_{}.csv", start)
    } else if start.year() == end.year() && start.month() == end.month() {
        format!("collection_{}.csv", start.format("%B_%Y"))
    } else {
        format!("collection_{}_to_{}.csv", start, end)
    }
}

/// Emits the rows through the csv crate with the fixed header order
/// Date, Branch, Executive, Target, ACH, Cash, Balance, Achievement %.
pub fn write_csv<W: io::Write>(rows: &[ExportRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
