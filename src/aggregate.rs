// src/aggregate.rs
use std::collections::HashMap;

use serde::Serialize;

use crate::model::DailyEntry;

// --- Aggregation Engine ---
// Pure functions over entry sets already fetched from the record store.
// Window selection (which entries participate) is the caller's concern.

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_target: i64,
    pub total_achieved: i64,
    pub total_cash: i64,
    pub balance: i64,
    pub achievement_percent: f64,
}

/// Sums an entry set into totals. Every supplied entry participates; no
/// filtering on value sign or remark content.
pub fn summarize_window(entries: &[DailyEntry]) -> Summary {
    let total_target: i64 = entries.iter().map(|e| e.target).sum();
    let total_achieved: i64 = entries.iter().map(|e| e.achieved).sum();
    let total_cash: i64 = entries.iter().map(|e| e.cash).sum();

    Summary {
        total_target,
        total_achieved,
        total_cash,
        balance: total_target - total_achieved,
        achievement_percent: percent(total_achieved, total_target),
    }
}

/// Achievement percent with the zero-target guard: 0 when target is 0.
pub fn percent(achieved: i64, target: i64) -> f64 {
    if target == 0 {
        0.0
    } else {
        100.0 * achieved as f64 / target as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedExecutive {
    pub executive_id: String,
    pub total_target: i64,
    pub total_achieved: i64,
    /// Ratio of summed achieved to summed target over the window, not a
    /// mean of per-day ratios. Days with larger targets weigh more.
    pub avg_percent: f64,
}

/// Groups entries by executive and returns the `n` worst performers over
/// the window, ascending by cumulative achievement percent. Executives
/// with zero cumulative target have no defined rate and are excluded.
/// Ties keep first-appearance order (stable sort).
pub fn rank_lowest_performers(entries: &[DailyEntry], n: usize) -> Vec<RankedExecutive> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (i64, i64)> = HashMap::new();

    for entry in entries {
        let slot = totals.entry(entry.executive_id.clone()).or_insert_with(|| {
            order.push(entry.executive_id.clone());
            (0, 0)
        });
        slot.0 += entry.target;
        slot.1 += entry.achieved;
    }

    let mut ranked: Vec<RankedExecutive> = order
        .into_iter()
        .filter_map(|id| {
            let (total_target, total_achieved) = totals[&id];
            if total_target == 0 {
                return None;
            }
            Some(RankedExecutive {
                executive_id: id,
                total_target,
                total_achieved,
                avg_percent: percent(total_achieved, total_target),
            })
        })
        .collect();

    // Vec::sort_by is stable, so equal percents keep input order.
    ranked.sort_by(|a, b| {
        a.avg_percent
            .partial_cmp(&b.avg_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

// --- Performance Bands ---

/// Three-way classification shared by report markers and the UI's color
/// coding. Both boundary values fall in the middle band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Low,
    Medium,
    High,
}

impl PerformanceBand {
    pub fn classify(percent: f64) -> Self {
        if percent < 70.0 {
            PerformanceBand::Low
        } else if percent <= 90.0 {
            PerformanceBand::Medium
        } else {
            PerformanceBand::High
        }
    }

    /// Status marker used in channel messages.
    pub fn marker(&self) -> &'static str {
        match self {
            PerformanceBand::Low => "🔴",
            PerformanceBand::Medium => "🟡",
            PerformanceBand::High => "🟢",
        }
    }
}
