// src/model.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// --- Record Kinds ---
// These mirror the documents held in the record store. Field names follow
// the store's camelCase convention on the wire.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    /// Email-like string identifying the branch manager; used by the
    /// surrounding app as an access key, opaque to this core.
    pub manager: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Executive {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// One executive's figures for one calendar date. At most one of these
/// exists per (executive, date) pair; the save path looks the pair up
/// before deciding whether to create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub id: String,
    pub branch_id: String,
    pub executive_id: String,
    pub date: NaiveDate,
    pub target: i64,
    pub achieved: i64,
    pub cash: i64,
    #[serde(default)]
    pub remark: String,
    /// Append-only; see `audit::build_history`.
    #[serde(default)]
    pub edit_history: Vec<EditRecord>,
}

impl DailyEntry {
    /// Target minus achieved. Negative when the executive overshoots.
    pub fn balance(&self) -> i64 {
        self.target - self.achieved
    }

    /// Achievement percent, zero-guarded: a zero target yields 0.0 rather
    /// than a division error.
    pub fn achievement_percent(&self) -> f64 {
        if self.target == 0 {
            0.0
        } else {
            100.0 * self.achieved as f64 / self.target as f64
        }
    }
}

// --- Edit Audit ---

/// The three audited quantity fields. Remark changes are never audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryField {
    Target,
    #[serde(rename = "ACH")]
    Ach,
    Cash,
}

impl EntryField {
    /// Fixed audit order: Target, then ACH, then Cash.
    pub const ORDERED: [EntryField; 3] = [EntryField::Target, EntryField::Ach, EntryField::Cash];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub field: EntryField,
    pub old_value: i64,
    pub new_value: i64,
    pub edited_at: DateTime<Utc>,
    pub edited_by: String,
}

/// A proposed new value for one audited field, paired with what the entry
/// currently holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldChange {
    pub field: EntryField,
    pub previous: i64,
    pub incoming: i64,
}
