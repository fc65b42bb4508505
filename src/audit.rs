// src/audit.rs
use chrono::{DateTime, Utc};

use crate::model::{DailyEntry, EditRecord, EntryField, FieldChange};

// --- Edit-Audit Tracker ---
// Every save that changes an audited field appends EditRecords to the
// entry's history. The history is append-only for the entry's lifetime.

/// Which changes count as edits. The two policies exist because the entry
/// owner's first real save of a figure (zero -> value) is entry creation,
/// not an edit, while an administrator correcting figures must leave a
/// trail for every difference including transitions from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPolicy {
    /// Owner path: log a change only when the previous value was nonzero.
    CreationAware,
    /// Admin path: log any difference.
    FullCorrection,
}

impl AuditPolicy {
    fn should_log(&self, change: &FieldChange) -> bool {
        if change.previous == change.incoming {
            return false;
        }
        match self {
            AuditPolicy::CreationAware => change.previous != 0,
            AuditPolicy::FullCorrection => true,
        }
    }
}

/// Returns the entry's full history with records appended for each audited
/// field the policy deems changed. Appended records always follow the
/// fixed field order Target, ACH, Cash regardless of the order `changes`
/// arrived in. Existing records are never touched.
pub fn build_history(
    existing: &[EditRecord],
    changes: &[FieldChange],
    policy: AuditPolicy,
    editor: &str,
    now: DateTime<Utc>,
) -> Vec<EditRecord> {
    let mut history: Vec<EditRecord> = existing.to_vec();

    for field in EntryField::ORDERED {
        let Some(change) = changes.iter().find(|c| c.field == field) else {
            continue;
        };
        if policy.should_log(change) {
            history.push(EditRecord {
                field,
                old_value: change.previous,
                new_value: change.incoming,
                edited_at: now,
                edited_by: editor.to_string(),
            });
        }
    }

    history
}

/// Diffs an existing entry against incoming figures. The remark field is
/// deliberately absent: remark changes are never audited.
pub fn field_changes(entry: &DailyEntry, target: i64, achieved: i64, cash: i64) -> Vec<FieldChange> {
    vec![
        FieldChange {
            field: EntryField::Target,
            previous: entry.target,
            incoming: target,
        },
        FieldChange {
            field: EntryField::Ach,
            previous: entry.achieved,
            incoming: achieved,
        },
        FieldChange {
            field: EntryField::Cash,
            previous: entry.cash,
            incoming: cash,
        },
    ]
}
