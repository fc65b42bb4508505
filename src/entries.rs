// src/entries.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::audit::{build_history, field_changes, AuditPolicy};
use crate::model::DailyEntry;
use crate::store::{RecordStore, StoreError};

// --- Entry Save Service ---
// The single write path for daily figures. Both the branch-owner form and
// the admin correction screen go through here; only the audit policy
// differs between them.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntryRequest {
    pub branch_id: String,
    pub executive_id: String,
    pub date: NaiveDate,
    pub target: i64,
    pub achieved: i64,
    pub cash: i64,
    #[serde(default)]
    pub remark: String,
    pub editor: String,
}

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub entry: DailyEntry,
    /// True when no entry existed yet for this (executive, date); drives
    /// the "new entry" vs "update" notification phrasing.
    pub created: bool,
}

#[derive(Clone)]
pub struct EntryService {
    store: Arc<dyn RecordStore>,
}

impl EntryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates or updates the one entry for (executive, date). An existing
    /// entry is updated in place with audit records appended per `policy`;
    /// a first save creates the entry with an empty history, since entry
    /// creation is never recorded as an edit.
    pub async fn save_entry(
        &self,
        req: SaveEntryRequest,
        policy: AuditPolicy,
    ) -> Result<SaveOutcome, StoreError> {
        match self.store.find_entry(&req.executive_id, req.date).await? {
            Some(existing) => {
                let changes = field_changes(&existing, req.target, req.achieved, req.cash);
                let history = build_history(
                    &existing.edit_history,
                    &changes,
                    policy,
                    &req.editor,
                    Utc::now(),
                );
                let updated = DailyEntry {
                    target: req.target,
                    achieved: req.achieved,
                    cash: req.cash,
                    remark: req.remark,
                    edit_history: history,
                    ..existing
                };
                info!(
                    "Updating entry {} for executive {} on {}",
                    updated.id, updated.executive_id, updated.date
                );
                self.store.put_entry(updated.clone()).await?;
                Ok(SaveOutcome {
                    entry: updated,
                    created: false,
                })
            }
            None => {
                let entry = DailyEntry {
                    id: format!("{}_{}", req.executive_id, req.date),
                    branch_id: req.branch_id,
                    executive_id: req.executive_id,
                    date: req.date,
                    target: req.target,
                    achieved: req.achieved,
                    cash: req.cash,
                    remark: req.remark,
                    edit_history: Vec::new(),
                };
                info!(
                    "Creating entry {} for executive {} on {}",
                    entry.id, entry.executive_id, entry.date
                );
                self.store.put_entry(entry.clone()).await?;
                Ok(SaveOutcome {
                    entry,
                    created: true,
                })
            }
        }
    }
}
