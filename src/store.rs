// src/store.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::model::{Branch, DailyEntry, Executive};

// --- Record Store ---
// The document database is an external collaborator reached through this
// trait. The core never issues anything beyond equality/range filters and
// date ordering, and trusts each write to apply atomically per document
// (last writer wins when two editors race).

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {kind} {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("store request failed: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError>;
    async fn get_branch(&self, id: &str) -> Result<Option<Branch>, StoreError>;
    async fn put_branch(&self, branch: Branch) -> Result<(), StoreError>;
    /// No cascade: the branch's executives and entries keep their now
    /// orphaned foreign keys.
    async fn delete_branch(&self, id: &str) -> Result<(), StoreError>;

    async fn list_executives(&self, branch_id: Option<&str>) -> Result<Vec<Executive>, StoreError>;
    async fn get_executive(&self, id: &str) -> Result<Option<Executive>, StoreError>;
    async fn put_executive(&self, executive: Executive) -> Result<(), StoreError>;
    async fn delete_executive(&self, id: &str) -> Result<(), StoreError>;

    /// The uniqueness invariant hinges on this lookup: exactly one entry
    /// may exist per (executive, date), so every save checks here first.
    async fn find_entry(
        &self,
        executive_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyEntry>, StoreError>;
    async fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<DailyEntry>, StoreError>;
    /// Inclusive on both bounds, newest date first.
    async fn entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        branch_id: Option<&str>,
    ) -> Result<Vec<DailyEntry>, StoreError>;
    async fn put_entry(&self, entry: DailyEntry) -> Result<(), StoreError>;
    async fn delete_entry(&self, id: &str) -> Result<(), StoreError>;
}

// --- In-Memory Store ---

/// Backing store keyed the way the remote documents are. Shared behind
/// `Arc`, locked per call; no lock is held across an await point.
#[derive(Clone, Default)]
pub struct MemoryStore {
    branches: Arc<Mutex<HashMap<String, Branch>>>,
    executives: Arc<Mutex<HashMap<String, Executive>>>,
    entries: Arc<Mutex<HashMap<String, DailyEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError> {
        let mut branches: Vec<Branch> = self.branches.lock().unwrap().values().cloned().collect();
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    async fn get_branch(&self, id: &str) -> Result<Option<Branch>, StoreError> {
        Ok(self.branches.lock().unwrap().get(id).cloned())
    }

    async fn put_branch(&self, branch: Branch) -> Result<(), StoreError> {
        debug!("Storing branch {}", branch.id);
        self.branches
            .lock()
            .unwrap()
            .insert(branch.id.clone(), branch);
        Ok(())
    }

    async fn delete_branch(&self, id: &str) -> Result<(), StoreError> {
        self.branches.lock().unwrap().remove(id);
        Ok(())
    }

    async fn list_executives(&self, branch_id: Option<&str>) -> Result<Vec<Executive>, StoreError> {
        let mut executives: Vec<Executive> = self
            .executives
            .lock()
            .unwrap()
            .values()
            .filter(|e| branch_id.map_or(true, |b| e.branch_id == b))
            .cloned()
            .collect();
        executives.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(executives)
    }

    async fn get_executive(&self, id: &str) -> Result<Option<Executive>, StoreError> {
        Ok(self.executives.lock().unwrap().get(id).cloned())
    }

    async fn put_executive(&self, executive: Executive) -> Result<(), StoreError> {
        debug!("Storing executive {}", executive.id);
        self.executives
            .lock()
            .unwrap()
            .insert(executive.id.clone(), executive);
        Ok(())
    }

    async fn delete_executive(&self, id: &str) -> Result<(), StoreError> {
        self.executives.lock().unwrap().remove(id);
        Ok(())
    }

    async fn find_entry(
        &self,
        executive_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyEntry>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .find(|e| e.executive_id == executive_id && e.date == date)
            .cloned())
    }

    async fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<DailyEntry>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.date == date)
            .cloned()
            .collect())
    }

    async fn entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        branch_id: Option<&str>,
    ) -> Result<Vec<DailyEntry>, StoreError> {
        let mut entries: Vec<DailyEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.date >= start && e.date <= end)
            .filter(|e| branch_id.map_or(true, |b| e.branch_id == b))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn put_entry(&self, entry: DailyEntry) -> Result<(), StoreError> {
        debug!(
            "Storing entry {} ({} @ {})",
            entry.id, entry.executive_id, entry.date
        );
        self.entries.lock().unwrap().insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(id);
        Ok(())
    }
}
