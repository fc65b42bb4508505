// src/entries_tests.rs

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::audit::AuditPolicy;
    use crate::entries::{EntryService, SaveEntryRequest};
    use crate::model::EntryField;
    use crate::store::{MemoryStore, RecordStore};
    use chrono::NaiveDate;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn request(target: i64, achieved: i64, cash: i64, editor: &str) -> SaveEntryRequest {
        SaveEntryRequest {
            branch_id: "b1".to_string(),
            executive_id: "e1".to_string(),
            date: d("2024-05-01"),
            target,
            achieved,
            cash,
            remark: String::new(),
            editor: editor.to_string(),
        }
    }

    fn service() -> (EntryService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (EntryService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_first_save_creates_entry_without_history() {
        let (service, _store) = service();

        let outcome = service
            .save_entry(request(100, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("save failed");

        assert!(outcome.created);
        assert_eq!(outcome.entry.target, 100);
        assert!(outcome.entry.edit_history.is_empty());
    }

    #[tokio::test]
    async fn test_second_save_updates_in_place_never_duplicates() {
        let (service, store) = service();

        service
            .save_entry(request(100, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("first save failed");
        let outcome = service
            .save_entry(request(120, 95, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("second save failed");

        assert!(!outcome.created);
        assert_eq!(outcome.entry.target, 120);

        let stored = store
            .entries_in_range(d("2024-05-01"), d("2024-05-01"), None)
            .await
            .expect("range query failed");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].target, 120);
    }

    #[tokio::test]
    async fn test_owner_update_from_zero_is_not_audited() {
        let (service, _store) = service();

        // Entry saved with all zeros first (form opened and saved empty).
        service
            .save_entry(request(0, 0, 0, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("first save failed");
        let outcome = service
            .save_entry(request(100, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("second save failed");

        // Zero -> value transitions are the entry's first real figures,
        // not edits.
        assert!(outcome.entry.edit_history.is_empty());
    }

    #[tokio::test]
    async fn test_admin_correction_from_zero_is_audited() {
        let (service, _store) = service();

        service
            .save_entry(request(0, 0, 0, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("first save failed");
        let outcome = service
            .save_entry(request(100, 0, 0, "admin@example.com"), AuditPolicy::FullCorrection)
            .await
            .expect("correction failed");

        assert_eq!(outcome.entry.edit_history.len(), 1);
        let record = &outcome.entry.edit_history[0];
        assert_eq!(record.field, EntryField::Target);
        assert_eq!(record.old_value, 0);
        assert_eq!(record.new_value, 100);
        assert_eq!(record.edited_by, "admin@example.com");
    }

    #[tokio::test]
    async fn test_history_accumulates_across_saves() {
        let (service, _store) = service();

        service
            .save_entry(request(100, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("first save failed");
        service
            .save_entry(request(110, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("second save failed");
        let outcome = service
            .save_entry(request(110, 95, 85, "admin@example.com"), AuditPolicy::FullCorrection)
            .await
            .expect("third save failed");

        let history = &outcome.entry.edit_history;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].field, EntryField::Target);
        assert_eq!(history[0].edited_by, "manager@branch.example");
        assert_eq!(history[1].field, EntryField::Ach);
        assert_eq!(history[2].field, EntryField::Cash);
        assert_eq!(history[2].edited_by, "admin@example.com");
    }

    #[tokio::test]
    async fn test_remark_change_alone_is_not_audited() {
        let (service, _store) = service();

        service
            .save_entry(request(100, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("first save failed");

        let mut req = request(100, 90, 80, "admin@example.com");
        req.remark = "visited client site".to_string();
        let outcome = service
            .save_entry(req, AuditPolicy::FullCorrection)
            .await
            .expect("remark save failed");

        assert!(outcome.entry.edit_history.is_empty());
        assert_eq!(outcome.entry.remark, "visited client site");
    }

    #[tokio::test]
    async fn test_entries_for_different_dates_stay_separate() {
        let (service, store) = service();

        service
            .save_entry(request(100, 90, 80, "manager@branch.example"), AuditPolicy::CreationAware)
            .await
            .expect("first save failed");
        let mut req = request(50, 40, 30, "manager@branch.example");
        req.date = d("2024-05-02");
        service
            .save_entry(req, AuditPolicy::CreationAware)
            .await
            .expect("second save failed");

        let stored = store
            .entries_in_range(d("2024-05-01"), d("2024-05-02"), None)
            .await
            .expect("range query failed");
        assert_eq!(stored.len(), 2);
        // Descending date order from the store.
        assert_eq!(stored[0].date, d("2024-05-02"));
        assert_eq!(stored[1].date, d("2024-05-01"));
    }
}
