// src/aggregate_tests.rs

#[cfg(test)]
mod tests {
    use crate::aggregate::*;
    use crate::model::DailyEntry;
    use chrono::NaiveDate;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn entry(executive_id: &str, date: &str, target: i64, achieved: i64, cash: i64) -> DailyEntry {
        DailyEntry {
            id: format!("{}_{}", executive_id, date),
            branch_id: "b1".to_string(),
            executive_id: executive_id.to_string(),
            date: d(date),
            target,
            achieved,
            cash,
            remark: String::new(),
            edit_history: Vec::new(),
        }
    }

    #[test]
    fn test_summarize_totals_and_balance() {
        let entries = vec![
            entry("e1", "2024-05-01", 100, 90, 80),
            entry("e2", "2024-05-01", 50, 60, 40),
        ];
        let summary = summarize_window(&entries);

        assert_eq!(summary.total_target, 150);
        assert_eq!(summary.total_achieved, 150);
        assert_eq!(summary.total_cash, 120);
        assert_eq!(summary.balance, 0);
        assert!((summary.achievement_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_zero_target_yields_zero_percent() {
        let entries = vec![entry("e1", "2024-05-01", 0, 40, 40)];
        let summary = summarize_window(&entries);

        assert_eq!(summary.total_achieved, 40);
        assert_eq!(summary.balance, -40);
        assert_eq!(summary.achievement_percent, 0.0);
    }

    #[test]
    fn test_summarize_empty_set() {
        let summary = summarize_window(&[]);
        assert_eq!(summary.total_target, 0);
        assert_eq!(summary.balance, 0);
        assert_eq!(summary.achievement_percent, 0.0);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let entries = vec![
            entry("e1", "2024-05-01", 100, 90, 80),
            entry("e2", "2024-05-02", 70, 10, 5),
        ];
        assert_eq!(summarize_window(&entries), summarize_window(&entries));
    }

    #[test]
    fn test_rank_excludes_zero_cumulative_target() {
        let entries = vec![
            entry("e1", "2024-05-01", 0, 50, 0),
            entry("e1", "2024-05-02", 0, 20, 0),
            entry("e2", "2024-05-01", 100, 10, 0),
        ];
        let ranked = rank_lowest_performers(&entries, 10);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].executive_id, "e2");
    }

    #[test]
    fn test_rank_sorted_ascending_and_truncated() {
        let entries = vec![
            entry("good", "2024-05-01", 100, 95, 0),
            entry("bad", "2024-05-01", 100, 20, 0),
            entry("mid", "2024-05-01", 100, 60, 0),
        ];

        let ranked = rank_lowest_performers(&entries, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].executive_id, "bad");
        assert_eq!(ranked[1].executive_id, "mid");
        assert!(ranked[0].avg_percent <= ranked[1].avg_percent);
    }

    #[test]
    fn test_rank_uses_ratio_of_sums_not_mean_of_daily_ratios() {
        // 50/100 on a heavy day plus 10/10 on a light day: the cumulative
        // rate is 60/110 = 54.5%, while a mean of daily ratios would say
        // 75%. The heavy day must dominate.
        let entries = vec![
            entry("e1", "2024-05-01", 100, 50, 0),
            entry("e1", "2024-05-02", 10, 10, 0),
            entry("e2", "2024-05-01", 100, 60, 0),
        ];
        let ranked = rank_lowest_performers(&entries, 10);

        assert_eq!(ranked[0].executive_id, "e1");
        assert!((ranked[0].avg_percent - 100.0 * 60.0 / 110.0).abs() < 1e-9);
        assert_eq!(ranked[1].executive_id, "e2");
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let entries = vec![
            entry("first", "2024-05-01", 100, 50, 0),
            entry("second", "2024-05-01", 200, 100, 0),
        ];
        let ranked = rank_lowest_performers(&entries, 10);

        assert_eq!(ranked[0].executive_id, "first");
        assert_eq!(ranked[1].executive_id, "second");
    }

    #[test]
    fn test_rank_accumulates_across_window_days() {
        let entries = vec![
            entry("e1", "2024-05-01", 100, 40, 0),
            entry("e1", "2024-05-02", 100, 40, 0),
            entry("e1", "2024-05-03", 100, 40, 0),
        ];
        let ranked = rank_lowest_performers(&entries, 2);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].total_target, 300);
        assert_eq!(ranked[0].total_achieved, 120);
        assert!((ranked[0].avg_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(PerformanceBand::classify(69.9), PerformanceBand::Low);
        assert_eq!(PerformanceBand::classify(70.0), PerformanceBand::Medium);
        assert_eq!(PerformanceBand::classify(90.0), PerformanceBand::Medium);
        assert_eq!(PerformanceBand::classify(90.1), PerformanceBand::High);
        assert_eq!(PerformanceBand::classify(0.0), PerformanceBand::Low);
    }
}
