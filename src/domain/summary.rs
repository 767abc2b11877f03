use crate::{constants::HABITS, keys::Month};

use super::grid::MonthlyMinutes;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HabitSummary {
    pub habit: &'static str,
    pub total: u64,
    pub average: u64,
}

pub fn summarize(record: &MonthlyMinutes, month: Month) -> Vec<HabitSummary> {
    let days = month.days();
    HABITS
        .iter()
        .map(|&habit| {
            let total: u64 = (1..=days).map(|d| record.get(habit, d) as u64).sum();
            HabitSummary {
                habit,
                total,
                average: (total as f64 / days as f64).round() as u64,
            }
        })
        .collect()
}

/// Every stored minute in the month, across all habits and days.
pub fn month_total(record: &MonthlyMinutes) -> u64 {
    record.values().map(u64::from).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::grid::{export_rows, get_month, set_minutes},
        storage::MemoryStore,
    };

    #[test]
    fn test_totals_and_averages() {
        let mut rec = MonthlyMinutes::default();
        rec.set_cell("Dance", 1, 30);
        rec.set_cell("Dance", 2, 30);
        rec.set_cell("Study", 10, 45);

        let month = Month::new(2024, 3).unwrap();
        let summary = summarize(&rec, month);

        assert_eq!(summary.len(), HABITS.len());
        let dance = summary.iter().find(|s| s.habit == "Dance").unwrap();
        assert_eq!(dance.total, 60);
        assert_eq!(dance.average, 2);
        let study = summary.iter().find(|s| s.habit == "Study").unwrap();
        assert_eq!(study.total, 45);
        assert_eq!(study.average, 2);
        let lunch = summary.iter().find(|s| s.habit == "Lunch").unwrap();
        assert_eq!(lunch.total, 0);
        assert_eq!(lunch.average, 0);
    }

    #[test]
    fn test_summary_follows_catalog_order() {
        let month = Month::new(2024, 0).unwrap();
        let summary = summarize(&MonthlyMinutes::default(), month);
        let habits: Vec<&str> = summary.iter().map(|s| s.habit).collect();
        assert_eq!(habits, HABITS.to_vec());
    }

    #[test]
    fn test_total_matches_export_row() {
        let mut store = MemoryStore::new();
        let month = Month::new(2024, 1).unwrap();
        set_minutes(&mut store, month, "Piano", 1, 25).unwrap();
        set_minutes(&mut store, month, "Piano", 29, 40).unwrap();
        set_minutes(&mut store, month, "Sleep time", 14, 480).unwrap();

        let rows = export_rows(&store, month);
        let summary = summarize(&get_month(&store, month), month);

        for entry in &summary {
            let row = rows.iter().find(|r| r[0] == entry.habit).unwrap();
            let row_sum: u64 = row[1..].iter().map(|c| c.parse::<u64>().unwrap()).sum();
            assert_eq!(row_sum, entry.total);
        }
    }

    #[test]
    fn test_month_total() {
        let mut rec = MonthlyMinutes::default();
        assert_eq!(month_total(&rec), 0);
        rec.set_cell("Dinner", 5, 20);
        rec.set_cell("Resin", 6, 70);
        assert_eq!(month_total(&rec), 90);
    }
}
