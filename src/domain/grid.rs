use std::{collections::BTreeMap, io};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::{APP_NAME, HABITS},
    error::{Result, TrackerError},
    keys::{Month, month_key},
    storage::{self, KvStore, StoredRecord},
};

/// Sparse `"<habit>::<day>"` -> minutes for one month. Zero is never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyMinutes(BTreeMap<String, u32>);

impl StoredRecord for MonthlyMinutes {
    fn fallback() -> Self {
        MonthlyMinutes::default()
    }

    fn normalize(mut self) -> Self {
        self.0.retain(|_, mins| *mins > 0);
        self
    }
}

pub fn cell_key(habit: &str, day: u32) -> String {
    format!("{}::{}", habit, day)
}

impl MonthlyMinutes {
    pub fn get(&self, habit: &str, day: u32) -> u32 {
        self.0.get(&cell_key(habit, day)).copied().unwrap_or(0)
    }

    pub fn set_cell(&mut self, habit: &str, day: u32, minutes: i64) {
        let key = cell_key(habit, day);
        if minutes <= 0 {
            self.0.remove(&key);
        } else {
            self.0.insert(key, u32::try_from(minutes).unwrap_or(u32::MAX));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.values().copied()
    }
}

pub fn get_month(store: &dyn KvStore, month: Month) -> MonthlyMinutes {
    storage::load_record(store, &month_key(month))
}

pub fn save_month(store: &mut dyn KvStore, month: Month, record: &MonthlyMinutes) -> Result<()> {
    storage::save(store, &month_key(month), record)
}

/// Validates the cell, applies it and persists the month.
pub fn set_minutes(
    store: &mut dyn KvStore,
    month: Month,
    habit: &str,
    day: u32,
    minutes: i64,
) -> Result<MonthlyMinutes> {
    if !super::is_habit(habit) {
        return Err(TrackerError::UnknownHabit(habit.to_string()));
    }
    let days_in_month = month.days();
    if day == 0 || day > days_in_month {
        return Err(TrackerError::DayOutOfRange { day, days_in_month });
    }

    let mut record = get_month(store, month);
    record.set_cell(habit, day, minutes);
    save_month(store, month, &record)?;

    info!(%month, habit, day, minutes = minutes.max(0), "set tracker cell");
    Ok(record)
}

pub fn clear_month(store: &mut dyn KvStore, month: Month) -> Result<()> {
    storage::remove(store, &month_key(month))?;
    info!(%month, "cleared tracker month");
    Ok(())
}

/// Bar fill for `value` against `max_minutes`, in 0..=100. A zero max yields 0.
pub fn percent_of_max(value: u32, max_minutes: u32) -> u8 {
    if max_minutes == 0 {
        return 0;
    }
    let ratio = (value as f64 / max_minutes as f64).min(1.0);
    (ratio * 100.0).round() as u8
}

pub fn export_rows(store: &dyn KvStore, month: Month) -> Vec<Vec<String>> {
    rows_for(&get_month(store, month), month)
}

fn rows_for(record: &MonthlyMinutes, month: Month) -> Vec<Vec<String>> {
    let days = month.days();

    let mut header = Vec::with_capacity(days as usize + 1);
    header.push("Habit".to_string());
    header.extend((1..=days).map(|d| d.to_string()));

    let mut rows = vec![header];
    for habit in HABITS {
        let mut row = Vec::with_capacity(days as usize + 1);
        row.push(habit.to_string());
        row.extend((1..=days).map(|d| record.get(habit, d).to_string()));
        rows.push(row);
    }
    rows
}

/// Writes rows with every field quoted and embedded quotes doubled.
pub fn write_csv<W: io::Write>(rows: &[Vec<String>], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in rows {
        csv_writer.write_record(row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| TrackerError::Csv(csv::Error::from(e)))?;
    Ok(())
}

pub fn export_file_name(month: Month) -> String {
    format!("{}-tracker-{}.csv", APP_NAME, month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn month(year: i32, month0: u32) -> Month {
        Month::new(year, month0).unwrap()
    }

    #[test]
    fn test_set_cell_and_percent() {
        let mut rec = MonthlyMinutes::default();
        rec.set_cell("Dance", 15, 45);
        assert_eq!(rec.get("Dance", 15), 45);
        assert_eq!(percent_of_max(rec.get("Dance", 15), 60), 75);
    }

    #[test]
    fn test_set_cell_zero_is_idempotent() {
        let mut rec = MonthlyMinutes::default();
        rec.set_cell("Piano", 3, 30);
        rec.set_cell("Piano", 3, 0);
        rec.set_cell("Piano", 3, 0);
        assert_eq!(rec, MonthlyMinutes::default());
        assert!(rec.is_empty());
    }

    #[test]
    fn test_set_cell_never_stores_non_positive() {
        let mut rec = MonthlyMinutes::default();
        for (day, mins) in [(1, -5), (2, 0), (3, 1), (4, 120)] {
            rec.set_cell("Study", day, mins);
        }
        assert_eq!(rec.len(), 2);
        assert!(rec.values().all(|v| v > 0));
    }

    #[test]
    fn test_percent_of_max_bounds() {
        assert_eq!(percent_of_max(0, 60), 0);
        assert_eq!(percent_of_max(600, 60), 100);
        assert_eq!(percent_of_max(1, 3), 33);
        assert_eq!(percent_of_max(2, 3), 67);
        assert_eq!(percent_of_max(30, 0), 0);
    }

    #[test]
    fn test_set_minutes_persists_and_validates() {
        let mut store = MemoryStore::new();
        let feb = month(2023, 1);

        let rec = set_minutes(&mut store, feb, "Dance", 15, 45).unwrap();
        assert_eq!(rec.get("Dance", 15), 45);
        assert_eq!(get_month(&store, feb).get("Dance", 15), 45);

        assert!(matches!(
            set_minutes(&mut store, feb, "Dance", 29, 10),
            Err(TrackerError::DayOutOfRange {
                day: 29,
                days_in_month: 28
            })
        ));
        assert!(matches!(
            set_minutes(&mut store, feb, "Knitting", 1, 10),
            Err(TrackerError::UnknownHabit(_))
        ));
        assert_eq!(get_month(&store, feb).len(), 1);
    }

    #[test]
    fn test_clear_month() {
        let mut store = MemoryStore::new();
        let m = month(2024, 4);
        set_minutes(&mut store, m, "Lunch", 1, 20).unwrap();
        clear_month(&mut store, m).unwrap();
        assert!(get_month(&store, m).is_empty());
        assert!(!store.contains("tracker_time_2024-05"));
    }

    #[test]
    fn test_zero_entries_dropped_on_load() {
        let mut store = MemoryStore::new();
        store
            .set(
                "tracker_time_2024-01",
                r#"{"Dance::1": 0, "Dance::2": 15}"#,
            )
            .unwrap();
        let rec = get_month(&store, month(2024, 0));
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get("Dance", 2), 15);
    }

    #[test]
    fn test_export_rows_shape() {
        let store = MemoryStore::new();
        for (y, m0) in [(2023, 1), (2024, 1), (2024, 3), (2024, 11)] {
            let m = month(y, m0);
            let rows = export_rows(&store, m);
            assert_eq!(rows.len(), HABITS.len() + 1);
            assert!(rows.iter().all(|r| r.len() == m.days() as usize + 1));
        }
    }

    #[test]
    fn test_export_rows_values() {
        let mut store = MemoryStore::new();
        let m = month(2024, 1);
        set_minutes(&mut store, m, "Piano", 29, 40).unwrap();

        let rows = export_rows(&store, m);
        assert_eq!(rows[0][0], "Habit");
        assert_eq!(rows[0][29], "29");
        let piano = rows.iter().find(|r| r[0] == "Piano").unwrap();
        assert_eq!(piano[29], "40");
        assert_eq!(piano[1], "0");
    }

    #[test]
    fn test_write_csv_quotes_every_field() {
        let rows = vec![
            vec!["Habit".to_string(), "1".to_string()],
            vec!["Say \"hi\"".to_string(), "0".to_string()],
        ];
        let mut out = Vec::new();
        write_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\"Habit\",\"1\"\n\"Say \"\"hi\"\"\",\"0\"\n");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(month(2024, 2)), "cherry-tracker-2024-03.csv");
    }
}
