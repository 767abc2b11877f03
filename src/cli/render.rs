use chrono::{DateTime, Local, NaiveDate, Utc};
use itertools::Itertools;

use crate::{
    constants::{GRID_SETTINGS, HABITS},
    domain::{
        checklist::{ChecklistItems, DailyChecklist},
        grid::{MonthlyMinutes, percent_of_max},
        hobby::HobbyLog,
        summary::HabitSummary,
    },
    keys::Month,
};

pub fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

pub fn truncate_label(value: &str, max_chars: usize) -> String {
    let count = value.chars().count();
    if count <= max_chars {
        return value.to_string();
    }

    if max_chars <= 3 {
        return value.chars().take(max_chars).collect();
    }

    let prefix: String = value.chars().take(max_chars - 3).collect();
    format!("{}...", prefix)
}

pub fn cell_glyph(percent: u8) -> char {
    if percent == 0 {
        return GRID_SETTINGS.empty_cell;
    }
    let levels = GRID_SETTINGS.levels;
    let idx = (percent as usize * levels.len()).div_ceil(100);
    levels[idx.clamp(1, levels.len()) - 1]
}

pub fn grid_lines(record: &MonthlyMinutes, month: Month, max_minutes: u32) -> Vec<String> {
    let width = GRID_SETTINGS.name_width;
    let days = month.days();

    let mut lines = Vec::with_capacity(HABITS.len() + 2);
    lines.push(format!("Tracker {} (bar = {} max)", month, format_minutes(max_minutes as u64)));

    let header = (1..=days).map(|d| d % 10).join("");
    lines.push(format!("{:width$} {}", "Habit / Day", header, width = width));

    for habit in HABITS {
        let cells: String = (1..=days)
            .map(|d| cell_glyph(percent_of_max(record.get(habit, d), max_minutes)))
            .collect();
        let total: u64 = (1..=days).map(|d| record.get(habit, d) as u64).sum();
        lines.push(format!(
            "{:width$} {} {}",
            truncate_label(habit, width),
            cells,
            format_minutes(total),
            width = width
        ));
    }
    lines
}

pub fn summary_lines(month: Month, summary: &[HabitSummary]) -> Vec<String> {
    let mut lines = vec![format!("Summary {}", month), "-".repeat(40)];
    lines.extend(summary.iter().map(|s| {
        format!(
            "{:20} total {:>8}  avg/day {:>6}",
            s.habit,
            format_minutes(s.total),
            format_minutes(s.average)
        )
    }));
    lines
}

pub fn checklist_lines(date: NaiveDate, items: &ChecklistItems, day: &DailyChecklist) -> Vec<String> {
    let mut lines = vec![format!("Checklist {}", date)];
    if items.is_empty() {
        lines.push("No checklist items. Add one with `cherry check add`.".to_string());
        return lines;
    }
    lines.extend(
        day.for_items(items)
            .map(|(item, done)| format!("[{}] {}", if done { 'x' } else { ' ' }, item)),
    );
    lines
}

pub fn hobby_lines(date: NaiveDate, log: &HobbyLog) -> Vec<String> {
    let mut lines = vec![format!("Hobbies {}", date)];
    if log.is_empty() {
        lines.push("No entries for this day.".to_string());
        return lines;
    }

    for (idx, entry) in log.0.iter().enumerate() {
        let logged_at = DateTime::<Utc>::from_timestamp_millis(entry.ts)
            .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        let mut line = format!(
            "{:>3}  {}  {:16} {:>8}",
            idx,
            logged_at,
            truncate_label(&entry.kind, 16),
            format_minutes(entry.mins as u64)
        );
        if !entry.note.is_empty() {
            line.push_str(&format!("  {}", entry.note));
        }
        lines.push(line);
    }
    lines.push(format!("Total: {}", format_minutes(log.total_minutes())));
    lines
}
