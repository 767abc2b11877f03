pub mod checklist;
pub mod grid;
pub mod hobby;
pub mod summary;

use crate::{
    constants::HABITS,
    error::{Result, TrackerError},
};

pub fn is_habit(name: &str) -> bool {
    HABITS.contains(&name)
}

/// Resolves a habit by exact name, falling back to a case-insensitive match.
pub fn resolve_habit(name: &str) -> Result<&'static str> {
    HABITS
        .iter()
        .find(|h| **h == name)
        .or_else(|| HABITS.iter().find(|h| h.eq_ignore_ascii_case(name.trim())))
        .copied()
        .ok_or_else(|| TrackerError::UnknownHabit(name.to_string()))
}
