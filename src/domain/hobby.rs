use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Result, TrackerError},
    keys::hobby_key,
    storage::{self, KvStore, StoredRecord},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HobbyEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub mins: u32,
    #[serde(default)]
    pub note: String,
    /// Epoch milliseconds.
    pub ts: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HobbyLog(pub Vec<HobbyEntry>);

impl StoredRecord for HobbyLog {
    fn fallback() -> Self {
        HobbyLog::default()
    }

    fn normalize(mut self) -> Self {
        self.0.retain(|e| e.mins > 0);
        self
    }
}

impl HobbyLog {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_minutes(&self) -> u64 {
        self.0.iter().map(|e| e.mins as u64).sum()
    }
}

pub fn get_day(store: &dyn KvStore, date: NaiveDate) -> HobbyLog {
    storage::load_record(store, &hobby_key(date))
}

pub fn add_entry(
    store: &mut dyn KvStore,
    date: NaiveDate,
    kind: &str,
    mins: i64,
    note: &str,
) -> Result<HobbyLog> {
    if mins <= 0 {
        return Err(TrackerError::NonPositiveMinutes(mins));
    }
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(TrackerError::EmptyHobbyType);
    }

    let mut log = get_day(store, date);
    log.0.push(HobbyEntry {
        kind: kind.to_string(),
        mins: u32::try_from(mins).unwrap_or(u32::MAX),
        note: note.to_string(),
        ts: Utc::now().timestamp_millis(),
    });
    storage::save(store, &hobby_key(date), &log)?;

    info!(%date, kind, mins, "logged hobby entry");
    Ok(log)
}

/// Removes the entry at `index`. Out-of-range indexes leave the log untouched.
pub fn remove_entry(
    store: &mut dyn KvStore,
    date: NaiveDate,
    index: usize,
) -> Result<Option<HobbyEntry>> {
    let mut log = get_day(store, date);
    if index >= log.len() {
        return Ok(None);
    }

    let removed = log.0.remove(index);
    storage::save(store, &hobby_key(date), &log)?;

    info!(%date, index, kind = %removed.kind, "removed hobby entry");
    Ok(Some(removed))
}
