use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::{CHECKLIST_ITEMS_KEY, DEFAULT_CHECKLIST},
    error::{Result, TrackerError},
    keys::checklist_key,
    storage::{self, KvStore, StoredRecord},
};

/// The global, ordered checklist item names. Duplicates are allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistItems(pub Vec<String>);

impl StoredRecord for ChecklistItems {
    fn fallback() -> Self {
        ChecklistItems(DEFAULT_CHECKLIST.iter().map(|s| s.to_string()).collect())
    }
}

impl ChecklistItems {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|i| i == item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Item -> done for one date. May hold entries for items no longer listed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyChecklist(BTreeMap<String, bool>);

impl StoredRecord for DailyChecklist {
    fn fallback() -> Self {
        DailyChecklist::default()
    }
}

impl DailyChecklist {
    pub fn is_done(&self, item: &str) -> bool {
        self.0.get(item).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Completion for each listed item, in list order. Stale entries are skipped.
    pub fn for_items<'a>(&'a self, items: &'a ChecklistItems) -> impl Iterator<Item = (&'a str, bool)> {
        items.iter().map(move |item| (item, self.is_done(item)))
    }
}

pub fn get_items(store: &dyn KvStore) -> ChecklistItems {
    storage::load_record(store, CHECKLIST_ITEMS_KEY)
}

pub fn set_items(store: &mut dyn KvStore, items: &ChecklistItems) -> Result<()> {
    storage::save(store, CHECKLIST_ITEMS_KEY, items)
}

pub fn add_item(store: &mut dyn KvStore, text: &str) -> Result<ChecklistItems> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TrackerError::EmptyChecklistItem);
    }

    let mut items = get_items(store);
    items.0.push(text.to_string());
    set_items(store, &items)?;

    info!(item = text, "added checklist item");
    Ok(items)
}

pub fn remove_item(store: &mut dyn KvStore, text: &str) -> Result<ChecklistItems> {
    let mut items = get_items(store);
    let Some(idx) = items.0.iter().position(|i| i == text) else {
        return Ok(items);
    };

    items.0.remove(idx);
    set_items(store, &items)?;

    info!(item = text, "removed checklist item");
    Ok(items)
}

pub fn get_day(store: &dyn KvStore, date: NaiveDate) -> DailyChecklist {
    storage::load_record(store, &checklist_key(date))
}

pub fn toggle(
    store: &mut dyn KvStore,
    date: NaiveDate,
    item: &str,
    checked: bool,
) -> Result<DailyChecklist> {
    let mut day = get_day(store, date);
    day.0.insert(item.to_string(), checked);
    storage::save(store, &checklist_key(date), &day)?;

    info!(%date, item, checked, "toggled checklist item");
    Ok(day)
}

pub fn clear_day(store: &mut dyn KvStore, date: NaiveDate) -> Result<()> {
    storage::remove(store, &checklist_key(date))?;
    info!(%date, "cleared checklist day");
    Ok(())
}
