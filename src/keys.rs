use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

use crate::{
    constants::KEY_PREFIXES,
    error::{Result, TrackerError},
};

/// Years that fit the four-digit `YYYY` segment of a storage key.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// A calendar month with a zero-based month index, as used by the storage keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Month {
    pub year: i32,
    pub month0: u32,
    days: u32,
}

impl Month {
    pub fn new(year: i32, month0: u32) -> Result<Self> {
        if month0 > 11 {
            return Err(TrackerError::InvalidMonth(month0));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(TrackerError::InvalidYear(year));
        }
        let days = days_in_month(year, month0).ok_or(TrackerError::InvalidYear(year))?;
        Ok(Month { year, month0, days })
    }

    pub fn of(date: NaiveDate) -> Result<Self> {
        Month::new(date.year(), date.month0())
    }

    pub fn current() -> Result<Self> {
        Month::of(Local::now().date_naive())
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Calendar month number, 1..=12.
    pub fn number(&self) -> u32 {
        self.month0 + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.number())
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_key() -> String {
    date_key(today())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn month_key(month: Month) -> String {
    format!("{}{}", KEY_PREFIXES.time, month)
}

pub fn checklist_key(date: NaiveDate) -> String {
    format!("{}{}", KEY_PREFIXES.check, date_key(date))
}

pub fn hobby_key(date: NaiveDate) -> String {
    format!("{}{}", KEY_PREFIXES.hobby, date_key(date))
}

/// Day-of-month of "day 0" of the following month. `None` outside chrono's calendar.
pub fn days_in_month(year: i32, month0: u32) -> Option<u32> {
    if month0 > 11 {
        return None;
    }
    let (next_year, next_month) = if month0 == 11 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month0 + 2)
    };

    NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
}

pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}', expected YYYY-MM-DD: {}", value, e))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(format!(
            "invalid date '{}', year must be within {}..={}",
            value, MIN_YEAR, MAX_YEAR
        ));
    }
    Ok(date)
}
