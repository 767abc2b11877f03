use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("checklist item text must not be empty")]
    EmptyChecklistItem,

    #[error("'{0}' is not on the checklist")]
    UnknownChecklistItem(String),

    #[error("hobby type must not be empty")]
    EmptyHobbyType,

    #[error("minutes must be greater than zero, got {0}")]
    NonPositiveMinutes(i64),

    #[error("unknown habit '{0}'")]
    UnknownHabit(String),

    #[error("day {day} is outside 1..={days_in_month}")]
    DayOutOfRange { day: u32, days_in_month: u32 },

    #[error("month index {0} is outside 0..=11")]
    InvalidMonth(u32),

    #[error("year {0} is outside 0..=9999")]
    InvalidYear(i32),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("storage error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl TrackerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TrackerError::Io {
            path: path.into(),
            source,
        }
    }
}
