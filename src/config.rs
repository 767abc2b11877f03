use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::{APP_NAME, FILE_SETTINGS, GRID_SETTINGS},
    error::{Result, TrackerError},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    /// Minutes that fill a grid bar completely.
    pub max_minutes: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            max_minutes: GRID_SETTINGS.default_max_minutes,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn validate(self) -> Result<Self> {
        if self.max_minutes == 0 {
            return Err(TrackerError::Config(
                "max_minutes must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
}

pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(FILE_SETTINGS.config_file))
}

/// Reads the config file at `path`. A missing file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return Ok(Config::default());
    };

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(TrackerError::io(path, e)),
    };

    let config: Config = serde_json::from_str(&content)
        .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))?;
    config.validate()
}
