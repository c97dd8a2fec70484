use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::atomic_io::write_text_atomic;
use crate::calendar::{GameDate, DAYS_PER_SEASON};
use crate::ids::PointTypeId;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarbageDayConfig {
    /// Tint the can prismatic when a special or mega item is inside.
    pub enable_prismatic: bool,
    /// Postpone a collection that falls on a festival to the next day.
    pub skip_festival: bool,
    pub excluded_point_types: BTreeSet<PointTypeId>,
    /// Days of the month (1..=28) on which every can is emptied.
    pub collection_days: BTreeSet<u8>,
}

impl Default for GarbageDayConfig {
    fn default() -> Self {
        Self {
            enable_prismatic: true,
            skip_festival: true,
            excluded_point_types: BTreeSet::new(),
            collection_days: BTreeSet::from([1, 8, 15, 22]),
        }
    }
}

impl GarbageDayConfig {
    pub fn is_collection_day(&self, date: GameDate) -> bool {
        self.collection_days.contains(&date.day_of_month)
    }

    /// Parses the comma separated exclusion list used by the config menu.
    pub fn parse_excluded_list(raw: &str) -> BTreeSet<PointTypeId> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PointTypeId::new)
            .collect()
    }

    pub fn excluded_list(&self) -> String {
        self.excluded_point_types
            .iter()
            .map(PointTypeId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(day) = self
            .collection_days
            .iter()
            .copied()
            .find(|day| !(1..=DAYS_PER_SEASON).contains(day))
        {
            return Err(ConfigError::InvalidCollectionDay { day });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("collection day {day} is outside 1..={max}", max = DAYS_PER_SEASON)]
    InvalidCollectionDay { day: u8 },
}

/// Reads the config at `path`, writing the defaults there first if the file
/// does not exist yet.
pub fn load_or_create_config(path: &Path) -> Result<GarbageDayConfig, ConfigError> {
    if !path.exists() {
        let config = GarbageDayConfig::default();
        write_config(path, &config)?;
        info!(path = %path.display(), "config_defaults_written");
        return Ok(config);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config =
        serde_json::from_str::<GarbageDayConfig>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &GarbageDayConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let text = serde_json::to_string_pretty(config).map_err(ConfigError::Encode)?;
    write_text_atomic(path, &text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
