use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use garbage_day::{write_text_atomic, GameDate, InventoryKey, Item, SharedInventory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::world::SimWorld;

pub(crate) const SAVE_VERSION: u32 = 1;

/// What survives between runs: the date to resume on and everything the
/// host persists. Cycle state is not saved; it resets every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SaveGame {
    pub(crate) save_version: u32,
    pub(crate) date: GameDate,
    pub(crate) inventories: BTreeMap<InventoryKey, SharedInventory>,
    #[serde(default)]
    pub(crate) carried: Vec<Item>,
    #[serde(default)]
    pub(crate) stats: BTreeMap<String, u32>,
    #[serde(default)]
    pub(crate) friendship: BTreeMap<String, i32>,
}

#[derive(Debug, Error)]
pub(crate) enum SaveError {
    #[error("failed to read save {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse save {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {field}: {message}")]
    Invalid { field: String, message: String },
    #[error("failed to encode save: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write save {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SaveGame {
    pub(crate) fn capture(world: &SimWorld, date: GameDate) -> Self {
        Self {
            save_version: SAVE_VERSION,
            date,
            inventories: world.inventories.clone(),
            carried: world.carried.clone(),
            stats: world.stats.clone(),
            friendship: world.friendship.clone(),
        }
    }

    pub(crate) fn restore_into(self, world: &mut SimWorld) -> GameDate {
        world.inventories = self.inventories;
        world.carried = self.carried;
        world.stats = self.stats;
        world.friendship = self.friendship;
        self.date
    }

    fn validate(&self) -> Result<(), SaveError> {
        if self.save_version != SAVE_VERSION {
            return Err(SaveError::Invalid {
                field: "save_version".to_string(),
                message: format!("expected {SAVE_VERSION}, got {}", self.save_version),
            });
        }
        if let Some(key) = self.inventories.keys().find(|key| !key.is_owned()) {
            return Err(SaveError::Invalid {
                field: format!("inventories.{key}"),
                message: "key does not carry the garbage day prefix".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns `None` when no save exists yet.
pub(crate) fn load_save(path: &Path) -> Result<Option<SaveGame>, SaveError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| SaveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_save(path, &raw).map(Some)
}

fn parse_save(path: &Path, raw: &str) -> Result<SaveGame, SaveError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let save = serde_path_to_error::deserialize::<_, SaveGame>(&mut deserializer).map_err(
        |error| {
            let field = error.path().to_string();
            SaveError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            }
        },
    )?;
    save.validate()?;
    Ok(save)
}

pub(crate) fn write_save(path: &Path, save: &SaveGame) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(save).map_err(SaveError::Encode)?;
    write_text_atomic(path, &json).map_err(|source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    })
}
