use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::ids::PointTypeId;
use crate::inventory::{Item, SharedInventory, SpecialTag};
use crate::world::SoundCue;

pub const DEFAULT_BASE_CHANCE: f64 = 0.2;
pub const DROPPABLE_ITEM_ID: &str = "(O)890";
pub const LIDLESS_ITEM_ID: &str = "(H)66";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: String,
    pub name: String,
    #[serde(default = "one")]
    pub weight: u32,
    #[serde(default = "one")]
    pub stack: u32,
    #[serde(default)]
    pub context_tags: Vec<String>,
    #[serde(default)]
    pub mega: bool,
    #[serde(default)]
    pub double_mega: bool,
    #[serde(default)]
    pub add_directly: bool,
}

fn one() -> u32 {
    1
}

fn default_base_chance() -> f64 {
    DEFAULT_BASE_CHANCE
}

impl LootEntry {
    pub fn new(item_id: &str, name: &str, weight: u32) -> Self {
        Self {
            item_id: item_id.to_string(),
            name: name.to_string(),
            weight,
            stack: 1,
            context_tags: Vec::new(),
            mega: false,
            double_mega: false,
            add_directly: false,
        }
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new(&self.item_id, &self.name).with_stack(self.stack);
        item.context_tags = self.context_tags.clone();
        item
    }

    fn sound(&self) -> Option<SoundCue> {
        if self.double_mega {
            Some(SoundCue::DoubleMega)
        } else if self.mega {
            Some(SoundCue::Mega)
        } else {
            None
        }
    }
}

/// Base table for one point type. `base_chance` plus the player's daily luck
/// is the chance that anything is found at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    #[serde(default = "default_base_chance")]
    pub base_chance: f64,
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}

pub trait LootTableSource {
    fn loot_table(&self, point_type: &PointTypeId) -> Option<LootTable>;

    /// Every point type the source knows about. Sources that cannot enumerate
    /// return nothing.
    fn point_types(&self) -> Vec<PointTypeId> {
        Vec::new()
    }
}

impl<F> LootTableSource for F
where
    F: Fn(&PointTypeId) -> Option<LootTable>,
{
    fn loot_table(&self, point_type: &PointTypeId) -> Option<LootTable> {
        self(point_type)
    }
}

#[derive(Debug, Error)]
pub enum LootTableError {
    #[error("failed to read loot tables {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse loot tables {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("loot table '{point_type}' has base_chance {base_chance} outside 0..=1")]
    InvalidChance {
        point_type: PointTypeId,
        base_chance: f64,
    },
}

/// Loot tables keyed by point type, as read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTables(BTreeMap<PointTypeId, LootTable>);

impl LootTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point_type: PointTypeId, table: LootTable) {
        self.0.insert(point_type, table);
    }

    pub fn from_json_str(path: &Path, raw: &str) -> Result<Self, LootTableError> {
        let tables =
            serde_json::from_str::<LootTables>(raw).map_err(|source| LootTableError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn load(path: &Path) -> Result<Self, LootTableError> {
        let raw = fs::read_to_string(path).map_err(|source| LootTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(path, &raw)
    }

    fn validate(&self) -> Result<(), LootTableError> {
        for (point_type, table) in &self.0 {
            if !(0.0..=1.0).contains(&table.base_chance) {
                return Err(LootTableError::InvalidChance {
                    point_type: point_type.clone(),
                    base_chance: table.base_chance,
                });
            }
        }
        Ok(())
    }
}

impl LootTableSource for LootTables {
    fn loot_table(&self, point_type: &PointTypeId) -> Option<LootTable> {
        self.0.get(point_type).cloned()
    }

    fn point_types(&self) -> Vec<PointTypeId> {
        self.0.keys().cloned().collect()
    }
}

/// Item ids with dedicated behavior when drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialItemIds {
    pub droppable: String,
    pub lidless: String,
}

impl Default for SpecialItemIds {
    fn default() -> Self {
        Self {
            droppable: DROPPABLE_ITEM_ID.to_string(),
            lidless: LIDLESS_ITEM_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LootOutcome {
    None,
    Normal { item: Item, color: Option<String> },
    Special(Item),
    Mega(Item),
    DoubleMega(Item),
    DirectAdd { item: Item, sound: Option<SoundCue> },
}

impl LootOutcome {
    pub fn item(&self) -> Option<&Item> {
        match self {
            LootOutcome::None => None,
            LootOutcome::Normal { item, .. }
            | LootOutcome::Special(item)
            | LootOutcome::Mega(item)
            | LootOutcome::DoubleMega(item)
            | LootOutcome::DirectAdd { item, .. } => Some(item),
        }
    }

    /// Sound to play when the container is next consumed.
    pub fn sound(&self) -> Option<SoundCue> {
        match self {
            LootOutcome::Mega(_) => Some(SoundCue::Mega),
            LootOutcome::DoubleMega(_) => Some(SoundCue::DoubleMega),
            LootOutcome::DirectAdd { sound, .. } => *sound,
            _ => None,
        }
    }

    pub fn wants_highlight(&self) -> bool {
        !matches!(self, LootOutcome::None | LootOutcome::Normal { .. })
    }

    pub fn tier_name(&self) -> &'static str {
        match self {
            LootOutcome::None => "none",
            LootOutcome::Normal { .. } => "normal",
            LootOutcome::Special(_) => "special",
            LootOutcome::Mega(_) => "mega",
            LootOutcome::DoubleMega(_) => "double_mega",
            LootOutcome::DirectAdd { .. } => "direct_add",
        }
    }
}

/// Seed for one point type on one day. Luck is hashed by bit pattern so the
/// same float always yields the same seed.
pub fn derive_seed(world_seed: u64, point_type: &PointTypeId, day: u32, luck: f64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(world_seed.to_le_bytes());
    hasher.update(point_type.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(day.to_le_bytes());
    hasher.update(luck.to_bits().to_le_bytes());
    let digest = hasher.finalize();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

#[derive(Debug, Clone)]
pub struct LootEngine<S> {
    source: S,
    special_ids: SpecialItemIds,
}

impl<S: LootTableSource> LootEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            special_ids: SpecialItemIds::default(),
        }
    }

    pub fn with_special_ids(mut self, special_ids: SpecialItemIds) -> Self {
        self.special_ids = special_ids;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn point_types(&self) -> Vec<PointTypeId> {
        self.source.point_types()
    }

    /// Draws today's outcome for `point_type`. Pure in its inputs: the same
    /// point type, day, luck, world seed and existing contents always give
    /// the same outcome.
    pub fn draw(
        &self,
        point_type: &PointTypeId,
        day: u32,
        luck: f64,
        world_seed: u64,
        existing: &SharedInventory,
    ) -> LootOutcome {
        let Some(table) = self.source.loot_table(point_type) else {
            return LootOutcome::None;
        };
        let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(world_seed, point_type, day, luck));

        let chance = (table.base_chance + luck).clamp(0.0, 1.0);
        if rng.gen::<f64>() >= chance {
            return LootOutcome::None;
        }
        let Some(entry) = pick_weighted(&table.entries, &mut rng) else {
            return LootOutcome::None;
        };

        let mut item = entry.to_item();
        if item.qualified_id == self.special_ids.droppable {
            item.special = Some(SpecialTag::Droppable);
            return LootOutcome::Special(item);
        }
        if entry.add_directly {
            item.special = Some(SpecialTag::DirectAdd {
                lidless: item.qualified_id == self.special_ids.lidless,
            });
            return LootOutcome::DirectAdd {
                item,
                sound: entry.sound(),
            };
        }
        if entry.double_mega {
            return LootOutcome::DoubleMega(item);
        }
        if entry.mega {
            return LootOutcome::Mega(item);
        }

        let mut colors = Vec::<&str>::new();
        for color in existing
            .items()
            .chain(std::iter::once(&item))
            .filter_map(Item::color_tag)
        {
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
        let color = if colors.is_empty() {
            None
        } else {
            Some(colors[rng.gen_range(0..colors.len())].to_string())
        };
        LootOutcome::Normal { item, color }
    }
}

fn pick_weighted<'a>(entries: &'a [LootEntry], rng: &mut ChaCha8Rng) -> Option<&'a LootEntry> {
    let total = entries
        .iter()
        .map(|entry| u64::from(entry.weight))
        .sum::<u64>();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for entry in entries {
        let weight = u64::from(entry.weight);
        if roll < weight {
            return Some(entry);
        }
        roll -= weight;
    }
    None
}
