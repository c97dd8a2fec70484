use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use garbage_day::{
    AgeGroup, Character, GameDate, InventoryHost, InventoryKey, Item, LocationId, LocationInfo,
    MapIdentity, ParticipantId, PlacementError, Season, SharedInventory, SocialHost, SoundCue,
    TilePos, WorldHost, WorldObject,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_CARRY_CAPACITY: usize = 12;

/// Static description of the simulated world, read from `world.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WorldFile {
    pub(crate) seed: u64,
    #[serde(default)]
    pub(crate) daily_luck: f64,
    #[serde(default = "default_player_name")]
    pub(crate) player_name: String,
    #[serde(default = "default_carry_capacity")]
    pub(crate) carry_capacity: usize,
    #[serde(default)]
    pub(crate) festivals: Vec<FestivalDay>,
    pub(crate) locations: Vec<LocationFile>,
    #[serde(default)]
    pub(crate) characters: Vec<CharacterFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FestivalDay {
    pub(crate) season: Season,
    pub(crate) day: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LocationFile {
    pub(crate) id: String,
    pub(crate) map: String,
    /// Tiles where nothing can be placed, e.g. a path kept clear.
    #[serde(default)]
    pub(crate) blocked: Vec<TilePos>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CharacterFile {
    pub(crate) location: String,
    pub(crate) tile: TilePos,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) display_name: Option<String>,
    pub(crate) age: AgeGroup,
    #[serde(default)]
    pub(crate) is_mount: bool,
}

fn default_player_name() -> String {
    "Farmer".to_string()
}

fn default_carry_capacity() -> usize {
    DEFAULT_CARRY_CAPACITY
}

#[derive(Debug, Error)]
pub(crate) enum WorldFileError {
    #[error("failed to read world file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse world file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("world file {path} lists location '{location}' twice")]
    DuplicateLocation { path: PathBuf, location: String },
    #[error("character '{name}' in {path} is in unknown location '{location}'")]
    UnknownCharacterLocation {
        path: PathBuf,
        name: String,
        location: String,
    },
}

pub(crate) fn load_world_file(path: &Path) -> Result<WorldFile, WorldFileError> {
    let raw = fs::read_to_string(path).map_err(|source| WorldFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_world_file(path, &raw)
}

pub(crate) fn parse_world_file(path: &Path, raw: &str) -> Result<WorldFile, WorldFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let world = serde_path_to_error::deserialize::<_, WorldFile>(&mut deserializer).map_err(
        |error| {
            let field = error.path().to_string();
            WorldFileError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            }
        },
    )?;

    let mut seen = BTreeSet::new();
    for location in &world.locations {
        if !seen.insert(location.id.as_str()) {
            return Err(WorldFileError::DuplicateLocation {
                path: path.to_path_buf(),
                location: location.id.clone(),
            });
        }
    }
    if let Some(character) = world
        .characters
        .iter()
        .find(|character| !seen.contains(character.location.as_str()))
    {
        return Err(WorldFileError::UnknownCharacterLocation {
            path: path.to_path_buf(),
            name: character.name.clone(),
            location: character.location.clone(),
        });
    }
    Ok(world)
}

#[derive(Debug)]
struct SimLocation {
    info: LocationInfo,
    blocked: BTreeSet<TilePos>,
    objects: BTreeMap<TilePos, WorldObject>,
}

/// In-memory host world. Everything the engine touches lives here and is
/// logged as it happens.
#[derive(Debug)]
pub(crate) struct SimWorld {
    seed: u64,
    daily_luck: f64,
    player_name: String,
    carry_capacity: usize,
    festivals: BTreeSet<(Season, u8)>,
    locations: Vec<SimLocation>,
    characters: Vec<(LocationId, TilePos, Character)>,
    pub(crate) inventories: BTreeMap<InventoryKey, SharedInventory>,
    pub(crate) carried: Vec<Item>,
    pub(crate) stats: BTreeMap<String, u32>,
    pub(crate) friendship: BTreeMap<String, i32>,
    pub(crate) loose_items: Vec<(LocationId, TilePos, Item)>,
}

impl SimWorld {
    pub(crate) fn from_file(file: WorldFile) -> Self {
        let locations = file
            .locations
            .into_iter()
            .map(|location| SimLocation {
                info: LocationInfo {
                    id: LocationId::new(location.id),
                    map: MapIdentity::new(&location.map),
                },
                blocked: location.blocked.into_iter().collect(),
                objects: BTreeMap::new(),
            })
            .collect();
        let characters = file
            .characters
            .into_iter()
            .map(|character| {
                let display_name = character
                    .display_name
                    .unwrap_or_else(|| character.name.clone());
                (
                    LocationId::new(character.location),
                    character.tile,
                    Character {
                        name: character.name,
                        display_name,
                        age: character.age,
                        is_mount: character.is_mount,
                    },
                )
            })
            .collect();

        Self {
            seed: file.seed,
            daily_luck: file.daily_luck,
            player_name: file.player_name,
            carry_capacity: file.carry_capacity,
            festivals: file
                .festivals
                .into_iter()
                .map(|festival| (festival.season, festival.day))
                .collect(),
            locations,
            characters,
            inventories: BTreeMap::new(),
            carried: Vec::new(),
            stats: BTreeMap::new(),
            friendship: BTreeMap::new(),
            loose_items: Vec::new(),
        }
    }

    /// Distinct map assets the loaded locations need.
    pub(crate) fn map_identities(&self) -> BTreeSet<MapIdentity> {
        self.locations
            .iter()
            .map(|location| location.info.map.clone())
            .collect()
    }

    /// Every placed can, in location then tile order.
    pub(crate) fn placed_objects(&self) -> Vec<(LocationId, TilePos)> {
        self.locations
            .iter()
            .flat_map(|location| {
                location
                    .objects
                    .keys()
                    .map(move |tile| (location.info.id.clone(), *tile))
            })
            .collect()
    }

    /// Moves every visible item of `key` into the player's bag, as a player
    /// emptying the container menu would. Returns how many were taken.
    pub(crate) fn take_visible(&mut self, key: &InventoryKey) -> usize {
        let room = self.carry_capacity.saturating_sub(self.carried.len());
        let Some(inventory) = self.inventories.get_mut(key) else {
            return 0;
        };
        let visible = (0..inventory.slot_count())
            .filter(|index| {
                inventory
                    .slot(*index)
                    .is_some_and(|item| item.special.is_none())
            })
            .take(room)
            .collect::<Vec<_>>();
        for index in &visible {
            if let Some(item) = inventory.take_at(*index) {
                info!(item = %item.name, stack = item.stack, "item_taken");
                self.carried.push(item);
            }
        }
        visible.len()
    }

    fn location_mut(&mut self, location: &LocationId) -> Option<&mut SimLocation> {
        self.locations
            .iter_mut()
            .find(|candidate| &candidate.info.id == location)
    }
}

impl WorldHost for SimWorld {
    fn loaded_locations(&self) -> Vec<LocationInfo> {
        self.locations
            .iter()
            .map(|location| location.info.clone())
            .collect()
    }

    fn object_at_mut(&mut self, location: &LocationId, tile: TilePos) -> Option<&mut WorldObject> {
        self.location_mut(location)?.objects.get_mut(&tile)
    }

    fn place_object(
        &mut self,
        location: &LocationId,
        tile: TilePos,
        object: WorldObject,
    ) -> Result<(), PlacementError> {
        let Some(target) = self.location_mut(location) else {
            return Err(PlacementError::UnknownLocation {
                location: location.clone(),
            });
        };
        if target.blocked.contains(&tile) {
            return Err(PlacementError::Blocked {
                location: location.clone(),
                tile,
            });
        }
        if target.objects.contains_key(&tile) {
            return Err(PlacementError::Occupied {
                location: location.clone(),
                tile,
            });
        }
        target.objects.insert(tile, object);
        Ok(())
    }

    fn remove_object(&mut self, location: &LocationId, tile: TilePos) -> Option<WorldObject> {
        self.location_mut(location)?.objects.remove(&tile)
    }

    fn is_festival_day(&self, date: GameDate) -> bool {
        self.festivals.contains(&(date.season, date.day_of_month))
    }

    fn daily_luck(&self, _participant: ParticipantId) -> f64 {
        self.daily_luck
    }

    fn world_seed(&self) -> u64 {
        self.seed
    }

    fn player_name(&self, _participant: ParticipantId) -> String {
        self.player_name.clone()
    }

    fn increment_stat(&mut self, stat: &str) {
        *self.stats.entry(stat.to_string()).or_default() += 1;
    }

    fn play_sound(&mut self, location: &LocationId, cue: SoundCue) {
        debug!(location = %location, sound = cue.sound_id(), "sound_played");
    }

    fn drop_item(&mut self, location: &LocationId, tile: TilePos, item: Item) {
        info!(location = %location, tile = %tile, item = %item.name, "item_dropped");
        self.loose_items.push((location.clone(), tile, item));
    }

    fn give_item(&mut self, _participant: ParticipantId, item: Item) -> Option<Item> {
        if self.carried.len() >= self.carry_capacity {
            return Some(item);
        }
        self.carried.push(item);
        None
    }
}

impl InventoryHost for SimWorld {
    fn global_inventory(&mut self, key: &InventoryKey) -> &mut SharedInventory {
        self.inventories.entry(key.clone()).or_default()
    }
}

impl SocialHost for SimWorld {
    fn nearest_character(
        &self,
        location: &LocationId,
        tile: TilePos,
        radius: u32,
    ) -> Option<Character> {
        let distance = |other: TilePos| {
            let dx = i64::from(other.x) - i64::from(tile.x);
            let dy = i64::from(other.y) - i64::from(tile.y);
            dx * dx + dy * dy
        };
        let limit = i64::from(radius) * i64::from(radius);
        self.characters
            .iter()
            .filter(|(at, position, _)| at == location && distance(*position) <= limit)
            .min_by_key(|(_, position, _)| distance(*position))
            .map(|(_, _, character)| character.clone())
    }

    fn emote(&mut self, character: &str, emote: u32) {
        debug!(character, emote, "emote_shown");
    }

    fn set_dialogue(&mut self, character: &str, dialogue_key: &str) {
        debug!(character, dialogue_key, "dialogue_set");
    }

    fn change_friendship(&mut self, _participant: ParticipantId, character: &str, delta: i32) {
        let points = self.friendship.entry(character.to_string()).or_default();
        *points += delta;
        info!(character, delta, points = *points, "friendship_changed");
    }

    fn broadcast_chat(&mut self, message_key: &str, args: &[String]) {
        info!(message_key, args = ?args, "chat_broadcast");
    }
}
