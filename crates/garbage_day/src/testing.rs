//! In-memory host for unit tests.

use std::collections::{HashMap, HashSet};

use crate::calendar::GameDate;
use crate::host::{
    Character, InventoryHost, LocationInfo, PlacementError, SocialHost, WorldHost,
};
use crate::ids::{LocationId, MapIdentity, ParticipantId, TilePos};
use crate::inventory::{InventoryKey, Item, SharedInventory};
use crate::world::{SoundCue, WorldObject};

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    pub locations: Vec<LocationInfo>,
    pub objects: HashMap<(LocationId, TilePos), WorldObject>,
    pub inventories: HashMap<InventoryKey, SharedInventory>,
    /// Absolute day numbers that are festivals.
    pub festival_days: HashSet<u32>,
    pub blocked_tiles: HashSet<TilePos>,
    pub luck: f64,
    pub seed: u64,
    pub stats: HashMap<String, u32>,
    pub sounds: Vec<(LocationId, SoundCue)>,
    pub dropped: Vec<(LocationId, TilePos, Item)>,
    pub given: Vec<(ParticipantId, Item)>,
    pub carried_full: bool,
    pub characters: Vec<(LocationId, TilePos, Character)>,
    pub emotes: Vec<(String, u32)>,
    pub dialogues: Vec<(String, String)>,
    pub friendship: HashMap<(ParticipantId, String), i32>,
    pub chats: Vec<(String, Vec<String>)>,
}

impl FakeHost {
    pub fn with_location(id: &str, map: MapIdentity) -> Self {
        let mut host = Self::default();
        host.add_location(id, map);
        host
    }

    pub fn add_location(&mut self, id: &str, map: MapIdentity) {
        self.locations.push(LocationInfo {
            id: LocationId::new(id),
            map,
        });
    }

    pub fn stat(&self, name: &str) -> u32 {
        self.stats.get(name).copied().unwrap_or(0)
    }

    pub fn friendship(&self, participant: ParticipantId, character: &str) -> i32 {
        self.friendship
            .get(&(participant, character.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl WorldHost for FakeHost {
    fn loaded_locations(&self) -> Vec<LocationInfo> {
        self.locations.clone()
    }

    fn object_at_mut(&mut self, location: &LocationId, tile: TilePos) -> Option<&mut WorldObject> {
        self.objects.get_mut(&(location.clone(), tile))
    }

    fn place_object(
        &mut self,
        location: &LocationId,
        tile: TilePos,
        object: WorldObject,
    ) -> Result<(), PlacementError> {
        if !self.locations.iter().any(|info| &info.id == location) {
            return Err(PlacementError::UnknownLocation {
                location: location.clone(),
            });
        }
        if self.blocked_tiles.contains(&tile) {
            return Err(PlacementError::Blocked {
                location: location.clone(),
                tile,
            });
        }
        let slot = (location.clone(), tile);
        if self.objects.contains_key(&slot) {
            return Err(PlacementError::Occupied {
                location: location.clone(),
                tile,
            });
        }
        self.objects.insert(slot, object);
        Ok(())
    }

    fn remove_object(&mut self, location: &LocationId, tile: TilePos) -> Option<WorldObject> {
        self.objects.remove(&(location.clone(), tile))
    }

    fn is_festival_day(&self, date: GameDate) -> bool {
        self.festival_days.contains(&date.absolute_day())
    }

    fn daily_luck(&self, _participant: ParticipantId) -> f64 {
        self.luck
    }

    fn world_seed(&self) -> u64 {
        self.seed
    }

    fn player_name(&self, _participant: ParticipantId) -> String {
        "Farmer".to_string()
    }

    fn increment_stat(&mut self, stat: &str) {
        *self.stats.entry(stat.to_string()).or_default() += 1;
    }

    fn play_sound(&mut self, location: &LocationId, cue: SoundCue) {
        self.sounds.push((location.clone(), cue));
    }

    fn drop_item(&mut self, location: &LocationId, tile: TilePos, item: Item) {
        self.dropped.push((location.clone(), tile, item));
    }

    fn give_item(&mut self, participant: ParticipantId, item: Item) -> Option<Item> {
        if self.carried_full {
            return Some(item);
        }
        self.given.push((participant, item));
        None
    }
}

impl InventoryHost for FakeHost {
    fn global_inventory(&mut self, key: &InventoryKey) -> &mut SharedInventory {
        self.inventories.entry(key.clone()).or_default()
    }
}

impl SocialHost for FakeHost {
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
        self.emotes.push((character.to_string(), emote));
    }

    fn set_dialogue(&mut self, character: &str, dialogue_key: &str) {
        self.dialogues
            .push((character.to_string(), dialogue_key.to_string()));
    }

    fn change_friendship(&mut self, participant: ParticipantId, character: &str, delta: i32) {
        *self
            .friendship
            .entry((participant, character.to_string()))
            .or_default() += delta;
    }

    fn broadcast_chat(&mut self, message_key: &str, args: &[String]) {
        self.chats.push((message_key.to_string(), args.to_vec()));
    }
}
