//! What the engine needs from the game it runs inside.
//!
//! The host owns placed objects, global inventories and characters. The
//! engine only reads and mutates them through these traits, so a real game
//! binding and the headless simulator look the same from the inside.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::GameDate;
use crate::ids::{LocationId, MapIdentity, ParticipantId, TilePos};
use crate::inventory::{InventoryKey, Item, SharedInventory};
use crate::world::{SoundCue, WorldObject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    pub id: LocationId,
    pub map: MapIdentity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Adult,
    Teen,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub display_name: String,
    pub age: AgeGroup,
    /// Horses and other mounts never react.
    pub is_mount: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("location {location} is not loaded")]
    UnknownLocation { location: LocationId },
    #[error("tile {tile} in {location} is already occupied")]
    Occupied { location: LocationId, tile: TilePos },
    #[error("tile {tile} in {location} cannot hold objects")]
    Blocked { location: LocationId, tile: TilePos },
}

pub trait WorldHost {
    /// Locations currently loaded in the world, each with its map asset.
    fn loaded_locations(&self) -> Vec<LocationInfo>;

    fn object_at_mut(&mut self, location: &LocationId, tile: TilePos) -> Option<&mut WorldObject>;

    fn place_object(
        &mut self,
        location: &LocationId,
        tile: TilePos,
        object: WorldObject,
    ) -> Result<(), PlacementError>;

    fn remove_object(&mut self, location: &LocationId, tile: TilePos) -> Option<WorldObject>;

    fn is_festival_day(&self, date: GameDate) -> bool;

    fn daily_luck(&self, participant: ParticipantId) -> f64;

    /// Per-save seed mixed into every loot draw.
    fn world_seed(&self) -> u64;

    fn player_name(&self, participant: ParticipantId) -> String;

    fn increment_stat(&mut self, stat: &str);

    fn play_sound(&mut self, location: &LocationId, cue: SoundCue);

    /// Spawns `item` as a loose world item popping out of the object at `tile`.
    fn drop_item(&mut self, location: &LocationId, tile: TilePos, item: Item);

    /// Adds `item` to the participant's carried inventory. Returns what did
    /// not fit.
    fn give_item(&mut self, participant: ParticipantId, item: Item) -> Option<Item>;
}

pub trait InventoryHost {
    /// World-scoped inventory for `key`, created empty on first use.
    fn global_inventory(&mut self, key: &InventoryKey) -> &mut SharedInventory;
}

pub trait SocialHost {
    fn nearest_character(
        &self,
        location: &LocationId,
        tile: TilePos,
        radius: u32,
    ) -> Option<Character>;

    fn emote(&mut self, character: &str, emote: u32);

    fn set_dialogue(&mut self, character: &str, dialogue_key: &str);

    fn change_friendship(&mut self, participant: ParticipantId, character: &str, delta: i32);

    fn broadcast_chat(&mut self, message_key: &str, args: &[String]);
}

pub trait Host: WorldHost + InventoryHost + SocialHost {}

impl<T> Host for T where T: WorldHost + InventoryHost + SocialHost {}
