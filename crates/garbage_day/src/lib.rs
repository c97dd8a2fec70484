//! Collection-point lifecycle and loot engine.
//!
//! Maps are scanned for `Garbage <type>` actions, a can is placed at each
//! site every morning and removed every night, and each point type draws its
//! loot once per day into an inventory shared by every can of that type.

mod atomic_io;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod context;
pub mod cycle;
pub mod host;
pub mod ids;
pub mod interaction;
pub mod inventory;
pub mod loot;
pub mod map;
pub mod world;

#[cfg(test)]
mod testing;

pub use atomic_io::write_text_atomic;
pub use cache::LocationCache;
pub use calendar::{GameDate, GameDateError, Season, DAYS_PER_SEASON};
pub use config::{
    load_or_create_config, write_config, ConfigError, GarbageDayConfig, CONFIG_FILE_NAME,
};
pub use context::{GarbageDay, Role};
pub use cycle::{
    decide_collection, CollectionDecision, CycleState, DayCycleController, DayEndReport,
    DayStartReport,
};
pub use host::{
    AgeGroup, Character, Host, InventoryHost, LocationInfo, PlacementError, SocialHost, WorldHost,
};
pub use ids::{LocationId, MapIdentity, ParticipantId, PointTypeId, TilePos};
pub use interaction::{
    reaction_for, InteractionError, InteractionEvent, InteractionResolver, NpcReaction,
    OpenOutcome, CHECKED_STAT,
};
pub use inventory::{
    ContainerDecor, InventoryKey, Item, SharedInventory, SharedInventoryStore, SpecialTag,
    GLOBAL_INVENTORY_PREFIX,
};
pub use loot::{
    LootEngine, LootEntry, LootOutcome, LootTable, LootTableError, LootTableSource, LootTables,
    SpecialItemIds,
};
pub use map::{
    load_map_file, parse_map_document, scan_map, CollectionPointSite, LoadedMap, MapData,
    MapLoadError, PatchReport, ScanResult, TilePatch,
};
pub use world::{AccessLock, LockGrant, SoundCue, Tint, WorldObject, COLLECTION_POINT_ITEM_ID};
