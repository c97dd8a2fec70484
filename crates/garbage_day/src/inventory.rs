use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::host::InventoryHost;
use crate::ids::PointTypeId;
use crate::world::{SoundCue, Tint};

/// Reserved for this subsystem's global inventories.
pub const GLOBAL_INVENTORY_PREFIX: &str = "furyx639.GarbageDay-";

const COLOR_TAG_PREFIX: &str = "color_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryKey(String);

impl InventoryKey {
    pub fn for_point_type(point_type: &PointTypeId) -> Self {
        Self(format!("{GLOBAL_INVENTORY_PREFIX}{point_type}"))
    }

    pub fn from_raw(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_owned(&self) -> bool {
        self.0
            .get(..GLOBAL_INVENTORY_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(GLOBAL_INVENTORY_PREFIX))
    }

    pub fn point_type(&self) -> Option<PointTypeId> {
        if !self.is_owned() {
            return None;
        }
        self.0
            .get(GLOBAL_INVENTORY_PREFIX.len()..)
            .filter(|rest| !rest.is_empty())
            .map(PointTypeId::new)
    }
}

impl fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marks an item placed by a special draw. Checked structurally by the
/// interaction path instead of matching item ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialTag {
    /// Popped out of the can as a world item.
    Droppable,
    /// Handed straight to the player; `lidless` swaps the can sprite.
    DirectAdd { lidless: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub qualified_id: String,
    pub name: String,
    #[serde(default = "default_stack")]
    pub stack: u32,
    #[serde(default)]
    pub context_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialTag>,
}

fn default_stack() -> u32 {
    1
}

impl Item {
    pub fn new(qualified_id: &str, name: &str) -> Self {
        Self {
            qualified_id: qualified_id.to_string(),
            name: name.to_string(),
            stack: 1,
            context_tags: Vec::new(),
            special: None,
        }
    }

    pub fn with_stack(mut self, stack: u32) -> Self {
        self.stack = stack.max(1);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.context_tags.push(tag.to_string());
        self
    }

    pub fn color_tag(&self) -> Option<&str> {
        self.context_tags
            .iter()
            .find_map(|tag| tag.strip_prefix(COLOR_TAG_PREFIX))
            .filter(|color| !color.is_empty())
    }
}

/// Visual state rolled for a point type, copied onto every can bound to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDecor {
    pub tint: Tint,
    #[serde(default)]
    pub pending_sound: Option<SoundCue>,
}

/// Container shared by every can of one point type. Lives in the host's save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedInventory {
    #[serde(default)]
    slots: Vec<Option<Item>>,
    #[serde(default)]
    last_rolled_day: Option<u32>,
    #[serde(default)]
    decor: ContainerDecor,
}

impl SharedInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.slots.iter().flatten()
    }

    /// What the container menu shows. Special items never appear here.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items().filter(|item| item.special.is_none())
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn add(&mut self, item: Item) {
        self.slots.push(Some(item));
    }

    pub fn slot(&self, index: usize) -> Option<&Item> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Removes the item in slot `index`, leaving the slot empty.
    pub fn take_at(&mut self, index: usize) -> Option<Item> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn special_item(&self) -> Option<(usize, SpecialTag)> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.as_ref()
                .and_then(|item| item.special)
                .map(|tag| (index, tag))
        })
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn remove_special(&mut self) -> usize {
        let mut removed = 0;
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|item| item.special.is_some()) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    pub fn compact(&mut self) {
        self.slots.retain(Option::is_some);
    }

    /// Routine end-of-day cleanup: drop special items and empty slots.
    pub fn tidy(&mut self) -> usize {
        let removed = self.remove_special();
        self.compact();
        removed
    }

    pub fn last_rolled_day(&self) -> Option<u32> {
        self.last_rolled_day
    }

    pub fn mark_rolled(&mut self, day: u32, decor: ContainerDecor) {
        self.last_rolled_day = Some(day);
        self.decor = decor;
    }

    pub fn decor(&self) -> &ContainerDecor {
        &self.decor
    }

    /// A can played the rolled sound; rebinding after a reload stays quiet.
    pub fn clear_pending_sound(&mut self) {
        self.decor.pending_sound = None;
    }

    pub fn set_tint(&mut self, tint: Tint) {
        self.decor.tint = tint;
    }
}

/// Resolves point types to their shared inventories in the host store.
#[derive(Debug, Default)]
pub struct SharedInventoryStore {
    handles: HashMap<InventoryKey, PointTypeId>,
}

impl SharedInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(&mut self, point_type: &PointTypeId) -> InventoryKey {
        let key = InventoryKey::for_point_type(point_type);
        match self.handles.entry(key.clone()) {
            Entry::Occupied(existing) if existing.get() != point_type => {
                error!(
                    key = %key,
                    existing = %existing.get(),
                    point_type = %point_type,
                    "shared_inventory_key_collision"
                );
                debug_assert!(
                    false,
                    "inventory key {key} already bound to {}",
                    existing.get()
                );
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(point_type.clone());
            }
        }
        key
    }

    pub fn get_or_create<'h, H>(
        &mut self,
        host: &'h mut H,
        point_type: &PointTypeId,
    ) -> &'h mut SharedInventory
    where
        H: InventoryHost + ?Sized,
    {
        let key = self.key_for(point_type);
        host.global_inventory(&key)
    }

    pub fn bound_count(&self) -> usize {
        self.handles.len()
    }

    pub fn clear_handles(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MapStore(HashMap<InventoryKey, SharedInventory>);

    impl InventoryHost for MapStore {
        fn global_inventory(&mut self, key: &InventoryKey) -> &mut SharedInventory {
            self.0.entry(key.clone()).or_default()
        }
    }

    #[test]
    fn keys_are_prefixed_and_round_trip_point_type() {
        let key = InventoryKey::for_point_type(&PointTypeId::new("Saloon"));
        assert_eq!(key.as_str(), "furyx639.GarbageDay-Saloon");
        assert!(key.is_owned());
        assert_eq!(key.point_type(), Some(PointTypeId::new("Saloon")));
        assert!(!InventoryKey::from_raw("other.Mod-Saloon").is_owned());
        assert!(InventoryKey::from_raw("FURYX639.garbageday-Saloon").is_owned());
    }

    #[test]
    fn same_point_type_shares_one_inventory() {
        let mut host = MapStore::default();
        let mut store = SharedInventoryStore::new();
        let saloon = PointTypeId::new("Saloon");
        store
            .get_or_create(&mut host, &saloon)
            .add(Item::new("(O)168", "Trash"));
        let again = store.get_or_create(&mut host, &saloon);
        assert_eq!(again.item_count(), 1);
        assert_eq!(store.bound_count(), 1);
        assert_eq!(host.0.len(), 1);
    }

    #[test]
    fn tidy_removes_special_items_and_empty_slots() {
        let mut inventory = SharedInventory::new();
        inventory.add(Item::new("(O)168", "Trash"));
        let mut special = Item::new("(O)890", "Qi Bean");
        special.special = Some(SpecialTag::Droppable);
        inventory.add(special);
        inventory.add(Item::new("(O)153", "Green Algae"));
        inventory.take_at(0);

        assert_eq!(inventory.special_item(), Some((1, SpecialTag::Droppable)));
        assert_eq!(inventory.visible_items().count(), 1);
        assert_eq!(inventory.tidy(), 1);
        assert_eq!(inventory.slot_count(), 1);
        assert_eq!(inventory.item_count(), 1);
    }

    #[test]
    fn color_tag_strips_prefix() {
        let item = Item::new("(O)72", "Diamond")
            .with_tag("gem_item")
            .with_tag("color_white");
        assert_eq!(item.color_tag(), Some("white"));
        assert_eq!(Item::new("(O)168", "Trash").color_tag(), None);
    }
}
