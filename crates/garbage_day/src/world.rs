use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ids::ParticipantId;
use crate::inventory::{ContainerDecor, InventoryKey};

/// Item id of the placeable can object.
pub const COLLECTION_POINT_ITEM_ID: &str = "furyx639.GarbageCan_GarbageCan";

/// Visual variant of a placed can.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tint {
    #[default]
    Plain,
    Lidless,
    Prismatic,
    /// Color taken from an item's `color_*` context tag.
    Tagged(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Mega,
    DoubleMega,
    Open,
}

impl SoundCue {
    pub fn sound_id(self) -> &'static str {
        match self {
            SoundCue::Mega => "crit",
            SoundCue::DoubleMega => "explosion",
            SoundCue::Open => "trashcan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockGrant {
    Granted,
    Queued { position: usize },
}

/// FIFO exclusive-access lock on one container. Waiters are granted in
/// request order as holders release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessLock {
    holder: Option<ParticipantId>,
    waiters: VecDeque<ParticipantId>,
}

impl AccessLock {
    pub fn holder(&self) -> Option<ParticipantId> {
        self.holder
    }

    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    pub fn request(&mut self, participant: ParticipantId) -> LockGrant {
        match self.holder {
            None => {
                self.holder = Some(participant);
                LockGrant::Granted
            }
            Some(holder) if holder == participant => LockGrant::Granted,
            Some(_) => {
                let position = match self.waiters.iter().position(|id| *id == participant) {
                    Some(index) => index,
                    None => {
                        self.waiters.push_back(participant);
                        self.waiters.len() - 1
                    }
                };
                LockGrant::Queued { position }
            }
        }
    }

    /// Releases or cancels `participant`'s claim. Returns the participant that
    /// now holds the lock, if the holder changed to someone else.
    pub fn release(&mut self, participant: ParticipantId) -> Option<ParticipantId> {
        if self.holder == Some(participant) {
            self.holder = self.waiters.pop_front();
            return self.holder;
        }
        self.waiters.retain(|id| *id != participant);
        None
    }
}

/// The placed can for one site on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldObject {
    pub item_id: String,
    pub tint: Tint,
    inventory_key: Option<InventoryKey>,
    checked: bool,
    pending_sound: Option<SoundCue>,
    lock: AccessLock,
}

impl WorldObject {
    pub fn collection_point() -> Self {
        Self::with_item_id(COLLECTION_POINT_ITEM_ID)
    }

    pub fn with_item_id(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            tint: Tint::Plain,
            inventory_key: None,
            checked: false,
            pending_sound: None,
            lock: AccessLock::default(),
        }
    }

    pub fn is_collection_point(&self) -> bool {
        self.item_id.eq_ignore_ascii_case(COLLECTION_POINT_ITEM_ID)
    }

    /// Points the object at its shared inventory and copies the day's decor.
    pub fn bind(&mut self, key: InventoryKey, decor: &ContainerDecor) {
        self.inventory_key = Some(key);
        self.tint = decor.tint.clone();
        self.pending_sound = decor.pending_sound;
    }

    pub fn inventory_key(&self) -> Option<&InventoryKey> {
        self.inventory_key.as_ref()
    }

    /// Key of the bound inventory, only if it belongs to this subsystem.
    pub fn owned_inventory_key(&self) -> Option<&InventoryKey> {
        self.inventory_key.as_ref().filter(|key| key.is_owned())
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Returns `true` the first time the object is checked this cycle.
    pub fn mark_checked(&mut self) -> bool {
        !std::mem::replace(&mut self.checked, true)
    }

    pub fn reset_checked(&mut self) {
        self.checked = false;
    }

    pub fn pending_sound(&self) -> Option<SoundCue> {
        self.pending_sound
    }

    pub fn take_pending_sound(&mut self) -> Option<SoundCue> {
        self.pending_sound.take()
    }

    pub fn lock(&self) -> &AccessLock {
        &self.lock
    }

    pub fn lock_mut(&mut self) -> &mut AccessLock {
        &mut self.lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PointTypeId;

    #[test]
    fn lock_grants_in_request_order() {
        let mut lock = AccessLock::default();
        let (a, b, c) = (ParticipantId(1), ParticipantId(2), ParticipantId(3));
        assert_eq!(lock.request(a), LockGrant::Granted);
        assert_eq!(lock.request(b), LockGrant::Queued { position: 0 });
        assert_eq!(lock.request(c), LockGrant::Queued { position: 1 });
        assert_eq!(lock.request(b), LockGrant::Queued { position: 0 });
        assert_eq!(lock.waiting(), 2);

        assert_eq!(lock.release(a), Some(b));
        assert_eq!(lock.holder(), Some(b));
        assert_eq!(lock.release(b), Some(c));
        assert_eq!(lock.release(c), None);
        assert_eq!(lock.holder(), None);
    }

    #[test]
    fn releasing_a_waiter_cancels_its_request() {
        let mut lock = AccessLock::default();
        lock.request(ParticipantId(1));
        lock.request(ParticipantId(2));
        assert_eq!(lock.release(ParticipantId(2)), None);
        assert_eq!(lock.release(ParticipantId(1)), None);
        assert_eq!(lock.holder(), None);
    }

    #[test]
    fn checked_flips_once_per_cycle() {
        let mut object = WorldObject::collection_point();
        assert!(object.mark_checked());
        assert!(!object.mark_checked());
        object.reset_checked();
        assert!(object.mark_checked());
    }

    #[test]
    fn bind_copies_decor() {
        let mut object = WorldObject::collection_point();
        let decor = ContainerDecor {
            tint: Tint::Prismatic,
            pending_sound: Some(SoundCue::DoubleMega),
        };
        object.bind(InventoryKey::for_point_type(&PointTypeId::new("Saloon")), &decor);
        assert_eq!(object.tint, Tint::Prismatic);
        assert_eq!(object.take_pending_sound(), Some(SoundCue::DoubleMega));
        assert_eq!(object.take_pending_sound(), None);
        assert!(object.owned_inventory_key().is_some());
    }
}
