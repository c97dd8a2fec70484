use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::host::{AgeGroup, Character, Host};
use crate::ids::{LocationId, ParticipantId, TilePos};
use crate::inventory::{InventoryKey, Item, SpecialTag};
use crate::world::{LockGrant, SoundCue, Tint};

pub const SOCIAL_RADIUS: u32 = 7;
pub const CHECKED_STAT: &str = "trashCansChecked";
pub const WITNESS_CHAT_KEY: &str = "TrashCan";
pub const TOLERANT_CHARACTER: &str = "Linus";

const TOLERANT_CHAT_KEY: &str = "LinusTrashCan";
const DIALOGUE_KEY_PREFIX: &str = "Data\\ExtraDialogue:Town_DumpsterDiveComment_";

/// How a witness responds to someone going through the trash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpcReaction {
    pub emote: u32,
    pub friendship_delta: i32,
    pub dialogue_key: String,
    pub extra_chat: Option<&'static str>,
}

pub fn reaction_for(character: &Character) -> NpcReaction {
    if character.name == TOLERANT_CHARACTER {
        return NpcReaction {
            emote: 32,
            friendship_delta: 5,
            dialogue_key: format!("{DIALOGUE_KEY_PREFIX}Linus"),
            extra_chat: Some(TOLERANT_CHAT_KEY),
        };
    }
    let (emote, suffix) = match character.age {
        AgeGroup::Child => (28, "Child"),
        AgeGroup::Teen => (8, "Teen"),
        AgeGroup::Adult => (12, "Adult"),
    };
    NpcReaction {
        emote,
        friendship_delta: -25,
        dialogue_key: format!("{DIALOGUE_KEY_PREFIX}{suffix}"),
        extra_chat: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    NpcReacted {
        participant: ParticipantId,
        character: String,
        emote: u32,
        friendship_delta: i32,
    },
    /// Display layer should open the container menu for `key`.
    ShowContainer {
        participant: ParticipantId,
        key: InventoryKey,
    },
    /// Someone else has the container open.
    Queued {
        participant: ParticipantId,
        position: usize,
    },
    ItemDropped {
        item: Item,
    },
    ItemGranted {
        participant: ParticipantId,
        item: Item,
        /// Carried inventory was full; the item was dropped instead.
        dropped: bool,
    },
    /// Show the witness' dialogue now that the menu is closed.
    DeferredDialogue {
        participant: ParticipantId,
        character: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Not a can of ours; the host's default action proceeds.
    NotOurs,
    /// Default action suppressed.
    Handled(Vec<InteractionEvent>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("no object at {tile} in {location}")]
    NoObject { location: LocationId, tile: TilePos },
}

/// Open/close state machine for placed cans. Holds the witness queued per
/// participant until that participant's container menu closes. Opens that
/// never show a menu drop the entry straight away.
#[derive(Debug, Default)]
pub struct InteractionResolver {
    queued_characters: HashMap<ParticipantId, String>,
}

impl InteractionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued_character(&self, participant: ParticipantId) -> Option<&str> {
        self.queued_characters.get(&participant).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.queued_characters.clear();
    }

    pub fn open<H>(
        &mut self,
        host: &mut H,
        participant: ParticipantId,
        location: &LocationId,
        tile: TilePos,
    ) -> Result<OpenOutcome, InteractionError>
    where
        H: Host + ?Sized,
    {
        let key = {
            let object = host
                .object_at_mut(location, tile)
                .ok_or_else(|| InteractionError::NoObject {
                    location: location.clone(),
                    tile,
                })?;
            match object.owned_inventory_key() {
                Some(key) => key.clone(),
                None => return Ok(OpenOutcome::NotOurs),
            }
        };

        let mut events = Vec::new();
        self.react_to_witness(host, participant, location, tile, &mut events);

        let newly_checked = host
            .object_at_mut(location, tile)
            .is_some_and(|object| object.mark_checked());
        if newly_checked {
            host.increment_stat(CHECKED_STAT);
        }

        let special = host.global_inventory(&key).special_item();
        match special {
            Some((index, tag)) => {
                if !claim(host, participant, location, tile, &mut events) {
                    return Ok(OpenOutcome::Handled(events));
                }
                // No menu follows, so nothing will close over the witness.
                self.queued_characters.remove(&participant);
                match tag {
                    SpecialTag::Droppable => {
                        if let Some(item) = host.global_inventory(&key).take_at(index) {
                            info!(
                                participant = %participant,
                                item = %item.name,
                                "special_item_dropped"
                            );
                            host.drop_item(location, tile, item.clone());
                            events.push(InteractionEvent::ItemDropped { item });
                        }
                        set_tint(host, &key, location, tile, Tint::Plain);
                    }
                    SpecialTag::DirectAdd { lidless } => {
                        if lidless {
                            set_tint(host, &key, location, tile, Tint::Lidless);
                        }
                        play_pending_sound(host, &key, location, tile);
                        if let Some(item) = host.global_inventory(&key).take_at(index) {
                            let dropped = match host.give_item(participant, item.clone()) {
                                Some(leftover) => {
                                    host.drop_item(location, tile, leftover);
                                    true
                                }
                                None => false,
                            };
                            info!(
                                participant = %participant,
                                item = %item.name,
                                dropped,
                                "direct_item_granted"
                            );
                            events.push(InteractionEvent::ItemGranted {
                                participant,
                                item,
                                dropped,
                            });
                        }
                    }
                }
                hand_over(host, participant, location, tile, &mut events);
            }
            None => {
                play_pending_sound(host, &key, location, tile);
                if claim(host, participant, location, tile, &mut events) {
                    host.play_sound(location, SoundCue::Open);
                    events.push(InteractionEvent::ShowContainer { participant, key });
                }
            }
        }

        Ok(OpenOutcome::Handled(events))
    }

    /// Called when `participant`'s container menu closes, or when a queued
    /// participant gives up waiting.
    pub fn close<H>(
        &mut self,
        host: &mut H,
        participant: ParticipantId,
        location: &LocationId,
        tile: TilePos,
    ) -> Vec<InteractionEvent>
    where
        H: Host + ?Sized,
    {
        let mut events = Vec::new();
        if let Some(character) = self.queued_characters.remove(&participant) {
            events.push(InteractionEvent::DeferredDialogue {
                participant,
                character,
            });
        }

        hand_over(host, participant, location, tile, &mut events);
        events
    }

    fn react_to_witness<H>(
        &mut self,
        host: &mut H,
        participant: ParticipantId,
        location: &LocationId,
        tile: TilePos,
        events: &mut Vec<InteractionEvent>,
    ) where
        H: Host + ?Sized,
    {
        let Some(character) = host
            .nearest_character(location, tile, SOCIAL_RADIUS)
            .filter(|character| !character.is_mount)
        else {
            return;
        };
        self.queued_characters
            .insert(participant, character.name.clone());

        let args = [host.player_name(participant), character.display_name.clone()];
        host.broadcast_chat(WITNESS_CHAT_KEY, &args);

        let reaction = reaction_for(&character);
        host.emote(&character.name, reaction.emote);
        host.set_dialogue(&character.name, &reaction.dialogue_key);
        host.change_friendship(participant, &character.name, reaction.friendship_delta);
        if let Some(chat) = reaction.extra_chat {
            host.broadcast_chat(chat, &args);
        }
        info!(
            participant = %participant,
            character = %character.name,
            friendship_delta = reaction.friendship_delta,
            "witness_reacted"
        );
        events.push(InteractionEvent::NpcReacted {
            participant,
            character: character.name,
            emote: reaction.emote,
            friendship_delta: reaction.friendship_delta,
        });
    }
}

/// Requests the can's lock for `participant`. Returns `false` and records
/// the wait when someone else holds it.
fn claim<H>(
    host: &mut H,
    participant: ParticipantId,
    location: &LocationId,
    tile: TilePos,
    events: &mut Vec<InteractionEvent>,
) -> bool
where
    H: Host + ?Sized,
{
    let grant = host
        .object_at_mut(location, tile)
        .map(|object| object.lock_mut().request(participant));
    match grant {
        Some(LockGrant::Granted) => true,
        Some(LockGrant::Queued { position }) => {
            debug!(participant = %participant, position, "container_open_queued");
            events.push(InteractionEvent::Queued {
                participant,
                position,
            });
            false
        }
        None => false,
    }
}

/// Releases `participant`'s claim on the can and shows the container to
/// whoever was waiting next.
fn hand_over<H>(
    host: &mut H,
    participant: ParticipantId,
    location: &LocationId,
    tile: TilePos,
    events: &mut Vec<InteractionEvent>,
) where
    H: Host + ?Sized,
{
    let Some(object) = host.object_at_mut(location, tile) else {
        trace!(location = %location, tile = %tile, "container_closed_without_object");
        return;
    };
    let key = object.owned_inventory_key().cloned();
    let next = object.lock_mut().release(participant);
    if let (Some(next), Some(key)) = (next, key) {
        host.play_sound(location, SoundCue::Open);
        events.push(InteractionEvent::ShowContainer {
            participant: next,
            key,
        });
    }
}

/// Plays the rolled sound once. The shared decor forgets it too, so a can
/// rebound after a reload does not play it again.
fn play_pending_sound<H>(host: &mut H, key: &InventoryKey, location: &LocationId, tile: TilePos)
where
    H: Host + ?Sized,
{
    let sound = host
        .object_at_mut(location, tile)
        .and_then(|object| object.take_pending_sound());
    if let Some(sound) = sound {
        host.play_sound(location, sound);
        host.global_inventory(key).clear_pending_sound();
    }
}

fn set_tint<H>(host: &mut H, key: &InventoryKey, location: &LocationId, tile: TilePos, tint: Tint)
where
    H: Host + ?Sized,
{
    if let Some(object) = host.object_at_mut(location, tile) {
        object.tint = tint.clone();
    }
    host.global_inventory(key).set_tint(tint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InventoryHost, WorldHost};
    use crate::ids::{MapIdentity, PointTypeId};
    use crate::inventory::ContainerDecor;
    use crate::testing::FakeHost;
    use crate::world::WorldObject;

    const CAN: TilePos = TilePos::new(4, 4);

    fn town() -> LocationId {
        LocationId::new("Town")
    }

    fn saloon_key() -> InventoryKey {
        InventoryKey::for_point_type(&PointTypeId::new("Saloon"))
    }

    fn host_with_can(decor: ContainerDecor) -> FakeHost {
        let mut host = FakeHost::with_location("Town", MapIdentity::new("Maps/Town"));
        let mut object = WorldObject::collection_point();
        object.bind(saloon_key(), &decor);
        host.place_object(&town(), CAN, object).expect("place can");
        host
    }

    fn character(name: &str, age: AgeGroup) -> Character {
        Character {
            name: name.to_string(),
            display_name: name.to_string(),
            age,
            is_mount: false,
        }
    }

    fn events(outcome: OpenOutcome) -> Vec<InteractionEvent> {
        match outcome {
            OpenOutcome::Handled(events) => events,
            OpenOutcome::NotOurs => panic!("expected handled"),
        }
    }

    #[test]
    fn reactions_follow_age_and_tolerant_character() {
        let linus = reaction_for(&character("Linus", AgeGroup::Adult));
        assert_eq!(linus.emote, 32);
        assert_eq!(linus.friendship_delta, 5);
        assert_eq!(linus.extra_chat, Some("LinusTrashCan"));
        assert!(linus.dialogue_key.ends_with("_Linus"));

        for (age, emote, suffix) in [
            (AgeGroup::Child, 28, "_Child"),
            (AgeGroup::Teen, 8, "_Teen"),
            (AgeGroup::Adult, 12, "_Adult"),
        ] {
            let reaction = reaction_for(&character("Lewis", age));
            assert_eq!(reaction.emote, emote);
            assert_eq!(reaction.friendship_delta, -25);
            assert!(reaction.dialogue_key.ends_with(suffix));
            assert_eq!(reaction.extra_chat, None);
        }
    }

    #[test]
    fn foreign_inventory_is_not_ours() {
        let mut host = FakeHost::with_location("Town", MapIdentity::new("Maps/Town"));
        let mut object = WorldObject::collection_point();
        object.bind(InventoryKey::from_raw("other.Mod-Saloon"), &ContainerDecor::default());
        host.place_object(&town(), CAN, object).expect("place");

        let outcome = InteractionResolver::new()
            .open(&mut host, ParticipantId::HOST, &town(), CAN)
            .expect("open");
        assert_eq!(outcome, OpenOutcome::NotOurs);
        assert_eq!(host.stat(CHECKED_STAT), 0);
    }

    #[test]
    fn missing_object_is_an_error() {
        let mut host = FakeHost::with_location("Town", MapIdentity::new("Maps/Town"));
        let result = InteractionResolver::new().open(&mut host, ParticipantId::HOST, &town(), CAN);
        assert!(matches!(result, Err(InteractionError::NoObject { .. })));
    }

    #[test]
    fn second_participant_waits_for_first_to_close() {
        let mut host = host_with_can(ContainerDecor::default());
        let mut resolver = InteractionResolver::new();
        let first = ParticipantId(1);
        let second = ParticipantId(2);

        let opened = events(resolver.open(&mut host, first, &town(), CAN).expect("open"));
        assert!(opened.contains(&InteractionEvent::ShowContainer {
            participant: first,
            key: saloon_key(),
        }));
        let waiting = events(resolver.open(&mut host, second, &town(), CAN).expect("open"));
        assert!(waiting.contains(&InteractionEvent::Queued {
            participant: second,
            position: 0,
        }));

        let closed = resolver.close(&mut host, first, &town(), CAN);
        assert!(closed.contains(&InteractionEvent::ShowContainer {
            participant: second,
            key: saloon_key(),
        }));
        let object = host.object_at_mut(&town(), CAN).expect("object");
        assert_eq!(object.lock().holder(), Some(second));
        assert_eq!(
            host.sounds
                .iter()
                .filter(|(_, cue)| *cue == SoundCue::Open)
                .count(),
            2
        );
    }

    #[test]
    fn checked_stat_counts_once_per_object() {
        let mut host = host_with_can(ContainerDecor::default());
        let mut resolver = InteractionResolver::new();
        for _ in 0..3 {
            resolver
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open");
            resolver.close(&mut host, ParticipantId::HOST, &town(), CAN);
        }
        assert_eq!(host.stat(CHECKED_STAT), 1);
    }

    #[test]
    fn direct_add_bypasses_container() {
        let mut host = host_with_can(ContainerDecor {
            tint: Tint::Prismatic,
            pending_sound: Some(SoundCue::DoubleMega),
        });
        let mut hat = Item::new("(H)66", "Garbage Hat");
        hat.special = Some(SpecialTag::DirectAdd { lidless: true });
        host.global_inventory(&saloon_key()).add(hat.clone());

        let result = events(
            InteractionResolver::new()
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert!(!result
            .iter()
            .any(|event| matches!(event, InteractionEvent::ShowContainer { .. })));
        assert!(result.contains(&InteractionEvent::ItemGranted {
            participant: ParticipantId::HOST,
            item: hat.clone(),
            dropped: false,
        }));
        assert_eq!(host.given, vec![(ParticipantId::HOST, hat)]);
        assert!(host.global_inventory(&saloon_key()).is_empty());
        assert_eq!(host.sounds, vec![(town(), SoundCue::DoubleMega)]);
        let object = host.object_at_mut(&town(), CAN).expect("object");
        assert_eq!(object.tint, Tint::Lidless);
        assert_eq!(object.pending_sound(), None);
    }

    #[test]
    fn direct_add_drops_when_carried_inventory_is_full() {
        let mut host = host_with_can(ContainerDecor::default());
        host.carried_full = true;
        let mut ring = Item::new("(O)529", "Amethyst Ring");
        ring.special = Some(SpecialTag::DirectAdd { lidless: false });
        host.global_inventory(&saloon_key()).add(ring.clone());

        let result = events(
            InteractionResolver::new()
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert!(result.contains(&InteractionEvent::ItemGranted {
            participant: ParticipantId::HOST,
            item: ring.clone(),
            dropped: true,
        }));
        assert_eq!(host.dropped, vec![(town(), CAN, ring)]);
    }

    #[test]
    fn droppable_pops_out_without_opening() {
        let mut host = host_with_can(ContainerDecor {
            tint: Tint::Prismatic,
            pending_sound: None,
        });
        let mut bean = Item::new("(O)890", "Qi Bean");
        bean.special = Some(SpecialTag::Droppable);
        host.global_inventory(&saloon_key()).add(bean.clone());

        let result = events(
            InteractionResolver::new()
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert_eq!(result, vec![InteractionEvent::ItemDropped { item: bean.clone() }]);
        assert_eq!(host.dropped, vec![(town(), CAN, bean)]);
        assert!(host.global_inventory(&saloon_key()).is_empty());
        let object = host.object_at_mut(&town(), CAN).expect("object");
        assert_eq!(object.tint, Tint::Plain);
        assert_eq!(object.lock().holder(), None);
        assert_eq!(host.global_inventory(&saloon_key()).decor().tint, Tint::Plain);
    }

    #[test]
    fn pending_sound_plays_once_before_open() {
        let mut host = host_with_can(ContainerDecor {
            tint: Tint::Prismatic,
            pending_sound: Some(SoundCue::Mega),
        });
        let mut resolver = InteractionResolver::new();
        resolver
            .open(&mut host, ParticipantId::HOST, &town(), CAN)
            .expect("open");
        resolver.close(&mut host, ParticipantId::HOST, &town(), CAN);
        resolver
            .open(&mut host, ParticipantId::HOST, &town(), CAN)
            .expect("open");
        let cues = host.sounds.iter().map(|(_, cue)| *cue).collect::<Vec<_>>();
        assert_eq!(cues, vec![SoundCue::Mega, SoundCue::Open, SoundCue::Open]);
    }

    #[test]
    fn witness_reacts_on_every_open_and_speaks_on_close() {
        let mut host = host_with_can(ContainerDecor::default());
        host.characters
            .push((town(), TilePos::new(6, 5), character("Lewis", AgeGroup::Adult)));
        let mut resolver = InteractionResolver::new();

        let first = events(
            resolver
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert!(matches!(
            first.first(),
            Some(InteractionEvent::NpcReacted {
                friendship_delta: -25,
                ..
            })
        ));
        assert_eq!(
            host.chats,
            vec![(
                WITNESS_CHAT_KEY.to_string(),
                vec!["Farmer".to_string(), "Lewis".to_string()]
            )]
        );
        let closed = resolver.close(&mut host, ParticipantId::HOST, &town(), CAN);
        assert!(closed.contains(&InteractionEvent::DeferredDialogue {
            participant: ParticipantId::HOST,
            character: "Lewis".to_string(),
        }));
        assert_eq!(resolver.queued_character(ParticipantId::HOST), None);

        let again = events(
            resolver
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert!(again
            .iter()
            .any(|event| matches!(event, InteractionEvent::NpcReacted { .. })));
        assert_eq!(host.friendship(ParticipantId::HOST, "Lewis"), -50);
        assert_eq!(
            host.emotes,
            vec![("Lewis".to_string(), 12), ("Lewis".to_string(), 12)]
        );
    }

    #[test]
    fn witness_of_a_menuless_open_is_not_carried_to_the_next_can() {
        let mut host = host_with_can(ContainerDecor::default());
        let other_can = TilePos::new(8, 4);
        let mut object = WorldObject::collection_point();
        object.bind(saloon_key(), &ContainerDecor::default());
        host.place_object(&town(), other_can, object)
            .expect("place second can");
        host.characters
            .push((town(), TilePos::new(6, 5), character("Lewis", AgeGroup::Adult)));
        let mut bean = Item::new("(O)890", "Qi Bean");
        bean.special = Some(SpecialTag::Droppable);
        host.global_inventory(&saloon_key()).add(bean.clone());
        host.global_inventory(&saloon_key())
            .add(Item::new("(O)168", "Trash"));
        let mut resolver = InteractionResolver::new();

        let dropped = events(
            resolver
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert!(matches!(
            dropped.first(),
            Some(InteractionEvent::NpcReacted { .. })
        ));
        assert!(dropped.contains(&InteractionEvent::ItemDropped { item: bean }));
        assert_eq!(resolver.queued_character(ParticipantId::HOST), None);

        let opened = events(
            resolver
                .open(&mut host, ParticipantId::HOST, &town(), other_can)
                .expect("open"),
        );
        assert!(matches!(
            opened.first(),
            Some(InteractionEvent::NpcReacted { .. })
        ));
        assert!(opened.contains(&InteractionEvent::ShowContainer {
            participant: ParticipantId::HOST,
            key: saloon_key(),
        }));
        let closed = resolver.close(&mut host, ParticipantId::HOST, &town(), other_can);
        assert_eq!(
            closed,
            vec![InteractionEvent::DeferredDialogue {
                participant: ParticipantId::HOST,
                character: "Lewis".to_string(),
            }]
        );
        assert_eq!(host.friendship(ParticipantId::HOST, "Lewis"), -50);
    }

    #[test]
    fn consumed_sound_and_tint_change_reach_shared_decor() {
        let decor = ContainerDecor {
            tint: Tint::Prismatic,
            pending_sound: Some(SoundCue::Mega),
        };
        let mut host = host_with_can(decor.clone());
        let mut hat = Item::new("(H)66", "Garbage Hat");
        hat.special = Some(SpecialTag::DirectAdd { lidless: true });
        let inventory = host.global_inventory(&saloon_key());
        inventory.add(hat);
        inventory.mark_rolled(2, decor);

        InteractionResolver::new()
            .open(&mut host, ParticipantId::HOST, &town(), CAN)
            .expect("open");
        assert_eq!(
            host.global_inventory(&saloon_key()).decor(),
            &ContainerDecor {
                tint: Tint::Lidless,
                pending_sound: None,
            }
        );
    }

    #[test]
    fn special_item_waits_for_the_current_viewer() {
        let mut host = host_with_can(ContainerDecor::default());
        let mut resolver = InteractionResolver::new();
        let viewer = ParticipantId(1);
        let latecomer = ParticipantId(2);
        resolver
            .open(&mut host, viewer, &town(), CAN)
            .expect("open");
        let mut ring = Item::new("(O)529", "Amethyst Ring");
        ring.special = Some(SpecialTag::DirectAdd { lidless: false });
        host.global_inventory(&saloon_key()).add(ring);

        let waiting = events(
            resolver
                .open(&mut host, latecomer, &town(), CAN)
                .expect("open"),
        );
        assert_eq!(
            waiting,
            vec![InteractionEvent::Queued {
                participant: latecomer,
                position: 0,
            }]
        );
        assert!(host.given.is_empty());
        assert_eq!(host.global_inventory(&saloon_key()).item_count(), 1);

        resolver.close(&mut host, viewer, &town(), CAN);
        resolver.close(&mut host, latecomer, &town(), CAN);
        let granted = events(
            resolver
                .open(&mut host, latecomer, &town(), CAN)
                .expect("open"),
        );
        assert!(granted
            .iter()
            .any(|event| matches!(event, InteractionEvent::ItemGranted { .. })));
        let object = host.object_at_mut(&town(), CAN).expect("object");
        assert_eq!(object.lock().holder(), None);
    }

    #[test]
    fn mounts_and_distant_characters_do_not_react() {
        let mut host = host_with_can(ContainerDecor::default());
        let mut horse = character("Horse", AgeGroup::Adult);
        horse.is_mount = true;
        host.characters.push((town(), TilePos::new(5, 4), horse));
        host.characters
            .push((town(), TilePos::new(30, 30), character("Lewis", AgeGroup::Adult)));

        let result = events(
            InteractionResolver::new()
                .open(&mut host, ParticipantId::HOST, &town(), CAN)
                .expect("open"),
        );
        assert!(!result
            .iter()
            .any(|event| matches!(event, InteractionEvent::NpcReacted { .. })));
        assert!(host.emotes.is_empty());
    }
}
