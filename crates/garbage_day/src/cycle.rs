use std::collections::BTreeSet;

use tracing::{debug, info, trace, warn};

use crate::cache::LocationCache;
use crate::calendar::GameDate;
use crate::config::GarbageDayConfig;
use crate::host::Host;
use crate::ids::{ParticipantId, PointTypeId};
use crate::inventory::{ContainerDecor, SharedInventory, SharedInventoryStore};
use crate::loot::{LootEngine, LootOutcome, LootTableSource};
use crate::world::{Tint, WorldObject};

/// Survives day transitions; reset only when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleState {
    pub festival_carry_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionDecision {
    /// Empty every shared inventory.
    Collect,
    /// Collection falls on a festival; tidy only and collect tomorrow.
    Postpone,
    /// Ordinary day; tidy only.
    Tidy,
}

/// Carry-over is checked before the day's own schedule, so a carried
/// collection landing on a collection day still collects once.
pub fn decide_collection(
    state: &CycleState,
    config: &GarbageDayConfig,
    date: GameDate,
    is_festival: bool,
) -> CollectionDecision {
    let due = state.festival_carry_over || config.is_collection_day(date);
    if !due {
        return CollectionDecision::Tidy;
    }
    if config.skip_festival && is_festival {
        CollectionDecision::Postpone
    } else {
        CollectionDecision::Collect
    }
}

/// Borrowed pieces of the session a transition works on.
pub struct CycleContext<'a, S> {
    pub cache: &'a LocationCache,
    pub inventories: &'a mut SharedInventoryStore,
    pub loot: &'a LootEngine<S>,
    pub config: &'a GarbageDayConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayStartReport {
    pub placed: usize,
    pub bound: usize,
    pub rolled: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayEndReport {
    pub removed: usize,
    pub decision: CollectionDecision,
    pub inventories_touched: usize,
    pub special_items_removed: usize,
}

#[derive(Debug, Default)]
pub struct DayCycleController {
    state: CycleState,
}

impl DayCycleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = CycleState::default();
    }

    /// Places, binds and stocks a can at every cached site of every loaded
    /// location. Each point type is rolled at most once per day.
    pub fn start_day<H, S>(
        &mut self,
        host: &mut H,
        cx: CycleContext<'_, S>,
        today: GameDate,
    ) -> DayStartReport
    where
        H: Host + ?Sized,
        S: LootTableSource,
    {
        let mut report = DayStartReport::default();
        let day = today.absolute_day();
        let luck = host.daily_luck(ParticipantId::HOST);
        let world_seed = host.world_seed();

        for location in host.loaded_locations() {
            let Some(sites) = cx.cache.sites(&location.map) else {
                continue;
            };
            for site in sites {
                if host.object_at_mut(&location.id, site.tile).is_none() {
                    trace!(
                        point_type = %site.point_type,
                        location = %location.id,
                        tile = %site.tile,
                        "collection_point_placing"
                    );
                    if let Err(error) =
                        host.place_object(&location.id, site.tile, WorldObject::collection_point())
                    {
                        warn!(
                            point_type = %site.point_type,
                            location = %location.id,
                            tile = %site.tile,
                            error = %error,
                            "collection_point_placement_failed"
                        );
                        report.skipped += 1;
                        continue;
                    }
                    report.placed += 1;
                }

                let is_ours = host
                    .object_at_mut(&location.id, site.tile)
                    .is_some_and(|object| object.is_collection_point());
                if !is_ours {
                    warn!(
                        location = %location.id,
                        tile = %site.tile,
                        "collection_point_tile_occupied_by_foreign_object"
                    );
                    report.skipped += 1;
                    continue;
                }

                let key = cx.inventories.key_for(&site.point_type);
                let decor = {
                    let inventory = host.global_inventory(&key);
                    if inventory.last_rolled_day() != Some(day) {
                        let outcome =
                            cx.loot
                                .draw(&site.point_type, day, luck, world_seed, inventory);
                        debug!(
                            point_type = %site.point_type,
                            tier = outcome.tier_name(),
                            item = outcome.item().map(|item| item.name.as_str()).unwrap_or(""),
                            "loot_rolled"
                        );
                        let decor = stock(inventory, outcome, cx.config.enable_prismatic);
                        inventory.mark_rolled(day, decor);
                        report.rolled += 1;
                    }
                    inventory.decor().clone()
                };

                if let Some(object) = host.object_at_mut(&location.id, site.tile) {
                    object.bind(key, &decor);
                    report.bound += 1;
                }
            }
        }

        info!(
            date = %today,
            placed = report.placed,
            bound = report.bound,
            rolled = report.rolled,
            skipped = report.skipped,
            "day_started"
        );
        report
    }

    /// Removes every can, then empties or tidies the shared inventories
    /// depending on the collection schedule.
    pub fn end_day<H, S>(
        &mut self,
        host: &mut H,
        cx: CycleContext<'_, S>,
        today: GameDate,
    ) -> DayEndReport
    where
        H: Host + ?Sized,
        S: LootTableSource,
    {
        let mut removed = 0;
        for location in host.loaded_locations() {
            let Some(sites) = cx.cache.sites(&location.map) else {
                continue;
            };
            for site in sites {
                let Some(object) = host.object_at_mut(&location.id, site.tile) else {
                    continue;
                };
                if !object.is_collection_point() {
                    continue;
                }
                object.reset_checked();
                trace!(
                    point_type = %site.point_type,
                    location = %location.id,
                    tile = %site.tile,
                    "collection_point_removing"
                );
                host.remove_object(&location.id, site.tile);
                removed += 1;
            }
        }

        let is_festival = host.is_festival_day(today);
        let decision = decide_collection(&self.state, cx.config, today, is_festival);
        match decision {
            CollectionDecision::Collect => self.state.festival_carry_over = false,
            CollectionDecision::Postpone => self.state.festival_carry_over = true,
            CollectionDecision::Tidy => {}
        }

        let point_types = cx
            .loot
            .point_types()
            .into_iter()
            .chain(cx.cache.all_sites().map(|site| site.point_type.clone()))
            .collect::<BTreeSet<PointTypeId>>();
        let mut special_items_removed = 0;
        for point_type in &point_types {
            let inventory = cx.inventories.get_or_create(host, point_type);
            match decision {
                CollectionDecision::Collect => inventory.clear(),
                CollectionDecision::Postpone | CollectionDecision::Tidy => {
                    special_items_removed += inventory.tidy();
                }
            }
        }

        let report = DayEndReport {
            removed,
            decision,
            inventories_touched: point_types.len(),
            special_items_removed,
        };
        info!(
            date = %today,
            removed = report.removed,
            decision = ?report.decision,
            carry_over = self.state.festival_carry_over,
            inventories = report.inventories_touched,
            "day_ended"
        );
        report
    }
}

/// Puts the outcome into the inventory and returns the decor every can of
/// this point type shows today.
fn stock(inventory: &mut SharedInventory, outcome: LootOutcome, prismatic: bool) -> ContainerDecor {
    let mut decor = ContainerDecor {
        tint: Tint::Plain,
        pending_sound: outcome.sound(),
    };
    if prismatic && outcome.wants_highlight() {
        decor.tint = Tint::Prismatic;
    }
    match outcome {
        LootOutcome::None => trace!("no_loot_selected"),
        LootOutcome::Normal { item, color } => {
            if let Some(color) = color {
                decor.tint = Tint::Tagged(color);
            }
            inventory.add(item);
        }
        LootOutcome::Special(item)
        | LootOutcome::Mega(item)
        | LootOutcome::DoubleMega(item)
        | LootOutcome::DirectAdd { item, .. } => inventory.add(item),
    }
    decor
}
