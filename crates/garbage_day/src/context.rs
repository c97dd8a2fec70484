//! Session context that owns every piece of collection-point state and
//! exposes the host event hooks.

use tracing::{debug, info};

use crate::cache::LocationCache;
use crate::calendar::GameDate;
use crate::config::{ConfigError, GarbageDayConfig};
use crate::cycle::{CycleContext, CycleState, DayCycleController, DayEndReport, DayStartReport};
use crate::host::Host;
use crate::ids::{LocationId, MapIdentity, ParticipantId, TilePos};
use crate::interaction::{InteractionError, InteractionEvent, InteractionResolver, OpenOutcome};
use crate::inventory::SharedInventoryStore;
use crate::loot::{LootEngine, LootTableSource};
use crate::map::{scan_map, MapData, PatchReport};

/// Whether this process performs day transitions and loot draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Authority,
    /// Sees the authority's objects and inventories but never mutates the
    /// cycle.
    Mirror,
}

pub struct GarbageDay<S> {
    config: GarbageDayConfig,
    role: Role,
    cache: LocationCache,
    inventories: SharedInventoryStore,
    loot: LootEngine<S>,
    cycle: DayCycleController,
    interactions: InteractionResolver,
}

impl<S: LootTableSource> GarbageDay<S> {
    pub fn new(config: GarbageDayConfig, loot: LootEngine<S>, role: Role) -> Self {
        Self {
            config,
            role,
            cache: LocationCache::new(),
            inventories: SharedInventoryStore::new(),
            loot,
            cycle: DayCycleController::new(),
            interactions: InteractionResolver::new(),
        }
    }

    pub fn init(&mut self) {
        info!(
            role = ?self.role,
            collection_days = ?self.config.collection_days,
            excluded = %self.config.excluded_list(),
            "garbage_day_initialized"
        );
    }

    /// Drops all session state. Called when returning to the title screen.
    pub fn teardown(&mut self) {
        self.cache.clear();
        self.inventories.clear_handles();
        self.cycle.reset();
        self.interactions.clear();
        info!("garbage_day_torn_down");
    }

    pub fn config(&self) -> &GarbageDayConfig {
        &self.config
    }

    /// Exclusions only affect maps scanned after the change.
    pub fn set_config(&mut self, config: GarbageDayConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        debug!("garbage_day_config_updated");
        Ok(())
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn cache(&self) -> &LocationCache {
        &self.cache
    }

    pub fn cycle_state(&self) -> CycleState {
        self.cycle.state()
    }

    pub fn interactions(&self) -> &InteractionResolver {
        &self.interactions
    }

    /// Scans `data` the first time `map` is seen, then applies the pending
    /// tile patch for `map` to the asset being loaded.
    pub fn on_asset_requested(
        &mut self,
        map: &MapIdentity,
        data: &mut MapData,
    ) -> Option<PatchReport> {
        let excluded = &self.config.excluded_point_types;
        let grid: &MapData = data;
        let found = self
            .cache
            .get_or_scan(map, || scan_map(map, grid, excluded))
            .map_or(0, <[_]>::len);

        let patch = self.cache.take_pending_patch(map)?;
        let report = patch.apply(data);
        info!(
            map = %map,
            sites = found,
            applied = report.applied,
            skipped = report.skipped,
            "map_patch_applied"
        );
        Some(report)
    }

    /// Returns how many cache entries were dropped.
    pub fn on_assets_invalidated(&mut self, maps: &[MapIdentity]) -> usize {
        maps.iter().filter(|map| self.cache.invalidate(map)).count()
    }

    pub fn on_day_ending<H>(&mut self, host: &mut H, today: GameDate) -> Option<DayEndReport>
    where
        H: Host + ?Sized,
    {
        self.interactions.clear();
        if self.role == Role::Mirror {
            debug!(date = %today, "day_end_skipped_on_mirror");
            return None;
        }
        let cx = CycleContext {
            cache: &self.cache,
            inventories: &mut self.inventories,
            loot: &self.loot,
            config: &self.config,
        };
        Some(self.cycle.end_day(host, cx, today))
    }

    pub fn on_day_started<H>(&mut self, host: &mut H, today: GameDate) -> Option<DayStartReport>
    where
        H: Host + ?Sized,
    {
        if self.role == Role::Mirror {
            debug!(date = %today, "day_start_skipped_on_mirror");
            return None;
        }
        let cx = CycleContext {
            cache: &self.cache,
            inventories: &mut self.inventories,
            loot: &self.loot,
            config: &self.config,
        };
        Some(self.cycle.start_day(host, cx, today))
    }

    /// Resolves a player opening the can at `tile`. Anything that changes
    /// shared contents (special items, the container menu) first takes the
    /// can's lock, so a mirror's open waits behind the current viewer. Hosts
    /// with a mirror role must still forward the open to the authority's
    /// session when their replicated inventories are read-only.
    pub fn on_open<H>(
        &mut self,
        host: &mut H,
        participant: ParticipantId,
        location: &LocationId,
        tile: TilePos,
    ) -> Result<OpenOutcome, InteractionError>
    where
        H: Host + ?Sized,
    {
        self.interactions.open(host, participant, location, tile)
    }

    pub fn on_container_closed<H>(
        &mut self,
        host: &mut H,
        participant: ParticipantId,
        location: &LocationId,
        tile: TilePos,
    ) -> Vec<InteractionEvent>
    where
        H: Host + ?Sized,
    {
        self.interactions.close(host, participant, location, tile)
    }
}
