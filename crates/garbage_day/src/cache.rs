use std::collections::HashMap;

use tracing::debug;

use crate::ids::MapIdentity;
use crate::map::{CollectionPointSite, ScanResult, TilePatch};

#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheEntry {
    Sites(Vec<CollectionPointSite>),
    /// Scanned, nothing found. Distinct from "never scanned".
    Empty,
}

/// Scan results per map identity, plus the patches still waiting for the
/// next load of their asset.
#[derive(Debug, Default)]
pub struct LocationCache {
    entries: HashMap<MapIdentity, CacheEntry>,
    pending_patches: HashMap<MapIdentity, TilePatch>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached sites for `map`, running `scan` only if the map
    /// was never scanned. A patch produced by the scan is queued.
    pub fn get_or_scan<F>(&mut self, map: &MapIdentity, scan: F) -> Option<&[CollectionPointSite]>
    where
        F: FnOnce() -> ScanResult,
    {
        if !self.entries.contains_key(map) {
            let ScanResult { sites, patch } = scan();
            if let Some(patch) = patch.filter(|patch| !patch.is_empty()) {
                self.pending_patches.insert(map.clone(), patch);
            }
            let entry = if sites.is_empty() {
                CacheEntry::Empty
            } else {
                CacheEntry::Sites(sites)
            };
            self.entries.insert(map.clone(), entry);
        }
        self.sites(map)
    }

    pub fn sites(&self, map: &MapIdentity) -> Option<&[CollectionPointSite]> {
        match self.entries.get(map) {
            Some(CacheEntry::Sites(sites)) => Some(sites),
            Some(CacheEntry::Empty) | None => None,
        }
    }

    pub fn is_scanned(&self, map: &MapIdentity) -> bool {
        self.entries.contains_key(map)
    }

    pub fn all_sites(&self) -> impl Iterator<Item = &CollectionPointSite> + '_ {
        self.entries
            .values()
            .filter_map(|entry| match entry {
                CacheEntry::Sites(sites) => Some(sites),
                CacheEntry::Empty => None,
            })
            .flatten()
    }

    pub fn has_pending_patch(&self, map: &MapIdentity) -> bool {
        self.pending_patches.contains_key(map)
    }

    /// Hands out the pending patch for `map` once.
    pub fn take_pending_patch(&mut self, map: &MapIdentity) -> Option<TilePatch> {
        self.pending_patches.remove(map)
    }

    /// Evicts `map` unless its patch has not been applied yet. Returns whether
    /// an entry was removed.
    pub fn invalidate(&mut self, map: &MapIdentity) -> bool {
        if self.pending_patches.contains_key(map) {
            debug!(map = %map, "location_cache_invalidation_deferred");
            return false;
        }
        let removed = self.entries.remove(map).is_some();
        if removed {
            debug!(map = %map, "location_cache_invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending_patches.clear();
    }
}
