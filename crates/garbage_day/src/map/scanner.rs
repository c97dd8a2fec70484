use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ids::{MapIdentity, PointTypeId, TilePos};

use super::grid::{MapData, ACTION_PROPERTY, BUILDINGS_LAYER};
use super::patch::TilePatch;

const GARBAGE_ACTION: &str = "Garbage";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionPointSite {
    pub map: MapIdentity,
    pub tile: TilePos,
    pub point_type: PointTypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub sites: Vec<CollectionPointSite>,
    pub patch: Option<TilePatch>,
}

impl ScanResult {
    pub fn empty() -> Self {
        Self {
            sites: Vec::new(),
            patch: None,
        }
    }
}

/// Finds every `Garbage <id>` action on the buildings layer. Reads only; the
/// returned patch carries the edits for the next load of the asset.
pub fn scan_map(
    map: &MapIdentity,
    data: &MapData,
    exclusions: &BTreeSet<PointTypeId>,
) -> ScanResult {
    let Some(layer) = data.layer(BUILDINGS_LAYER) else {
        debug!(map = %map, "map_scan_no_buildings_layer");
        return ScanResult::empty();
    };

    let mut sites = Vec::new();
    for (tile, content) in layer.occupied_tiles() {
        let Some(point_type) = content.property(ACTION_PROPERTY).and_then(parse_garbage_action)
        else {
            continue;
        };
        let point_type = PointTypeId::new(point_type);
        if exclusions.contains(&point_type) {
            debug!(map = %map, tile = %tile, point_type = %point_type, "map_scan_excluded");
            continue;
        }
        trace!(map = %map, tile = %tile, point_type = %point_type, "collection_point_found");
        sites.push(CollectionPointSite {
            map: map.clone(),
            tile,
            point_type,
        });
    }

    if sites.is_empty() {
        return ScanResult::empty();
    }

    let mut patch = TilePatch::new(map.clone());
    for site in &sites {
        patch.strip_site(site.tile);
    }
    debug!(map = %map, sites = sites.len(), edits = patch.edit_count(), "map_scanned");
    ScanResult {
        sites,
        patch: Some(patch),
    }
}

fn parse_garbage_action(raw: &str) -> Option<&str> {
    let mut parts = raw.split_whitespace();
    let action = parts.next()?;
    if !action.eq_ignore_ascii_case(GARBAGE_ACTION) {
        return None;
    }
    parts.next()
}
