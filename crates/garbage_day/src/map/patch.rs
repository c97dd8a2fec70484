use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::ids::{MapIdentity, TilePos};

use super::grid::{
    MapData, TileGridError, BACK_LAYER, BUILDINGS_LAYER, FRONT_LAYER, NO_PATH_PROPERTY,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileEdit {
    ClearTile {
        layer: String,
        target: TilePos,
    },
    AddProperty {
        layer: String,
        target: TilePos,
        key: String,
        value: String,
    },
}

impl TileEdit {
    fn layer(&self) -> &str {
        match self {
            TileEdit::ClearTile { layer, .. } | TileEdit::AddProperty { layer, .. } => layer,
        }
    }
}

/// Why a single tile edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileEditError {
    #[error("layer '{0}' missing")]
    LayerMissing(String),
    #[error("no tile at {0}")]
    NoTile(TilePos),
    #[error(transparent)]
    Grid(#[from] TileGridError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Deferred edits that strip the original can art from a map, grouped by the
/// site tile that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePatch {
    map: MapIdentity,
    edits: BTreeMap<TilePos, Vec<TileEdit>>,
}

impl TilePatch {
    pub fn new(map: MapIdentity) -> Self {
        Self {
            map,
            edits: BTreeMap::new(),
        }
    }

    pub fn map(&self) -> &MapIdentity {
        &self.map
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &BTreeMap<TilePos, Vec<TileEdit>> {
        &self.edits
    }

    pub fn edit_count(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }

    /// Queues the three edits for a can at `site`: drop the can tile, drop the
    /// lid tile above it, and mark the floor under it as impassable.
    pub fn strip_site(&mut self, site: TilePos) {
        let edits = self.edits.entry(site).or_default();
        edits.push(TileEdit::ClearTile {
            layer: BUILDINGS_LAYER.to_string(),
            target: site,
        });
        match site.above() {
            Some(lid) => edits.push(TileEdit::ClearTile {
                layer: FRONT_LAYER.to_string(),
                target: lid,
            }),
            None => debug!(map = %self.map, tile = %site, "patch_no_lid_row"),
        }
        edits.push(TileEdit::AddProperty {
            layer: BACK_LAYER.to_string(),
            target: site,
            key: NO_PATH_PROPERTY.to_string(),
            value: String::new(),
        });
    }

    /// Applies every edit it can. A failing edit is logged and skipped; it
    /// never stops the remaining edits.
    pub fn apply(&self, data: &mut MapData) -> PatchReport {
        let mut report = PatchReport::default();
        for (site, edits) in &self.edits {
            for edit in edits {
                match apply_edit(data, edit) {
                    Ok(()) => report.applied += 1,
                    Err(error) => {
                        warn!(
                            map = %self.map,
                            site = %site,
                            layer = edit.layer(),
                            error = %error,
                            "tile_edit_skipped"
                        );
                        report.skipped += 1;
                    }
                }
            }
        }
        report
    }
}

fn apply_edit(data: &mut MapData, edit: &TileEdit) -> Result<(), TileEditError> {
    let layer = data
        .layer_mut(edit.layer())
        .ok_or_else(|| TileEditError::LayerMissing(edit.layer().to_string()))?;
    match edit {
        TileEdit::ClearTile { target, .. } => Ok(layer.set_tile(*target, None)?),
        TileEdit::AddProperty {
            target, key, value, ..
        } => {
            let tile = layer
                .tile_mut(*target)
                .ok_or(TileEditError::NoTile(*target))?;
            tile.properties.insert(key.clone(), value.clone());
            Ok(())
        }
    }
}
