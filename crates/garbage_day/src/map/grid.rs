use std::collections::BTreeMap;

use thiserror::Error;

use crate::ids::TilePos;

pub const BUILDINGS_LAYER: &str = "Buildings";
pub const FRONT_LAYER: &str = "Front";
pub const BACK_LAYER: &str = "Back";

pub const ACTION_PROPERTY: &str = "Action";
pub const NO_PATH_PROPERTY: &str = "NoPath";

/// Largest width or height a layer may declare.
pub const MAX_LAYER_DIMENSION: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tile {
    pub index: u16,
    pub properties: BTreeMap<String, String>,
}

impl Tile {
    pub fn new(index: u16) -> Self {
        Self {
            index,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("layer '{layer}' tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
    #[error("tile {tile} is outside layer '{layer}' ({width}x{height})")]
    OutOfBounds {
        layer: String,
        tile: TilePos,
        width: u32,
        height: u32,
    },
    #[error("duplicate layer '{layer}'")]
    DuplicateLayer { layer: String },
}

/// One named layer of a map. Tiles are stored row-major; an empty cell is
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    name: String,
    width: u32,
    height: u32,
    tiles: Vec<Option<Tile>>,
}

impl TileLayer {
    pub fn new(
        name: &str,
        width: u32,
        height: u32,
        tiles: Vec<Option<Tile>>,
    ) -> Result<Self, TileGridError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TileGridError::TileCountMismatch {
                layer: name.to_string(),
                expected,
                actual,
            });
        }
        Ok(Self {
            name: name.to_string(),
            width,
            height,
            tiles,
        })
    }

    pub fn empty(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            tiles: vec![None; width as usize * height as usize],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index_of(&self, tile: TilePos) -> Option<usize> {
        if tile.x >= self.width || tile.y >= self.height {
            return None;
        }
        Some(tile.y as usize * self.width as usize + tile.x as usize)
    }

    pub fn tile(&self, tile: TilePos) -> Option<&Tile> {
        self.index_of(tile)
            .and_then(|index| self.tiles.get(index))
            .and_then(Option::as_ref)
    }

    pub fn tile_mut(&mut self, tile: TilePos) -> Option<&mut Tile> {
        let index = self.index_of(tile)?;
        self.tiles.get_mut(index).and_then(Option::as_mut)
    }

    pub fn set_tile(&mut self, tile: TilePos, value: Option<Tile>) -> Result<(), TileGridError> {
        let Some(index) = self.index_of(tile) else {
            return Err(TileGridError::OutOfBounds {
                layer: self.name.clone(),
                tile,
                width: self.width,
                height: self.height,
            });
        };
        self.tiles[index] = value;
        Ok(())
    }

    /// Occupied tiles, column by column (all of x=0 top to bottom, then x=1).
    pub fn occupied_tiles(&self) -> impl Iterator<Item = (TilePos, &Tile)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).filter_map(move |y| {
                let pos = TilePos::new(x, y);
                self.tile(pos).map(|tile| (pos, tile))
            })
        })
    }
}

/// Tile grid of one map: an ordered list of uniquely named layers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapData {
    layers: Vec<TileLayer>,
}

impl MapData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_layer(&mut self, layer: TileLayer) -> Result<(), TileGridError> {
        if self.layer(layer.name()).is_some() {
            return Err(TileGridError::DuplicateLayer {
                layer: layer.name().to_string(),
            });
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut TileLayer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }
}
