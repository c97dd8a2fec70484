mod grid;
mod loader;
mod patch;
mod scanner;

pub use grid::{
    MapData, Tile, TileGridError, TileLayer, ACTION_PROPERTY, BACK_LAYER, BUILDINGS_LAYER,
    FRONT_LAYER, MAX_LAYER_DIMENSION, NO_PATH_PROPERTY,
};
pub use loader::{
    load_map_file, parse_map_document, LoadedMap, MapErrorCode, MapLoadError, SourceLocation,
};
pub use patch::{PatchReport, TileEdit, TileEditError, TilePatch};
pub use scanner::{scan_map, CollectionPointSite, ScanResult};
