use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::ids::{MapIdentity, TilePos};

use super::grid::{MapData, Tile, TileLayer, MAX_LAYER_DIMENSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    MissingAttribute,
    InvalidValue,
    InvalidGrid,
}

#[derive(Debug, Clone)]
pub struct MapLoadError {
    pub code: MapErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for MapLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for MapLoadError {}

/// A map asset as read from disk: its identity plus the raw, unpatched grid.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub identity: MapIdentity,
    pub data: MapData,
}

pub fn load_map_file(path: &Path) -> Result<LoadedMap, MapLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MapLoadError {
        code: MapErrorCode::ReadFile,
        message: format!("failed to read map file: {source}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    parse_map_document(path, &raw)
}

/// Parses `<Map id=".."><Layer name width height><Tile x y index>
/// <Property key value/></Tile></Layer></Map>`.
pub fn parse_map_document(file_path: &Path, raw: &str) -> Result<LoadedMap, MapLoadError> {
    let doc = Document::parse(raw).map_err(|error| MapLoadError {
        code: MapErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Map" {
        return Err(error_at_node(
            MapErrorCode::InvalidRoot,
            "root element must be <Map>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }
    let identity = MapIdentity::new(required_attribute(file_path, &doc, root, "id")?);

    let mut data = MapData::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "Layer" {
            return Err(error_at_node(
                MapErrorCode::UnknownElement,
                format!("unsupported element <{}> in <Map>", child.tag_name().name()),
                file_path,
                &doc,
                child,
            ));
        }
        let layer = parse_layer(file_path, &doc, child)?;
        data.push_layer(layer).map_err(|error| {
            error_at_node(
                MapErrorCode::InvalidGrid,
                error.to_string(),
                file_path,
                &doc,
                child,
            )
        })?;
    }

    Ok(LoadedMap { identity, data })
}

fn parse_layer(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<TileLayer, MapLoadError> {
    let name = required_attribute(file_path, doc, node, "name")?;
    let width = parsed_attribute::<u32>(file_path, doc, node, "width")?;
    let height = parsed_attribute::<u32>(file_path, doc, node, "height")?;
    if width > MAX_LAYER_DIMENSION || height > MAX_LAYER_DIMENSION {
        return Err(error_at_node(
            MapErrorCode::InvalidGrid,
            format!(
                "layer '{name}' is {width}x{height}, larger than {MAX_LAYER_DIMENSION} tiles on a side"
            ),
            file_path,
            doc,
            node,
        ));
    }
    let mut layer = TileLayer::empty(name, width, height);

    for tile_node in node.children().filter(|child| child.is_element()) {
        if tile_node.tag_name().name() != "Tile" {
            return Err(error_at_node(
                MapErrorCode::UnknownElement,
                format!(
                    "unsupported element <{}> in <Layer>",
                    tile_node.tag_name().name()
                ),
                file_path,
                doc,
                tile_node,
            ));
        }
        let pos = TilePos::new(
            parsed_attribute::<u32>(file_path, doc, tile_node, "x")?,
            parsed_attribute::<u32>(file_path, doc, tile_node, "y")?,
        );
        let mut tile = Tile::new(parsed_attribute::<u16>(file_path, doc, tile_node, "index")?);
        for property in tile_node.children().filter(|child| child.is_element()) {
            if property.tag_name().name() != "Property" {
                return Err(error_at_node(
                    MapErrorCode::UnknownElement,
                    format!(
                        "unsupported element <{}> in <Tile>",
                        property.tag_name().name()
                    ),
                    file_path,
                    doc,
                    property,
                ));
            }
            let key = required_attribute(file_path, doc, property, "key")?;
            let value = property.attribute("value").unwrap_or_default();
            tile.properties.insert(key.to_string(), value.to_string());
        }
        layer.set_tile(pos, Some(tile)).map_err(|error| {
            error_at_node(
                MapErrorCode::InvalidGrid,
                error.to_string(),
                file_path,
                doc,
                tile_node,
            )
        })?;
    }

    Ok(layer)
}

fn required_attribute<'a>(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'a, '_>,
    name: &str,
) -> Result<&'a str, MapLoadError> {
    node.attribute(name).ok_or_else(|| {
        error_at_node(
            MapErrorCode::MissingAttribute,
            format!(
                "missing attribute '{}' on <{}>",
                name,
                node.tag_name().name()
            ),
            file_path,
            doc,
            node,
        )
    })
}

fn parsed_attribute<T: FromStr>(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    name: &str,
) -> Result<T, MapLoadError> {
    let raw = required_attribute(file_path, doc, node, name)?;
    raw.trim().parse::<T>().map_err(|_| {
        error_at_node(
            MapErrorCode::InvalidValue,
            format!(
                "attribute '{}' on <{}> has invalid value '{}'",
                name,
                node.tag_name().name(),
                raw
            ),
            file_path,
            doc,
            node,
        )
    })
}

fn error_at_node(
    code: MapErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> MapLoadError {
    let pos = doc.text_pos_at(node.range().start);
    MapLoadError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
