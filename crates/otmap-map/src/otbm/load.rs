use super::{attr, node, MAGIC, MAX_VERSION};
use crate::binary_tree::{decode, TreeNode};
use crate::{ItemCatalog, Item, Map, MapError, TileFlags, Town};

use otmap_core::{Bounds, Position};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

/// What a successful load saw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadSummary {
    pub version: u32,
    /// Extremes of every tile position read, empty or not.
    pub bounds: Bounds,
    pub tiles_read: usize,
    pub elapsed: Duration,
}

pub(crate) fn load(map: &mut Map, path: &Path) -> Result<LoadSummary, MapError> {
    let start = Instant::now();
    let bytes = fs::read(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut summary = read(map, &bytes, dir)?;
    summary.elapsed = start.elapsed();

    log::info!(
        "Loaded '{}' (OTBM v{}): {} tiles in {:?}",
        path.display(),
        summary.version,
        summary.tiles_read,
        summary.elapsed
    );
    if let Some((min, max)) = summary.bounds.extremes() {
        log::debug!(
            "Whole map render region: x {}..={}, y {}..={}, z {}..={}",
            min.x,
            max.x,
            min.y,
            max.y,
            min.z,
            max.z
        );
    }

    Ok(summary)
}

/// Parses a whole OTBM file held in memory. Auxiliary file names are resolved relative to `dir`.
pub(crate) fn read(map: &mut Map, bytes: &[u8], dir: &Path) -> Result<LoadSummary, MapError> {
    let (identifier, tree) = match bytes {
        [a, b, c, d, rest @ ..] => ([*a, *b, *c, *d], rest),
        _ => {
            return Err(MapError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "could not read file identifier",
            )))
        }
    };
    if identifier != MAGIC && identifier != [0; 4] {
        return Err(MapError::InvalidIdentifier(identifier));
    }

    let root = decode(tree)?;
    if root.kind != node::ROOT {
        return Err(MapError::InvalidHeader(root.kind));
    }

    let mut header = root.cursor();
    let version = header.read_u32()?;
    if version > MAX_VERSION {
        return Err(MapError::UnsupportedVersion(version));
    }
    map.info.width = header.read_u16()?;
    map.info.height = header.read_u16()?;

    let schema = map.catalog().schema_version();
    let major = u32::from(header.read_u8()?);
    if major > schema.major {
        return Err(MapError::SchemaMismatch {
            found: major,
            supported: schema.major,
        });
    }
    header.skip(3)?;
    let minor = header.read_u32()?;
    if minor > schema.minor {
        log::warn!(
            "Map needs a newer item catalog: schema minor {}, have {}",
            minor,
            schema.minor
        );
    }

    let map_data = root.children().first().ok_or(MapError::MissingMapData)?;
    if map_data.kind != node::MAP_DATA {
        return Err(MapError::InvalidNodeType {
            expected: "map data",
            found: map_data.kind,
        });
    }

    let mut cursor = map_data.cursor();
    while cursor.can_read() {
        let attribute = cursor.read_u8()?;
        let value = cursor.read_string()?;
        match attribute {
            attr::DESCRIPTION => map.info.description = value,
            attr::SPAWN_FILE => map.info.spawn_file = Some(dir.join(value)),
            attr::HOUSE_FILE => map.info.house_file = Some(dir.join(value)),
            attribute => {
                return Err(MapError::UnknownAttribute {
                    attribute,
                    position: None,
                })
            }
        }
    }

    let mut summary = LoadSummary {
        version,
        ..Default::default()
    };
    for child in map_data.children() {
        match child.kind {
            node::TILE_AREA => read_tile_area(map, child, &mut summary)?,
            node::TOWNS => read_towns(map, child)?,
            node::WAYPOINTS if version > 1 => read_waypoints(map, child)?,
            node::WAYPOINTS => log::debug!("Ignoring waypoints in a version {} map", version),
            kind => return Err(MapError::UnknownMapDataNode(kind)),
        }
    }

    Ok(summary)
}

fn expect_kind(node: &TreeNode, kind: u8, expected: &'static str) -> Result<(), MapError> {
    if node.kind == kind {
        Ok(())
    } else {
        Err(MapError::InvalidNodeType {
            expected,
            found: node.kind,
        })
    }
}

fn read_tile_area(map: &mut Map, area: &TreeNode, summary: &mut LoadSummary) -> Result<(), MapError> {
    let base = area.cursor().read_position()?;
    log::debug!("Reading tile area at {}", base);

    for tile_node in area.children() {
        let is_house_tile = match tile_node.kind {
            node::TILE => false,
            node::HOUSE_TILE => true,
            found => {
                return Err(MapError::InvalidNodeType {
                    expected: "tile",
                    found,
                })
            }
        };

        let mut cursor = tile_node.cursor();
        let (dx, dy) = cursor.read_offset()?;
        let p = base
            .checked_offset(dx.into(), dy.into())
            .ok_or(MapError::PositionOverflow { base })?;
        summary.bounds.extend(p);
        summary.tiles_read += 1;

        let house_id = if is_house_tile {
            let id = cursor.read_u32()?;
            map.bind_house(id, p);
            Some(id)
        } else {
            None
        };

        let mut flags = TileFlags::empty();
        while cursor.can_read() {
            match cursor.read_u8()? {
                attr::TILE_FLAGS => flags |= TileFlags::from_stored(cursor.read_u32()?),
                attr::ITEM => {
                    let item = map.create_item(cursor.read_u16()?);
                    map.add_thing(item, p);
                }
                attribute => {
                    return Err(MapError::UnknownAttribute {
                        attribute,
                        position: Some(p),
                    })
                }
            }
        }

        for item_node in tile_node.children() {
            let mut item = read_item(map.catalog(), item_node)?;
            // Only one level of container contents is read.
            if item.is_container() {
                for content_node in item_node.children() {
                    item.add_content(read_item(map.catalog(), content_node)?);
                }
            }

            // Houses are loaded empty: anything a player could carry off is dropped.
            if house_id.is_some() && item.is_moveable() {
                log::warn!("Moveable item found in house: {} at {}, dropping it", item.id(), p);
                continue;
            }
            // Item nodes are replayed in file order.
            if let Some(tile) = map.get_or_create_tile(p) {
                tile.push_thing(item);
            }
        }

        if let Some(tile) = map.get_or_create_tile(p) {
            if house_id.is_some() {
                flags |= TileFlags::HOUSE;
            }
            tile.set_flags(flags);
        }
    }

    Ok(())
}

fn read_item(catalog: &dyn ItemCatalog, item_node: &TreeNode) -> Result<Item, MapError> {
    expect_kind(item_node, node::ITEM, "item")?;
    let mut cursor = item_node.cursor();
    let mut item = catalog.create_item(cursor.read_u16()?);
    item.deserialize_attributes(&mut cursor)?;
    Ok(item)
}

fn read_towns(map: &mut Map, towns: &TreeNode) -> Result<(), MapError> {
    for town_node in towns.children() {
        expect_kind(town_node, node::TOWN, "town")?;
        let mut cursor = town_node.cursor();
        let id = cursor.read_u32()?;
        let name = cursor.read_string()?;
        let temple = cursor.read_position()?;
        if !map.towns.add(Town::new(id, name, temple)) {
            log::debug!("Ignoring duplicate town id {}", id);
        }
    }
    map.towns.sort();
    Ok(())
}

fn read_waypoints(map: &mut Map, waypoints: &TreeNode) -> Result<(), MapError> {
    for waypoint_node in waypoints.children() {
        expect_kind(waypoint_node, node::WAYPOINT, "waypoint")?;
        let mut cursor = waypoint_node.cursor();
        let name = cursor.read_string()?;
        let p: Position = cursor.read_position()?;
        map.waypoints.add(p, name);
    }
    Ok(())
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
