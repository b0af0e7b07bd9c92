use super::{attr, format_version_for, node};
use crate::binary_tree::TreeWriter;
use crate::tile_map::block_origin;
use crate::{Map, MapError, Tile};

use itertools::Itertools;
use std::fs;
use std::path::Path;
use std::time::Instant;

pub(crate) fn save(map: &Map, path: &Path) -> Result<(), MapError> {
    let start = Instant::now();
    let bytes = write(map, path);
    fs::write(path, &bytes)?;
    log::info!(
        "Saved '{}': {} bytes in {:?}",
        path.display(),
        bytes.len(),
        start.elapsed()
    );
    Ok(())
}

/// Serializes `map` as it would be saved to `path`. Only the file name of `path` is used, to derive default auxiliary file
/// names.
pub(crate) fn write(map: &Map, path: &Path) -> Vec<u8> {
    let schema = map.catalog().schema_version();
    let version = format_version_for(schema.major);

    let stem = match path.extension() {
        Some(ext) if ext == "otbm" => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        _ => String::new(),
    };
    let spawn_file = auxiliary_file_name(map.info.spawn_file.as_deref(), &stem, "-spawns.xml");
    let house_file = auxiliary_file_name(map.info.house_file.as_deref(), &stem, "-houses.xml");

    // Legacy identifier slot.
    let mut w = TreeWriter::with_prefix(vec![0; 4]);
    w.start_node(node::ROOT);
    w.add_u32(version);
    w.add_u16(map.info.width);
    w.add_u16(map.info.height);
    w.add_u32(schema.major);
    w.add_u32(schema.minor);

    w.start_node(node::MAP_DATA);
    w.add_u8(attr::DESCRIPTION);
    w.add_string(&map.info.description);
    w.add_u8(attr::SPAWN_FILE);
    w.add_string(&spawn_file);
    w.add_u8(attr::HOUSE_FILE);
    w.add_string(&house_file);

    // Canonical order visits each block's tiles contiguously, so consecutive runs are exactly the tile areas.
    let areas = map.tiles.tiles().group_by(|tile| block_origin(tile.position()));
    for (origin, tiles) in &areas {
        w.start_node(node::TILE_AREA);
        w.add_position(origin);
        for tile in tiles {
            write_tile(&mut w, tile);
        }
        w.end_node();
    }

    w.start_node(node::TOWNS);
    for town in map.towns.iter() {
        w.start_node(node::TOWN);
        w.add_u32(town.id);
        w.add_string(&town.name);
        w.add_position(town.temple);
        w.end_node();
    }
    w.end_node();

    if version > 1 {
        w.start_node(node::WAYPOINTS);
        for (p, name) in map.waypoints.iter() {
            w.start_node(node::WAYPOINT);
            w.add_string(name);
            w.add_position(p);
            w.end_node();
        }
        w.end_node();
    }

    w.end_node(); // map data
    w.end_node(); // root
    w.finish()
}

/// Only the file name is stored. The loader resolves it against the map's directory.
fn auxiliary_file_name(configured: Option<&Path>, stem: &str, suffix: &str) -> String {
    configured
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}{}", stem, suffix))
}

fn write_tile(w: &mut TreeWriter, tile: &Tile) {
    let p = tile.position();
    match tile.house_id() {
        Some(house_id) => {
            w.start_node(node::HOUSE_TILE);
            w.add_offset((p.x & 0xFF) as u8, (p.y & 0xFF) as u8);
            w.add_u32(house_id);
        }
        None => {
            w.start_node(node::TILE);
            w.add_offset((p.x & 0xFF) as u8, (p.y & 0xFF) as u8);
        }
    }

    if !tile.flags().is_empty() {
        w.add_u8(attr::TILE_FLAGS);
        w.add_u32(tile.flags().bits());
    }

    if let Some(ground) = tile.ground() {
        if ground.is_complex() {
            ground.serialize(w);
        } else {
            w.add_u8(attr::ITEM);
            w.add_u16(ground.id());
        }
    }
    for item in tile.items() {
        item.serialize(w);
    }

    w.end_node();
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
