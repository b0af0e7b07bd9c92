use crate::otbm::{self, LoadSummary};
use crate::{otcm, Houses, Item, ItemCatalog, MapError, SnapshotConfig, Tile, TileMap, Towns, Waypoints};

use otmap_core::{Bounds, Position};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Map-wide header fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MapInfo {
    pub width: u16,
    pub height: u16,
    pub description: String,
    /// Resolved against the map file's directory when loaded. Saved as a bare file name.
    pub spawn_file: Option<PathBuf>,
    pub house_file: Option<PathBuf>,
}

/// Everything one loaded world consists of.
///
/// The tile store and registries are public so the codecs (and callers) can borrow them independently. Loading and saving go
/// through the `load_*`/`save_*` methods, which log failures with the file path before returning them.
///
/// Rendering shares a map read-only behind an `Arc`, so no load can run while a render pool still holds it.
pub struct Map {
    pub info: MapInfo,
    pub tiles: TileMap,
    pub houses: Houses,
    pub towns: Towns,
    pub waypoints: Waypoints,
    catalog: Arc<dyn ItemCatalog>,
}

impl Map {
    pub fn new(catalog: Arc<dyn ItemCatalog>) -> Self {
        Self {
            info: MapInfo::default(),
            tiles: TileMap::new(),
            houses: Houses::default(),
            towns: Towns::default(),
            waypoints: Waypoints::default(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &dyn ItemCatalog {
        self.catalog.as_ref()
    }

    pub fn create_item(&self, id: u16) -> Item {
        self.catalog.create_item(id)
    }

    pub fn tile(&self, p: Position) -> Option<&Tile> {
        self.tiles.tile(p)
    }

    pub fn get_or_create_tile(&mut self, p: Position) -> Option<&mut Tile> {
        self.tiles.get_or_create_tile(p)
    }

    /// Adds `item` to the tile at `p` with ground-aware stacking. Returns false for invalid positions.
    pub fn add_thing(&mut self, item: Item, p: Position) -> bool {
        match self.tiles.get_or_create_tile(p) {
            Some(tile) => {
                tile.add_thing(item);
                true
            }
            None => false,
        }
    }

    /// Makes the tile at `p` a member of house `house_id`, creating both if needed.
    pub fn bind_house(&mut self, house_id: u32, p: Position) -> bool {
        let Some(tile) = self.tiles.get_or_create_tile(p) else {
            return false;
        };
        tile.bind_house(house_id);
        self.houses.get_or_create(house_id).add_tile(p);
        true
    }

    /// Bounding box of all nonempty tiles.
    pub fn bounds(&self) -> Bounds {
        self.tiles.tiles().map(Tile::position).collect()
    }

    /// Drops all tiles, houses, towns and waypoints. The catalog is kept.
    pub fn clear(&mut self) {
        self.info = MapInfo::default();
        self.tiles.clear();
        self.houses.clear();
        self.towns.clear();
        self.waypoints.clear();
    }

    /// Loads an OTBM file into this map.
    ///
    /// On failure, whatever was read before the error stays in the map.
    pub fn load_otbm(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary, MapError> {
        let path = path.as_ref();
        otbm::load(self, path).map_err(|e| {
            log::error!("Failed to load '{}': {}", path.display(), e);
            e
        })
    }

    pub fn save_otbm(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let path = path.as_ref();
        otbm::save(self, path).map_err(|e| {
            log::error!("Failed to save '{}': {}", path.display(), e);
            e
        })
    }

    /// Loads an OTCM snapshot, adding its tiles to this map. Returns the number of tile records read.
    pub fn load_otcm(&mut self, path: impl AsRef<Path>) -> Result<usize, MapError> {
        let path = path.as_ref();
        otcm::load(self, path).map_err(|e| {
            log::error!("Failed to load OTCM map '{}': {}", path.display(), e);
            e
        })
    }

    pub fn save_otcm(&self, path: impl AsRef<Path>, config: &SnapshotConfig) -> Result<(), MapError> {
        let path = path.as_ref();
        otcm::save(self, path, config).map_err(|e| {
            log::error!("Failed to save OTCM map '{}': {}", path.display(), e);
            e
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
