use crate::Tile;

use ndshape::{ConstShape, ConstShape2u32};
use otmap_core::static_assertions::const_assert_eq;
use otmap_core::{Position, MAX_Z};
use std::collections::BTreeMap;

/// Tiles per block edge. Blocks are also the unit of tile-area grouping in saved maps.
pub const BLOCK_EDGE: u16 = 256;

/// Row-major layout of the tiles inside a block: `index = x + BLOCK_EDGE * y`.
pub type BlockShape = ConstShape2u32<256, 256>;
const_assert_eq!(BlockShape::USIZE, 256 * 256);

pub const LAYER_COUNT: usize = MAX_Z as usize + 1;

/// Key of the block containing `p` within its layer. Keys grow with y first, then x, so iterating a layer's blocks in key
/// order walks block rows top to bottom.
pub fn block_key(p: Position) -> u32 {
    (u32::from(p.y) >> 8) * u32::from(BLOCK_EDGE) + (u32::from(p.x) >> 8)
}

/// The minimum corner of the block containing `p`.
pub fn block_origin(p: Position) -> Position {
    Position::new(p.x & !0xFF, p.y & !0xFF, p.z)
}

fn tile_index(p: Position) -> usize {
    BlockShape::linearize([u32::from(p.x & 0xFF), u32::from(p.y & 0xFF)]) as usize
}

/// Up to 256×256 tiles of one layer sharing the same block origin. Slots are allocated lazily, one box per tile.
pub struct TileBlock {
    tiles: Box<[Option<Box<Tile>>]>,
}

impl TileBlock {
    fn new() -> Self {
        Self {
            tiles: (0..BlockShape::USIZE).map(|_| None).collect(),
        }
    }

    pub fn tile(&self, p: Position) -> Option<&Tile> {
        self.tiles[tile_index(p)].as_deref()
    }

    pub fn tile_mut(&mut self, p: Position) -> Option<&mut Tile> {
        self.tiles[tile_index(p)].as_deref_mut()
    }

    fn get_or_create(&mut self, p: Position) -> &mut Tile {
        self.tiles[tile_index(p)].get_or_insert_with(|| Box::new(Tile::new(p)))
    }

    /// Allocated tiles in row-major order, including empty ones.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter_map(|t| t.as_deref())
    }
}

/// The spatial tile store: one ordered map of [`TileBlock`]s per layer.
pub struct TileMap {
    layers: Vec<BTreeMap<u32, TileBlock>>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self {
            layers: (0..LAYER_COUNT).map(|_| BTreeMap::new()).collect(),
        }
    }
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never allocates. `None` for invalid positions and for cells nothing was ever created at.
    pub fn tile(&self, p: Position) -> Option<&Tile> {
        if !p.is_valid() {
            return None;
        }
        self.layers[p.z as usize].get(&block_key(p))?.tile(p)
    }

    pub fn tile_mut(&mut self, p: Position) -> Option<&mut Tile> {
        if !p.is_valid() {
            return None;
        }
        self.layers[p.z as usize].get_mut(&block_key(p))?.tile_mut(p)
    }

    pub fn contains(&self, p: Position) -> bool {
        self.tile(p).is_some()
    }

    /// Returns the tile at `p`, creating its block and the tile itself as needed. `None` only for invalid positions.
    pub fn get_or_create_tile(&mut self, p: Position) -> Option<&mut Tile> {
        if !p.is_valid() {
            return None;
        }
        Some(
            self.layers[p.z as usize]
                .entry(block_key(p))
                .or_insert_with(TileBlock::new)
                .get_or_create(p),
        )
    }

    /// Every nonempty tile in canonical order: layers ascending, then blocks by key, then row-major within each block.
    ///
    /// The order depends only on which positions hold nonempty tiles, never on insertion order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.layers
            .iter()
            .flat_map(|blocks| blocks.values())
            .flat_map(|block| block.tiles())
            .filter(|tile| !tile.is_empty() && tile.position().is_valid())
    }

    pub fn for_each_tile(&self, mut visitor: impl FnMut(&Tile)) {
        for tile in self.tiles() {
            visitor(tile);
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    pub fn block_count(&self) -> usize {
        self.layers.iter().map(BTreeMap::len).sum()
    }

    pub fn clear(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.clear();
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
