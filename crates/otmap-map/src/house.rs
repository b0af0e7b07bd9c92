use otmap_core::{Position, SmallKeyHashMap};
use smallvec::SmallVec;

/// A house owns a set of tiles, recorded by position. The tiles themselves live in the [`TileMap`](crate::TileMap) and point back
/// with [`Tile::house_id`](crate::Tile::house_id).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct House {
    id: u32,
    tiles: SmallVec<[Position; 16]>,
}

impl House {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            tiles: SmallVec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn tiles(&self) -> &[Position] {
        &self.tiles
    }

    pub(crate) fn add_tile(&mut self, p: Position) {
        if !self.tiles.contains(&p) {
            self.tiles.push(p);
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Houses {
    houses: SmallKeyHashMap<u32, House>,
}

impl Houses {
    pub fn get(&self, id: u32) -> Option<&House> {
        self.houses.get(&id)
    }

    pub fn get_or_create(&mut self, id: u32) -> &mut House {
        self.houses.entry(id).or_insert_with(|| House::new(id))
    }

    pub fn len(&self) -> usize {
        self.houses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    pub fn clear(&mut self) {
        self.houses.clear();
    }
}
