use crate::Item;

use bitflags::bitflags;
use otmap_core::Position;

bitflags! {
    /// Zone and membership bits of a tile. The numeric values are the on-disk flag word.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct TileFlags: u32 {
        const PROTECTION_ZONE = 1 << 0;
        const OPTIONAL_ZONE = 1 << 2;
        const NO_LOGOUT = 1 << 3;
        const HARDCORE_ZONE = 1 << 4;
        const REFRESH = 1 << 5;
        const HOUSE = 1 << 6;
    }
}

impl TileFlags {
    /// Keeps only the bits a map file is allowed to set.
    ///
    /// The three zone kinds are mutually exclusive; the first match in protection, optional, hardcore order wins. Any other bit
    /// (including [`TileFlags::HOUSE`], which comes from the tile's node type instead) is dropped.
    pub fn from_stored(bits: u32) -> Self {
        let stored = Self::from_bits_retain(bits);
        let mut flags = Self::empty();
        if stored.contains(Self::PROTECTION_ZONE) {
            flags |= Self::PROTECTION_ZONE;
        } else if stored.contains(Self::OPTIONAL_ZONE) {
            flags |= Self::OPTIONAL_ZONE;
        } else if stored.contains(Self::HARDCORE_ZONE) {
            flags |= Self::HARDCORE_ZONE;
        }
        flags | (stored & (Self::NO_LOGOUT | Self::REFRESH))
    }
}

/// The contents of one map cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tile {
    position: Position,
    /// Ground (if any) first, then the stacked items in stacking order.
    things: Vec<Item>,
    flags: TileFlags,
    house_id: Option<u32>,
}

impl Tile {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            things: Vec::new(),
            flags: TileFlags::empty(),
            house_id: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty() && self.flags.is_empty()
    }

    pub fn things(&self) -> &[Item] {
        &self.things
    }

    pub fn ground(&self) -> Option<&Item> {
        self.things.first().filter(|t| t.is_ground())
    }

    /// Everything above the ground slot, in stack order. A ground item that was pushed out of place is included.
    pub fn items(&self) -> &[Item] {
        let start = usize::from(self.ground().is_some());
        &self.things[start..]
    }

    /// Ground items replace the current ground at the bottom of the stack; everything else goes on top.
    pub fn add_thing(&mut self, item: Item) {
        if item.is_ground() {
            if self.ground().is_some() {
                self.things[0] = item;
            } else {
                self.things.insert(0, item);
            }
        } else {
            self.things.push(item);
        }
    }

    /// Appends without reordering. Used when replaying a stack whose order is already known.
    pub fn push_thing(&mut self, item: Item) {
        self.things.push(item);
    }

    pub fn flags(&self) -> TileFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TileFlags) {
        self.flags |= flags;
    }

    pub fn clear_flags(&mut self, flags: TileFlags) {
        self.flags.remove(flags);
    }

    pub fn house_id(&self) -> Option<u32> {
        self.house_id
    }

    pub(crate) fn bind_house(&mut self, house_id: u32) {
        self.house_id = Some(house_id);
        self.flags |= TileFlags::HOUSE;
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
