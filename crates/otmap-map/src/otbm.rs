//! The OTBM map format: a 4-byte identifier followed by one escape-coded [tree](crate::binary_tree).
//!
//! ```text
//! root (kind 0)      u32 version, u16 width, u16 height, u32 schema major, u32 schema minor
//! └─ map data        (u8 attribute, string)*
//!    ├─ tile area    u16 x, u16 y, u8 z
//!    │  └─ tile      u8 dx, u8 dy, [u32 house id], (u8 attribute, value)*
//!    │     └─ item   u16 id, (u8 attribute, value)*
//!    │        └─ item
//!    ├─ towns
//!    │  └─ town      u32 id, string name, u16 x, u16 y, u8 z
//!    └─ waypoints    (format version 2 and later)
//!       └─ waypoint  string name, u16 x, u16 y, u8 z
//! ```
//!
//! The schema major is read back as a `u8` followed by three reserved bytes, which is the same layout for any major below 256.

mod load;
mod save;

pub use load::LoadSummary;

pub(crate) use load::load;
pub(crate) use save::save;

/// Accepted in the identifier slot besides all zeros.
pub const MAGIC: [u8; 4] = *b"OTBM";

/// Newest format version the loader understands.
pub const MAX_VERSION: u32 = 3;

/// Catalogs with at least this schema major are saved as format version 2 (with waypoints), older ones as version 1.
pub const WAYPOINTS_SCHEMA_MAJOR: u32 = 3;

/// Tree node kinds.
pub mod node {
    pub const ROOT: u8 = 0;
    pub const MAP_DATA: u8 = 2;
    pub const TILE_AREA: u8 = 4;
    pub const TILE: u8 = 5;
    pub const ITEM: u8 = 6;
    pub const TOWNS: u8 = 12;
    pub const TOWN: u8 = 13;
    pub const HOUSE_TILE: u8 = 14;
    pub const WAYPOINTS: u8 = 15;
    pub const WAYPOINT: u8 = 16;
}

/// Attribute discriminants, shared by map data, tile and item records.
pub mod attr {
    pub const DESCRIPTION: u8 = 1;
    pub const TILE_FLAGS: u8 = 3;
    pub const ACTION_ID: u8 = 4;
    pub const UNIQUE_ID: u8 = 5;
    pub const TEXT: u8 = 6;
    pub const DESC: u8 = 7;
    pub const TELE_DEST: u8 = 8;
    pub const ITEM: u8 = 9;
    pub const DEPOT_ID: u8 = 10;
    pub const SPAWN_FILE: u8 = 11;
    pub const RUNE_CHARGES: u8 = 12;
    pub const HOUSE_FILE: u8 = 13;
    pub const HOUSE_DOOR_ID: u8 = 14;
    pub const COUNT: u8 = 15;
    pub const CHARGES: u8 = 22;
}

/// The format version written for a catalog with the given schema major.
pub fn format_version_for(schema_major: u32) -> u32 {
    if schema_major < WAYPOINTS_SCHEMA_MAJOR {
        1
    } else {
        2
    }
}
