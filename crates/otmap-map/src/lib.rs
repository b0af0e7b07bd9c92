//! The otmap data model and its file formats.
//!
//! # Tiles
//!
//! A world is a stack of 16 layers (z = 7 is ground level, smaller z is above it). Each cell of a layer is a
//! [`Tile`] holding an ordered stack of [`Item`]s, ground first. Tiles are stored sparsely in a [`TileMap`]: every layer is an
//! ordered map of 256×256 [`TileBlock`]s, and blocks allocate tiles lazily. Iteration is always in canonical order (layer,
//! then block, then row-major inside the block), which is what makes saved files reproducible byte for byte.
//!
//! # Items
//!
//! The map codecs only need a few facts about an item type (is it ground, a container, a door...). Those come from an
//! [`ItemCatalog`], which is shared by every [`Map`] built from it. [`StaticCatalog`] is the in-memory implementation, usually
//! read from a RON file.
//!
//! # Formats
//!
//! - [`otbm`]: the full map, as an escape-coded node tree (see [`binary_tree`]).
//! - [`otcm`]: a flat snapshot of item stacks, optionally LZ4 compressed.

pub mod binary_tree;
pub mod otbm;
pub mod otcm;

mod config;
mod error;
mod house;
mod item;
mod map;
mod tile;
mod tile_map;
mod town;
mod waypoint;

pub use config::*;
pub use error::*;
pub use house::*;
pub use item::*;
pub use map::*;
pub use otbm::LoadSummary;
pub use otcm::{SnapshotFlags, SnapshotHeader};
pub use tile::*;
pub use tile_map::*;
pub use town::*;
pub use waypoint::*;

pub use otmap_core;
