//! Tools around OTBM and OTCM world maps: loading, converting, and rendering them.
//!
//! The codecs live in [`otmap_map`] and the renderer in [`otmap_render`]; this crate adds the shared configuration file and
//! picks a codec by file extension.

mod config;
mod format;

pub use config::*;
pub use format::*;

pub use otmap_core;
pub use otmap_map;
pub use otmap_render;
