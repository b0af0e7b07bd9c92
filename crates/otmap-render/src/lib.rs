//! Offline map rendering.
//!
//! A loaded [`Map`](otmap_map::Map) is cut into square sections (8×8 tiles by default) and every section is painted into its own
//! PNG by a pool of worker threads. The map is only read while rendering; it is shared with the workers behind an `Arc` and
//! can be taken back for writing once [`MapRenderer::finish`] returns.

mod canvas;
mod config;
mod painter;
mod region;
mod renderer;
mod work_queue;

pub use canvas::*;
pub use config::*;
pub use painter::*;
pub use region::*;
pub use renderer::*;
pub use work_queue::*;
