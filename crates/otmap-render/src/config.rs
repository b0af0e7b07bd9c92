use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub worker_count: usize,
    /// Pending jobs each worker can hold before the producer has to wait.
    pub queue_capacity: usize,
    /// Edge length of one output image, in tiles.
    pub section_size: u16,
    pub tile_pixels: u32,
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            worker_count: 16,
            queue_capacity: 1000,
            section_size: 8,
            tile_pixels: 32,
            output_dir: PathBuf::from("map"),
        }
    }
}
