use crate::{Canvas, RenderConfig, RenderRegion, TilePainter, WorkItem, WorkQueue};

use itertools::iproduct;
use otmap_core::{Bounds, Position, WorkSummary};
use otmap_map::Map;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a render job reads. The map is shared read-only with every worker.
struct RenderContext {
    map: Arc<Map>,
    painter: Arc<dyn TilePainter>,
    section_size: u16,
    tile_pixels: u32,
    output_dir: PathBuf,
}

impl RenderContext {
    fn draw_section(&self, section_x: u16, section_y: u16, z: u8) -> Canvas {
        let size = u32::from(self.section_size);
        let tile_pixels = self.tile_pixels;
        let mut canvas = Canvas::for_section(size, tile_pixels);

        let x0 = u32::from(section_x) * size;
        let y0 = u32::from(section_y) * size;
        // One extra row and column: their sprites may overlap into the section.
        for (dx, dy) in iproduct!(0..=size, 0..=size) {
            let (Ok(x), Ok(y)) = (u16::try_from(x0 + dx), u16::try_from(y0 + dy)) else {
                continue;
            };
            if let Some(tile) = self.map.tile(Position::new(x, y, z)) {
                let origin = ((dx + 1) * tile_pixels, (dy + 1) * tile_pixels);
                self.painter.paint(tile, &mut canvas, origin);
            }
        }

        canvas.crop()
    }

    fn render_region(&self, region: &RenderRegion) {
        for (z, x, y) in iproduct!(
            region.min_z..=region.max_z,
            region.min_x..=region.max_x,
            region.min_y..=region.max_y
        ) {
            let path = self.output_dir.join(format!("{}_{}_{}.png", x, y, z));
            match self.draw_section(x, y, z).save_png(&path) {
                Ok(true) => log::debug!("Wrote {}", path.display()),
                Ok(false) => {}
                Err(e) => log::warn!("Failed to write {}: {}", path.display(), e),
            }
        }
    }
}

pub struct RenderJob {
    region: RenderRegion,
    context: Arc<RenderContext>,
}

impl WorkItem for RenderJob {
    fn execute(self) {
        self.context.render_region(&self.region);
    }
}

/// Renders map sections to PNG files on a [`WorkQueue`].
///
/// Each section becomes `{x}_{y}_{z}.png` in the output directory, named by section coordinates. Sections without any painted
/// pixel produce no file.
pub struct MapRenderer {
    context: Arc<RenderContext>,
    queue: WorkQueue<RenderJob>,
    jobs_submitted: usize,
}

impl MapRenderer {
    /// Creates the output directory and starts the workers.
    pub fn new(map: Arc<Map>, painter: Arc<dyn TilePainter>, config: &RenderConfig) -> io::Result<Self> {
        fs::create_dir_all(&config.output_dir)?;
        let context = Arc::new(RenderContext {
            map,
            painter,
            section_size: config.section_size.max(1),
            tile_pixels: config.tile_pixels.max(1),
            output_dir: config.output_dir.clone(),
        });

        Ok(Self {
            context,
            queue: WorkQueue::new(config.worker_count, config.queue_capacity)?,
            jobs_submitted: 0,
        })
    }

    /// Paints one section without writing it anywhere.
    pub fn draw_section(&self, section_x: u16, section_y: u16, z: u8) -> Canvas {
        self.context.draw_section(section_x, section_y, z)
    }

    /// Queues `region`, waiting for room if every worker is busy.
    pub fn submit(&mut self, region: RenderRegion) {
        self.queue.push(RenderJob {
            region,
            context: self.context.clone(),
        });
        self.jobs_submitted += 1;
    }

    /// Queues one job per section column covering `bounds`. Returns the number of jobs.
    pub fn render_bounds(&mut self, bounds: &Bounds, floor: Option<u8>) -> usize {
        let regions = RenderRegion::covering(bounds, self.context.section_size, floor);
        let sections: usize = regions.iter().map(RenderRegion::section_count).sum();
        log::info!("Rendering {} sections in {} jobs", sections, regions.len());

        let n = regions.len();
        for region in regions {
            self.submit(region);
        }
        n
    }

    /// Waits for every queued job and stops the workers.
    pub fn finish(mut self) -> WorkSummary {
        let summary = self.queue.signal_completion();
        log::info!(
            "Rendered {} of {} jobs, {}us per job on average",
            summary.jobs_completed,
            self.jobs_submitted,
            summary.average_job_time_us()
        );
        summary
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{minimap_rgba, MinimapPainter};

    use image::Rgba;
    use otmap_map::{ItemFlags, ItemType, SchemaVersion, StaticCatalog};

    const GRASS: u16 = 100;
    const WALL: u16 = 400;

    fn small_map() -> Map {
        let catalog = StaticCatalog::new(SchemaVersion::new(3, 57))
            .with_item(GRASS, ItemType::new(ItemFlags::GROUND).with_minimap_color(24))
            .with_item(WALL, ItemType::new(ItemFlags::empty()).with_minimap_color(86));
        let mut map = Map::new(Arc::new(catalog));
        for x in 0..8 {
            for y in 0..8 {
                map.add_thing(map.create_item(GRASS), Position::new(x, y, 7));
            }
        }
        map.add_thing(map.create_item(WALL), Position::new(3, 2, 7));
        // First column of the next section: only in the margin of section (0, 0).
        map.add_thing(map.create_item(WALL), Position::new(8, 0, 7));
        map
    }

    fn config(output_dir: PathBuf) -> RenderConfig {
        RenderConfig {
            worker_count: 2,
            queue_capacity: 4,
            output_dir,
            ..Default::default()
        }
    }

    #[test]
    fn sections_are_drawn_at_tile_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let map = Arc::new(small_map());
        let renderer = MapRenderer::new(map, Arc::new(MinimapPainter), &config(dir.path().into())).unwrap();

        let canvas = renderer.draw_section(0, 0, 7);
        assert_eq!(canvas.width(), 256);
        assert_eq!(canvas.pixel(0, 0), minimap_rgba(24));
        assert_eq!(canvas.pixel(3 * 32 + 5, 2 * 32 + 5), minimap_rgba(86));
        assert_eq!(canvas.pixel(255, 0), minimap_rgba(24));

        assert!(!renderer.draw_section(0, 0, 6).has_content());
        renderer.finish();
    }

    #[test]
    fn render_writes_only_sections_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sections");
        let map = Arc::new(small_map());

        let mut renderer =
            MapRenderer::new(map.clone(), Arc::new(MinimapPainter), &config(out.clone())).unwrap();
        renderer.submit(RenderRegion {
            min_x: 0,
            min_y: 0,
            max_x: 1,
            max_y: 1,
            min_z: 6,
            max_z: 7,
        });
        let summary = renderer.finish();
        assert_eq!(summary.jobs_completed, 1);
        assert_eq!(Arc::strong_count(&map), 1);

        let mut written: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        written.sort();
        assert_eq!(written, vec!["0_0_7.png", "1_0_7.png"]);

        let image = image::open(out.join("0_0_7.png")).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (256, 256));
        assert_eq!(*image.get_pixel(10, 10), minimap_rgba(24));
        assert_eq!(*image.get_pixel(3 * 32, 2 * 32), minimap_rgba(86));

        let image = image::open(out.join("1_0_7.png")).unwrap().to_rgba8();
        assert_eq!(*image.get_pixel(0, 0), minimap_rgba(86));
        assert_eq!(*image.get_pixel(32, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn whole_map_render() {
        let dir = tempfile::tempdir().unwrap();
        let map = Arc::new(small_map());
        let bounds = map.bounds();

        let mut renderer = MapRenderer::new(map, Arc::new(MinimapPainter), &config(dir.path().into())).unwrap();
        assert_eq!(renderer.render_bounds(&bounds, None), 2);
        assert_eq!(renderer.finish().jobs_completed, 2);
        assert!(dir.path().join("0_0_7.png").exists());
        assert!(dir.path().join("1_0_7.png").exists());
    }
}
