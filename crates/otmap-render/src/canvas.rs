use image::{imageops, ImageResult, Rgba, RgbaImage};
use std::path::Path;

/// The pixel buffer one map section is painted into.
///
/// A section of `size × size` tiles gets a canvas of `(size + 2) × (size + 2)` tiles: tile `(x, y)` of the section is painted
/// at tile offset `(x + 1, y + 1)`, so large sprites reaching up and left of their tile still land on the canvas. The margin
/// is cut off again by [`crop`](Self::crop).
pub struct Canvas {
    image: RgbaImage,
    tile_pixels: u32,
}

impl Canvas {
    pub fn for_section(section_size: u32, tile_pixels: u32) -> Self {
        let side = tile_pixels * (section_size + 2);
        Self {
            image: RgbaImage::new(side, side),
            tile_pixels,
        }
    }

    pub fn tile_pixels(&self) -> u32 {
        self.tile_pixels
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Fills the `w × h` rectangle at `(x, y)`, clipped to the canvas.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let x_end = x.saturating_add(w).min(self.image.width());
        let y_end = y.saturating_add(h).min(self.image.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    /// Cuts the one-tile margin off a canvas made by [`for_section`](Self::for_section).
    pub fn crop(&self) -> Canvas {
        let margin = self.tile_pixels;
        let side = self.image.width().saturating_sub(2 * margin);
        let image = imageops::crop_imm(&self.image, margin, margin, side, side).to_image();
        Canvas {
            image,
            tile_pixels: self.tile_pixels,
        }
    }

    /// True if any pixel is not fully transparent.
    pub fn has_content(&self) -> bool {
        self.image.pixels().any(|p| p[3] != 0)
    }

    /// Writes a PNG. Canvases without content are skipped; returns whether a file was written.
    pub fn save_png(&self, path: &Path) -> ImageResult<bool> {
        if !self.has_content() {
            return Ok(false);
        }
        self.image.save(path)?;
        Ok(true)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
