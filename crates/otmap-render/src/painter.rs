use crate::Canvas;

use image::Rgba;
use otmap_map::Tile;

/// Draws tiles. Shared by every render worker.
pub trait TilePainter: Send + Sync {
    /// Paints `tile` with its top-left corner at pixel `origin`.
    fn paint(&self, tile: &Tile, canvas: &mut Canvas, origin: (u32, u32));
}

/// Paints each tile as a solid square in the minimap colour of its topmost item that has one.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinimapPainter;

impl TilePainter for MinimapPainter {
    fn paint(&self, tile: &Tile, canvas: &mut Canvas, (x, y): (u32, u32)) {
        let color = tile.things().iter().rev().find_map(|item| item.minimap_color());
        if let Some(color) = color {
            let side = canvas.tile_pixels();
            canvas.fill_rect(x, y, side, side, minimap_rgba(color));
        }
    }
}

/// Colours of the 6×6×6 minimap palette. Indices past 215 wrap around.
pub fn minimap_rgba(color: u8) -> Rgba<u8> {
    let c = u32::from(color);
    let channel = |v: u32| ((v % 6) * 51) as u8;
    Rgba([channel(c / 36), channel(c / 6), channel(c), 255])
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
