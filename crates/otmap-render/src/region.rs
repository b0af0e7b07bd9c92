use otmap_core::Bounds;

/// An inclusive box of sections, where section `(x, y)` covers the tiles starting at `(x * section_size, y * section_size)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderRegion {
    pub min_x: u16,
    pub min_y: u16,
    pub max_x: u16,
    pub max_y: u16,
    pub min_z: u8,
    pub max_z: u8,
}

impl RenderRegion {
    pub fn section_count(&self) -> usize {
        let span = |min: u16, max: u16| usize::from(max.saturating_sub(min)) + 1;
        span(self.min_x, self.max_x)
            * span(self.min_y, self.max_y)
            * (usize::from(self.max_z.saturating_sub(self.min_z)) + 1)
    }

    /// Splits the sections covering `bounds` into one region per section column. With `floor`, only that layer is covered.
    pub fn covering(bounds: &Bounds, section_size: u16, floor: Option<u8>) -> Vec<RenderRegion> {
        let Some((min, max)) = bounds.extremes() else {
            return Vec::new();
        };
        let size = section_size.max(1);
        let (min_z, max_z) = match floor {
            Some(z) => (z, z),
            None => (min.z, max.z),
        };

        (min.x / size..=max.x / size)
            .map(|x| RenderRegion {
                min_x: x,
                max_x: x,
                min_y: min.y / size,
                max_y: max.y / size,
                min_z,
                max_z,
            })
            .collect()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
