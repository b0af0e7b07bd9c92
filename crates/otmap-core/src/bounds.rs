use crate::Position;

/// Running per-axis minimum and maximum of a set of positions.
///
/// Axes are tracked independently, so `min` and `max` are corners of the bounding box and need not be members of the set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bounds {
    extremes: Option<(Position, Position)>,
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, p: Position) {
        self.extremes = Some(match self.extremes {
            None => (p, p),
            Some((min, max)) => (
                Position::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Position::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            ),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.extremes.is_none()
    }

    pub fn min(&self) -> Option<Position> {
        self.extremes.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<Position> {
        self.extremes.map(|(_, max)| max)
    }

    /// `(min, max)` if any position has been seen.
    pub fn extremes(&self) -> Option<(Position, Position)> {
        self.extremes
    }

    pub fn contains(&self, p: Position) -> bool {
        self.extremes.map_or(false, |(min, max)| {
            (min.x..=max.x).contains(&p.x)
                && (min.y..=max.y).contains(&p.y)
                && (min.z..=max.z).contains(&p.z)
        })
    }
}

impl FromIterator<Position> for Bounds {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut bounds = Bounds::new();
        for p in iter {
            bounds.extend(p);
        }
        bounds
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
