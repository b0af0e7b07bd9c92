use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::fmt;
use std::mem;

/// The deepest layer of the world. Layers are numbered `0..=MAX_Z`.
pub const MAX_Z: u8 = 15;

/// A map cell coordinate.
///
/// Coordinates use the same widths as the on-disk formats (16-bit x and y, 8-bit z), so positions read from a file never need
/// to be range checked on the way in. Validity is a separate question answered by [`Position::is_valid`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize,
)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: u8,
}

const_assert_eq!(mem::size_of::<Position>(), 6);

impl Position {
    /// Sentinel that terminates streamed position lists.
    pub const INVALID: Self = Self::new(u16::MAX, u16::MAX, u8::MAX);

    pub const fn new(x: u16, y: u16, z: u8) -> Self {
        Self { x, y, z }
    }

    pub const fn is_valid(&self) -> bool {
        !(self.x == Self::INVALID.x && self.y == Self::INVALID.y && self.z == Self::INVALID.z)
            && self.z <= MAX_Z
    }

    /// Adds a small unsigned offset on the same layer, returning `None` on overflow.
    pub fn checked_offset(&self, dx: u16, dy: u16) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z,
        ))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
