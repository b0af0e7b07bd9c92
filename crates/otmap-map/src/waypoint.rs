use otmap_core::Position;
use std::collections::BTreeMap;

/// Named positions, keyed by position. Names are not required to be unique.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Waypoints {
    by_position: BTreeMap<Position, String>,
}

impl Waypoints {
    /// Inserts unless `p` is invalid, `name` is empty, or `p` already holds a waypoint. Returns whether it was inserted.
    pub fn add(&mut self, p: Position, name: impl Into<String>) -> bool {
        let name = name.into();
        if !p.is_valid() || name.is_empty() || self.by_position.contains_key(&p) {
            return false;
        }
        self.by_position.insert(p, name);
        true
    }

    pub fn name_at(&self, p: Position) -> Option<&str> {
        self.by_position.get(&p).map(String::as_str)
    }

    /// Waypoints in position order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &str)> {
        self.by_position.iter().map(|(p, n)| (*p, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_position.clear();
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
