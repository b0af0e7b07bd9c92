use otmap_core::Position;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Town {
    pub id: u32,
    pub name: String,
    /// Where characters of this town respawn.
    pub temple: Position,
}

impl Town {
    pub fn new(id: u32, name: impl Into<String>, temple: Position) -> Self {
        Self {
            id,
            name: name.into(),
            temple,
        }
    }
}

/// The town registry. Enumerates in name order once [`sort`](Self::sort) has run, which the loader does after every towns
/// block.
#[derive(Clone, Debug, Default)]
pub struct Towns {
    towns: Vec<Town>,
}

impl Towns {
    /// Registers `town` unless its id is already taken. Returns whether it was added.
    pub fn add(&mut self, town: Town) -> bool {
        if self.get(town.id).is_some() {
            return false;
        }
        self.towns.push(town);
        true
    }

    pub fn get(&self, id: u32) -> Option<&Town> {
        self.towns.iter().find(|t| t.id == id)
    }

    pub fn sort(&mut self) {
        self.towns.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Town> {
        self.towns.iter()
    }

    pub fn len(&self) -> usize {
        self.towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }

    pub fn clear(&mut self) {
        self.towns.clear();
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

    #[test]
    fn first_id_wins_and_names_sort() {
        let mut towns = Towns::default();
        assert!(towns.add(Town::new(2, "Venore", Position::new(32957, 32076, 7))));
        assert!(towns.add(Town::new(1, "Thais", Position::new(32369, 32241, 7))));
        assert!(!towns.add(Town::new(2, "Carlin", Position::new(32360, 31782, 7))));
        towns.sort();

        let names: Vec<_> = towns.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Thais", "Venore"]);
        assert_eq!(towns.get(2).unwrap().name, "Venore");
    }
}
