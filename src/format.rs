use crate::Config;

use otmap_map::{Map, MapError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("'{0}' is neither an .otbm nor an .otcm file")]
    UnknownFormat(PathBuf),
    #[error(transparent)]
    Map(#[from] MapError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MapFormat {
    Otbm,
    Otcm,
}

impl MapFormat {
    /// Picks the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "otbm" => Some(Self::Otbm),
            "otcm" => Some(Self::Otcm),
            _ => None,
        }
    }

    fn of(path: &Path) -> Result<Self, FormatError> {
        Self::from_path(path).ok_or_else(|| FormatError::UnknownFormat(path.to_path_buf()))
    }
}

/// Loads `path` into `map` in whichever format its extension names. Returns the number of tiles read.
pub fn load_map(map: &mut Map, path: &Path) -> Result<usize, FormatError> {
    let tiles = match MapFormat::of(path)? {
        MapFormat::Otbm => map.load_otbm(path)?.tiles_read,
        MapFormat::Otcm => map.load_otcm(path)?,
    };
    Ok(tiles)
}

pub fn save_map(map: &Map, path: &Path, config: &Config) -> Result<(), FormatError> {
    match MapFormat::of(path)? {
        MapFormat::Otbm => map.save_otbm(path)?,
        MapFormat::Otcm => map.save_otcm(path, &config.map.snapshot)?,
    }
    Ok(())
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

    use otmap_map::otmap_core::Position;
    use otmap_map::{ItemFlags, ItemType, SchemaVersion, StaticCatalog};
    use std::sync::Arc;

    #[test]
    fn format_from_extension() {
        assert_eq!(MapFormat::from_path(Path::new("world.otbm")), Some(MapFormat::Otbm));
        assert_eq!(MapFormat::from_path(Path::new("dir/World.OTCM")), Some(MapFormat::Otcm));
        assert_eq!(MapFormat::from_path(Path::new("world.xml")), None);
        assert_eq!(MapFormat::from_path(Path::new("world")), None);
    }

    #[test]
    fn convert_otbm_to_otcm() {
        let catalog = Arc::new(
            StaticCatalog::new(SchemaVersion::new(3, 57)).with_item(100, ItemType::new(ItemFlags::GROUND)),
        );
        let dir = tempfile::tempdir().unwrap();
        let otbm = dir.path().join("world.otbm");
        let otcm = dir.path().join("world.otcm");
        let config = Config::default();

        let mut map = Map::new(catalog.clone());
        for x in 0..3 {
            map.add_thing(map.create_item(100), Position::new(x, 5, 7));
        }
        save_map(&map, &otbm, &config).unwrap();

        let mut loaded = Map::new(catalog.clone());
        assert_eq!(load_map(&mut loaded, &otbm).unwrap(), 3);
        save_map(&loaded, &otcm, &config).unwrap();

        let mut snapshot = Map::new(catalog);
        assert_eq!(load_map(&mut snapshot, &otcm).unwrap(), 3);
        assert_eq!(snapshot.bounds(), map.bounds());

        assert!(matches!(
            save_map(&map, &dir.path().join("world.txt"), &config),
            Err(FormatError::UnknownFormat(_))
        ));
    }
}
