use otmap_map::{ItemCatalog, MapConfig, SchemaVersion, StaticCatalog};
use otmap_render::RenderConfig;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::Error),
}

/// Catalog schema assumed when no catalog file is configured.
pub const DEFAULT_SCHEMA: SchemaVersion = SchemaVersion::new(3, 57);

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub map: MapConfig,
    pub render: RenderConfig,
    /// RON file holding a [`StaticCatalog`]. Relative paths are resolved against the config file's directory.
    pub catalog: Option<PathBuf>,
}

impl Config {
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let reader = File::open(path)?;
        let mut config: Self = ron::de::from_reader(reader)?;

        if let (Some(catalog), Some(dir)) = (config.catalog.as_mut(), path.parent()) {
            if catalog.is_relative() {
                *catalog = dir.join(&*catalog);
            }
        }

        Ok(config)
    }

    /// Reads the configured catalog, or returns an empty one at [`DEFAULT_SCHEMA`].
    pub fn load_catalog(&self) -> Result<Arc<dyn ItemCatalog>, ConfigError> {
        let catalog = match &self.catalog {
            Some(path) => {
                let catalog: StaticCatalog = ron::de::from_reader(File::open(path)?)?;
                log::debug!(
                    "Read {} item types (schema {}.{}) from '{}'",
                    catalog.items.len(),
                    catalog.schema.major,
                    catalog.schema.minor,
                    path.display()
                );
                catalog
            }
            None => {
                log::warn!("No item catalog configured, every item will be unknown");
                StaticCatalog::new(DEFAULT_SCHEMA)
            }
        };

        Ok(Arc::new(catalog))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
