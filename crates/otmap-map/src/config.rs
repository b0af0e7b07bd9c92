use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    pub snapshot: SnapshotConfig,
}

/// Header fields written into OTCM snapshots.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub description: String,
    pub world_name: String,
    pub protocol_version: u16,
    /// LZ4-compress the tile records.
    pub compress: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            description: "OTCM 1.0".to_string(),
            world_name: String::new(),
            protocol_version: 0,
            compress: false,
        }
    }
}
