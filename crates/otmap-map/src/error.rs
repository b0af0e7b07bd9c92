use otmap_core::Position;
use std::io;
use thiserror::Error;

/// Structural corruption of an escape-coded tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("expected a node start marker, found {0:#04x}")]
    MissingNodeStart(u8),
    #[error("stream ended before a node kind byte")]
    MissingNodeKind,
    #[error("unescaped marker {0:#04x} where a node kind was expected")]
    UnexpectedMarker(u8),
    #[error("stream ended with {open_nodes} node(s) still open")]
    Truncated { open_nodes: usize },
    #[error("read of {wanted} byte(s) past the end of node {kind} ({remaining} left)")]
    ReadPastEnd {
        kind: u8,
        wanted: usize,
        remaining: usize,
    },
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed tree: {0}")]
    MalformedTree(#[from] TreeError),
    #[error("invalid file identifier {0:?}")]
    InvalidIdentifier([u8; 4]),
    #[error("could not read root property (found {0})")]
    InvalidHeader(u8),
    #[error("unknown OTBM version {0}")]
    UnsupportedVersion(u32),
    #[error("map was saved with item schema major version {found}, newest supported is {supported}")]
    SchemaMismatch { found: u32, supported: u32 },
    #[error("root node has no map data node")]
    MissingMapData,
    #[error("unknown attribute {attribute} at {position:?}")]
    UnknownAttribute {
        attribute: u8,
        position: Option<Position>,
    },
    #[error("unknown map data node {0}")]
    UnknownMapDataNode(u8),
    #[error("invalid node type {found}, expected {expected}")]
    InvalidNodeType { expected: &'static str, found: u8 },
    #[error("invalid item attribute {0}")]
    InvalidItemAttribute(u8),
    #[error("tile offset from area base {base} overflows the map")]
    PositionOverflow { base: Position },
    #[error("invalid snapshot signature {0:#010x}")]
    InvalidSnapshotSignature(u32),
    #[error("snapshot version {0} not supported")]
    UnsupportedSnapshotVersion(u16),
    #[error("snapshot header too large ({0} bytes)")]
    SnapshotHeaderTooLarge(u64),
    #[error("compression: {0}")]
    Compression(String),
}
