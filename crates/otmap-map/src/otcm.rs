//! OTCM, a flat snapshot of every nonempty tile's item stack.
//!
//! ```text
//! u32 signature "OTCM", u16 data offset, u16 version, u32 flags
//! version 1: string description, u32 content signature, u16 protocol version, string world name
//! data:      (u16 x, u16 y, u8 z, (u16 id, u8 subtype)*, u16 0xFFFF)*, u16 0xFFFF, u16 0xFFFF, u8 0xFF
//! ```
//!
//! Strings are a `u16` length followed by Latin-1 bytes, all integers little endian. Tile flags and houses are not stored.

use crate::binary_tree::{latin1_decode, latin1_encode};
use crate::{Item, Map, MapError, SnapshotConfig};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use lz4_flex::frame::{FrameDecoder, FrameEncoder};
use otmap_core::Position;
use smallvec::SmallVec;
use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Instant;

/// `"OTCM"` read as a little endian `u32`.
pub const SIGNATURE: u32 = u32::from_le_bytes(*b"OTCM");
pub const VERSION: u16 = 1;

/// Ends a tile's item list.
const TILE_END: u16 = 0xFFFF;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct SnapshotFlags: u32 {
        /// The data section is one LZ4 frame.
        const COMPRESSED = 1 << 0;
    }
}

/// The version 1 header fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SnapshotHeader {
    pub flags: SnapshotFlags,
    pub description: String,
    pub content_signature: u32,
    pub protocol_version: u16,
    pub world_name: String,
}

pub(crate) fn load(map: &mut Map, path: &Path) -> Result<usize, MapError> {
    let start = Instant::now();
    let bytes = fs::read(path)?;
    let (header, tiles) = read(map, &bytes)?;
    log::info!(
        "Loaded OTCM '{}' ({:?}, world '{}'): {} tiles in {:?}",
        path.display(),
        header.flags,
        header.world_name,
        tiles,
        start.elapsed()
    );
    Ok(tiles)
}

pub(crate) fn save(map: &Map, path: &Path, config: &SnapshotConfig) -> Result<(), MapError> {
    let start = Instant::now();
    let bytes = write(map, config)?;
    fs::write(path, &bytes)?;
    log::info!(
        "Saved OTCM '{}': {} bytes in {:?}",
        path.display(),
        bytes.len(),
        start.elapsed()
    );
    Ok(())
}

/// Replays a snapshot into `map`. Returns the header and the number of tile records read.
pub(crate) fn read(map: &mut Map, bytes: &[u8]) -> Result<(SnapshotHeader, usize), MapError> {
    let mut input = bytes;
    let signature = input.read_u32::<LittleEndian>()?;
    if signature != SIGNATURE {
        return Err(MapError::InvalidSnapshotSignature(signature));
    }
    let data_start = input.read_u16::<LittleEndian>()?;
    let version = input.read_u16::<LittleEndian>()?;
    let flags = SnapshotFlags::from_bits_retain(input.read_u32::<LittleEndian>()?);

    let header = match version {
        1 => SnapshotHeader {
            flags,
            description: read_string(&mut input)?,
            content_signature: input.read_u32::<LittleEndian>()?,
            protocol_version: input.read_u16::<LittleEndian>()?,
            world_name: read_string(&mut input)?,
        },
        other => return Err(MapError::UnsupportedSnapshotVersion(other)),
    };
    if header.content_signature != map.catalog().content_signature() {
        log::warn!(
            "OTCM map was created with a different content signature ({:#010x}, have {:#010x})",
            header.content_signature,
            map.catalog().content_signature()
        );
    }

    let data = bytes.get(usize::from(data_start)..).ok_or_else(|| {
        io::Error::new(io::ErrorKind::UnexpectedEof, "data offset past end of file")
    })?;
    let decompressed;
    let mut records = if flags.contains(SnapshotFlags::COMPRESSED) {
        let mut buf = Vec::new();
        FrameDecoder::new(data)
            .read_to_end(&mut buf)
            .map_err(|e| MapError::Compression(e.to_string()))?;
        decompressed = buf;
        decompressed.as_slice()
    } else {
        data
    };

    let mut tiles = 0;
    loop {
        // Any invalid position ends the data, not only the written terminator.
        let p = read_position(&mut records)?;
        if !p.is_valid() {
            break;
        }

        let mut stack: SmallVec<[Item; 8]> = SmallVec::new();
        loop {
            let id = records.read_u16::<LittleEndian>()?;
            if id == TILE_END {
                break;
            }
            let subtype = records.read_u8()?;
            let item = map.create_item(id).with_subtype(subtype);
            if item.is_valid() {
                stack.push(item);
            }
        }

        if let Some(tile) = map.get_or_create_tile(p) {
            for item in stack {
                tile.push_thing(item);
            }
            tiles += 1;
        }
    }

    Ok((header, tiles))
}

pub(crate) fn write(map: &Map, config: &SnapshotConfig) -> Result<Vec<u8>, MapError> {
    let flags = if config.compress {
        SnapshotFlags::COMPRESSED
    } else {
        SnapshotFlags::empty()
    };

    let mut out = Cursor::new(Vec::new());
    out.write_u32::<LittleEndian>(SIGNATURE)?;
    out.write_u16::<LittleEndian>(0)?; // data offset, patched below
    out.write_u16::<LittleEndian>(VERSION)?;
    out.write_u32::<LittleEndian>(flags.bits())?;

    write_string(&mut out, &config.description)?;
    out.write_u32::<LittleEndian>(map.catalog().content_signature())?;
    out.write_u16::<LittleEndian>(config.protocol_version)?;
    write_string(&mut out, &config.world_name)?;

    let data_start = out.position();
    let offset = u16::try_from(data_start).map_err(|_| MapError::SnapshotHeaderTooLarge(data_start))?;
    out.seek(SeekFrom::Start(4))?;
    out.write_u16::<LittleEndian>(offset)?;
    out.seek(SeekFrom::Start(data_start))?;

    let records = write_records(map)?;
    if flags.contains(SnapshotFlags::COMPRESSED) {
        let mut encoder = FrameEncoder::new(Vec::new());
        encoder.write_all(&records)?;
        let compressed = encoder
            .finish()
            .map_err(|e| MapError::Compression(e.to_string()))?;
        out.write_all(&compressed)?;
    } else {
        out.write_all(&records)?;
    }

    Ok(out.into_inner())
}

fn write_records(map: &Map) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    for tile in map.tiles.tiles() {
        write_position(&mut out, tile.position())?;
        for item in tile.things().iter().filter(|i| i.id() != TILE_END) {
            out.write_u16::<LittleEndian>(item.id())?;
            out.write_u8(item.subtype())?;
        }
        out.write_u16::<LittleEndian>(TILE_END)?;
    }
    write_position(&mut out, Position::INVALID)?;
    Ok(out)
}

fn read_position(input: &mut impl Read) -> io::Result<Position> {
    let x = input.read_u16::<LittleEndian>()?;
    let y = input.read_u16::<LittleEndian>()?;
    let z = input.read_u8()?;
    Ok(Position::new(x, y, z))
}

fn write_position(out: &mut impl Write, p: Position) -> io::Result<()> {
    out.write_u16::<LittleEndian>(p.x)?;
    out.write_u16::<LittleEndian>(p.y)?;
    out.write_u8(p.z)
}

fn read_string(input: &mut impl Read) -> io::Result<String> {
    let len = input.read_u16::<LittleEndian>()?;
    let mut bytes = vec![0; usize::from(len)];
    input.read_exact(&mut bytes)?;
    Ok(latin1_decode(&bytes))
}

fn write_string(out: &mut impl Write, s: &str) -> io::Result<()> {
    let bytes = latin1_encode(s);
    out.write_u16::<LittleEndian>(bytes.len() as u16)?;
    out.write_all(&bytes)
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
    use crate::item::fixture::*;
    use crate::StaticCatalog;

    use std::sync::Arc;

    fn catalog_with_signature(signature: u32) -> Arc<StaticCatalog> {
        let mut catalog = catalog();
        catalog.content_signature = signature;
        Arc::new(catalog)
    }

    fn sample_map() -> Map {
        let mut map = Map::new(catalog_with_signature(0xC0FFEE));
        let p = Position::new(1000, 1000, 7);
        map.add_thing(map.create_item(GRASS), p);
        map.add_thing(map.create_item(GOLD).with_subtype(100), p);
        map.add_thing(map.create_item(TORCH), p);
        map.add_thing(map.create_item(WALL), Position::new(1001, 1000, 7));
        map.add_thing(map.create_item(STONE_FLOOR), Position::new(5, 5, 0));
        map
    }

    fn stacks(map: &Map) -> Vec<(Position, Vec<(u16, u8)>)> {
        map.tiles
            .tiles()
            .map(|t| {
                let items = t.things().iter().map(|i| (i.id(), i.subtype())).collect();
                (t.position(), items)
            })
            .collect()
    }

    fn config(compress: bool) -> SnapshotConfig {
        SnapshotConfig {
            world_name: "Antica".to_string(),
            protocol_version: 860,
            compress,
            ..Default::default()
        }
    }

    #[test]
    fn save_then_load_reproduces_stacks() {
        let dir = tempfile::tempdir().unwrap();
        let original = sample_map();

        for compress in [false, true] {
            let path = dir.path().join(format!("snapshot-{}.otcm", compress));
            original.save_otcm(&path, &config(compress)).unwrap();

            let mut loaded = Map::new(catalog_with_signature(0xC0FFEE));
            assert_eq!(loaded.load_otcm(&path).unwrap(), 3);
            assert_eq!(stacks(&loaded), stacks(&original));
        }
    }

    #[test]
    fn header_fields() {
        let bytes = write(&sample_map(), &config(false)).unwrap();
        assert_eq!(&bytes[..4], b"OTCM");

        let mut loaded = Map::new(catalog_with_signature(1));
        let (header, tiles) = read(&mut loaded, &bytes).unwrap();
        assert_eq!(tiles, 3);
        assert_eq!(
            header,
            SnapshotHeader {
                flags: SnapshotFlags::empty(),
                description: "OTCM 1.0".to_string(),
                content_signature: 0xC0FFEE,
                protocol_version: 860,
                world_name: "Antica".to_string(),
            }
        );

        // Fixed header (12) + description (2 + 8) + signature (4) + protocol (2) + world name (2 + 6).
        let data_start = u16::from_le_bytes([bytes[4], bytes[5]]);
        assert_eq!(data_start, 36);
    }

    /// Bare version 1 header with empty strings.
    fn header_only() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u32::<LittleEndian>(SIGNATURE).unwrap();
        bytes.write_u16::<LittleEndian>(0).unwrap();
        bytes.write_u16::<LittleEndian>(VERSION).unwrap();
        bytes.write_u32::<LittleEndian>(0).unwrap();
        write_string(&mut bytes, "").unwrap();
        bytes.write_u32::<LittleEndian>(0).unwrap();
        bytes.write_u16::<LittleEndian>(0).unwrap();
        write_string(&mut bytes, "").unwrap();
        let data_start = bytes.len() as u16;
        bytes[4..6].copy_from_slice(&data_start.to_le_bytes());
        bytes
    }

    #[test]
    fn stack_order_is_file_order_and_unknown_items_are_dropped() {
        let mut bytes = header_only();
        let p = Position::new(7, 8, 9);
        write_position(&mut bytes, p).unwrap();
        // Ground on top of an item: replayed as is, not reordered.
        for (id, subtype) in [(GOLD, 5), (9999, 0), (GRASS, 0)] {
            bytes.write_u16::<LittleEndian>(id).unwrap();
            bytes.write_u8(subtype).unwrap();
        }
        bytes.write_u16::<LittleEndian>(TILE_END).unwrap();
        write_position(&mut bytes, Position::INVALID).unwrap();

        let mut map = Map::new(Arc::new(catalog()));
        read(&mut map, &bytes).unwrap();
        let ids: Vec<_> = map.tile(p).unwrap().things().iter().map(Item::id).collect();
        assert_eq!(ids, vec![GOLD, GRASS]);
    }

    #[test]
    fn any_invalid_position_ends_the_data() {
        let mut bytes = header_only();
        let p = Position::new(7, 8, 7);
        write_position(&mut bytes, p).unwrap();
        bytes.write_u16::<LittleEndian>(GRASS).unwrap();
        bytes.write_u8(0).unwrap();
        bytes.write_u16::<LittleEndian>(TILE_END).unwrap();
        // Floor 16 is out of range; nothing after it is read.
        write_position(&mut bytes, Position::new(7, 8, 16)).unwrap();
        bytes.extend_from_slice(&[0xAB; 5]);

        let mut map = Map::new(Arc::new(catalog()));
        let (_, tiles) = read(&mut map, &bytes).unwrap();
        assert_eq!(tiles, 1);
        assert_eq!(map.tiles.tile_count(), 1);
        assert!(map.tile(p).is_some());
    }

    #[test]
    fn rejects_foreign_files() {
        let mut map = Map::new(Arc::new(catalog()));
        assert!(matches!(
            read(&mut map, b"OTBM\0\0\0\0\0\0\0\0"),
            Err(MapError::InvalidSnapshotSignature(_))
        ));

        let mut bytes = write(&sample_map(), &config(false)).unwrap();
        bytes[6..8].copy_from_slice(&2u16.to_le_bytes());
        assert!(matches!(
            read(&mut map, &bytes),
            Err(MapError::UnsupportedSnapshotVersion(2))
        ));

        let bytes = write(&sample_map(), &config(false)).unwrap();
        assert!(matches!(
            read(&mut map, &bytes[..bytes.len() - 3]),
            Err(MapError::Io(_))
        ));
    }
}
