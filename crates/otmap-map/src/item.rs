use crate::binary_tree::{NodeCursor, TreeWriter};
use crate::otbm::{attr, node};
use crate::MapError;

use bitflags::bitflags;
use otmap_core::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

bitflags! {
    /// Per-type properties the map codecs care about. Everything else about an item type lives in the external catalog.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct ItemFlags: u16 {
        const GROUND = 1 << 0;
        const CONTAINER = 1 << 1;
        const DEPOT = 1 << 2;
        const DOOR = 1 << 3;
        const TELEPORT = 1 << 4;
        const MOVEABLE = 1 << 5;
        const STACKABLE = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct ItemType {
    #[serde(default)]
    pub flags: ItemFlags,
    /// Index into the 6×6×6 minimap palette, if the item shows on the minimap.
    #[serde(default)]
    pub minimap_color: Option<u8>,
}

impl ItemType {
    pub const fn new(flags: ItemFlags) -> Self {
        Self {
            flags,
            minimap_color: None,
        }
    }

    pub const fn with_minimap_color(mut self, color: u8) -> Self {
        self.minimap_color = Some(color);
        self
    }
}

/// Compatibility markers of the item attribute schema, independent of any map format version.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// The item type catalog consumed by the map codecs.
pub trait ItemCatalog: Send + Sync {
    fn schema_version(&self) -> SchemaVersion;

    /// Fingerprint of the client content the catalog was built from. Stored in snapshots.
    fn content_signature(&self) -> u32;

    fn item_type(&self, id: u16) -> Option<ItemType>;

    /// Items with ids unknown to the catalog are still created, but report `!is_valid()`.
    fn create_item(&self, id: u16) -> Item {
        Item::new(id, self.item_type(id))
    }
}

/// An in-memory catalog, usually read from a RON file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StaticCatalog {
    pub schema: SchemaVersion,
    #[serde(default)]
    pub content_signature: u32,
    #[serde(default)]
    pub items: BTreeMap<u16, ItemType>,
}

impl StaticCatalog {
    pub fn new(schema: SchemaVersion) -> Self {
        Self {
            schema,
            content_signature: 0,
            items: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, id: u16, ty: ItemType) -> Self {
        self.items.insert(id, ty);
        self
    }
}

impl ItemCatalog for StaticCatalog {
    fn schema_version(&self) -> SchemaVersion {
        self.schema
    }

    fn content_signature(&self) -> u32 {
        self.content_signature
    }

    fn item_type(&self, id: u16) -> Option<ItemType> {
        self.items.get(&id).copied()
    }
}

/// Optional per-instance attributes. Only attributes that are set get written.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ItemAttributes {
    pub charges: Option<u16>,
    pub action_id: Option<u16>,
    pub unique_id: Option<u16>,
    pub text: Option<String>,
    pub description: Option<String>,
    pub teleport_destination: Option<Position>,
    pub depot_id: Option<u16>,
    pub house_door_id: Option<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    id: u16,
    ty: Option<ItemType>,
    /// Stack count, fluid type or rune charges depending on the item type. Zero means unset.
    subtype: u8,
    attributes: ItemAttributes,
    contents: Vec<Item>,
}

impl Item {
    pub fn new(id: u16, ty: Option<ItemType>) -> Self {
        Self {
            id,
            ty,
            subtype: 0,
            attributes: ItemAttributes::default(),
            contents: Vec::new(),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// False when the catalog did not know this item's id.
    pub fn is_valid(&self) -> bool {
        self.ty.is_some()
    }

    pub fn flags(&self) -> ItemFlags {
        self.ty.map(|t| t.flags).unwrap_or_default()
    }

    pub fn minimap_color(&self) -> Option<u8> {
        self.ty.and_then(|t| t.minimap_color)
    }

    pub fn is_ground(&self) -> bool {
        self.flags().contains(ItemFlags::GROUND)
    }

    pub fn is_container(&self) -> bool {
        self.flags().contains(ItemFlags::CONTAINER)
    }

    pub fn is_depot(&self) -> bool {
        self.flags().contains(ItemFlags::DEPOT)
    }

    pub fn is_door(&self) -> bool {
        self.flags().contains(ItemFlags::DOOR)
    }

    pub fn is_teleport(&self) -> bool {
        self.flags().contains(ItemFlags::TELEPORT)
    }

    pub fn is_moveable(&self) -> bool {
        self.flags().contains(ItemFlags::MOVEABLE)
    }

    /// Items that cannot be stored as a bare id and must serialize their own node.
    pub fn is_complex(&self) -> bool {
        self.flags().intersects(
            ItemFlags::CONTAINER | ItemFlags::DEPOT | ItemFlags::DOOR | ItemFlags::TELEPORT,
        )
    }

    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    pub fn with_subtype(mut self, subtype: u8) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn attributes(&self) -> &ItemAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut ItemAttributes {
        &mut self.attributes
    }

    pub fn contents(&self) -> &[Item] {
        &self.contents
    }

    pub fn add_content(&mut self, item: Item) {
        self.contents.push(item);
    }

    /// Reads attribute records from the rest of an item node's payload. A zero attribute byte ends the list early.
    pub fn deserialize_attributes(&mut self, cursor: &mut NodeCursor) -> Result<(), MapError> {
        while cursor.can_read() {
            let attribute = cursor.read_u8()?;
            let a = &mut self.attributes;
            match attribute {
                0 => break,
                attr::COUNT | attr::RUNE_CHARGES => self.subtype = cursor.read_u8()?,
                attr::CHARGES => a.charges = Some(cursor.read_u16()?),
                attr::ACTION_ID => a.action_id = Some(cursor.read_u16()?),
                attr::UNIQUE_ID => a.unique_id = Some(cursor.read_u16()?),
                attr::TEXT => a.text = Some(cursor.read_string()?),
                attr::DESC => a.description = Some(cursor.read_string()?),
                attr::TELE_DEST => a.teleport_destination = Some(cursor.read_position()?),
                attr::DEPOT_ID => a.depot_id = Some(cursor.read_u16()?),
                attr::HOUSE_DOOR_ID => a.house_door_id = Some(cursor.read_u8()?),
                other => return Err(MapError::InvalidItemAttribute(other)),
            }
        }
        Ok(())
    }

    /// Writes this item as an item node, including its container contents as child nodes.
    pub fn serialize(&self, w: &mut TreeWriter) {
        w.start_node(node::ITEM);
        w.add_u16(self.id);

        if self.subtype != 0 {
            w.add_u8(attr::COUNT);
            w.add_u8(self.subtype);
        }
        let a = &self.attributes;
        if let Some(charges) = a.charges {
            w.add_u8(attr::CHARGES);
            w.add_u16(charges);
        }
        if let Some(dest) = a.teleport_destination {
            w.add_u8(attr::TELE_DEST);
            w.add_position(dest);
        }
        if let Some(depot_id) = a.depot_id {
            w.add_u8(attr::DEPOT_ID);
            w.add_u16(depot_id);
        }
        if let Some(door_id) = a.house_door_id {
            w.add_u8(attr::HOUSE_DOOR_ID);
            w.add_u8(door_id);
        }
        if let Some(action_id) = a.action_id {
            w.add_u8(attr::ACTION_ID);
            w.add_u16(action_id);
        }
        if let Some(unique_id) = a.unique_id {
            w.add_u8(attr::UNIQUE_ID);
            w.add_u16(unique_id);
        }
        if let Some(text) = a.text.as_deref() {
            w.add_u8(attr::TEXT);
            w.add_string(text);
        }
        if let Some(description) = a.description.as_deref() {
            w.add_u8(attr::DESC);
            w.add_string(description);
        }

        for child in self.contents.iter() {
            child.serialize(w);
        }
        w.end_node();
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
    use super::fixture::*;
    use super::*;
    use crate::binary_tree::decode;

    #[test]
    fn unknown_ids_are_invalid() {
        let catalog = catalog();
        assert!(catalog.create_item(GOLD).is_valid());
        let unknown = catalog.create_item(9999);
        assert!(!unknown.is_valid());
        assert_eq!(unknown.flags(), ItemFlags::empty());
    }

    #[test]
    fn complex_items() {
        let catalog = catalog();
        assert!(catalog.create_item(BACKPACK).is_complex());
        assert!(catalog.create_item(DEPOT_CHEST).is_complex());
        assert!(catalog.create_item(DOOR).is_complex());
        assert!(catalog.create_item(MAGIC_FORCEFIELD).is_complex());
        assert!(!catalog.create_item(GRASS).is_complex());
        assert!(!catalog.create_item(GOLD).is_complex());
    }

    #[test]
    fn serialized_item_reads_back() {
        let catalog = catalog();
        let mut door = catalog.create_item(DOOR);
        {
            let a = door.attributes_mut();
            a.house_door_id = Some(3);
            a.action_id = Some(1000);
            a.text = Some("Closed for business".to_string());
        }
        let mut teleport = catalog.create_item(MAGIC_FORCEFIELD);
        teleport.attributes_mut().teleport_destination = Some(Position::new(1000, 1000, 7));

        for item in [door, teleport, catalog.create_item(GOLD).with_subtype(37)] {
            let mut w = TreeWriter::new();
            item.serialize(&mut w);
            let node = decode(&w.finish()).unwrap();

            let mut cursor = node.cursor();
            assert_eq!(cursor.kind(), node::ITEM);
            let mut read = catalog.create_item(cursor.read_u16().unwrap());
            read.deserialize_attributes(&mut cursor).unwrap();
            assert_eq!(read, item);
        }
    }

    #[test]
    fn unknown_item_attribute_is_an_error() {
        let catalog = catalog();
        let mut w = TreeWriter::new();
        w.start_node(node::ITEM);
        w.add_u16(GOLD);
        w.add_u8(99);
        w.end_node();
        let node = decode(&w.finish()).unwrap();

        let mut cursor = node.cursor();
        let mut item = catalog.create_item(cursor.read_u16().unwrap());
        assert!(matches!(
            item.deserialize_attributes(&mut cursor),
            Err(MapError::InvalidItemAttribute(99))
        ));
    }

    #[test]
    fn catalog_from_ron() {
        let text = r#"(
            schema: (major: 3, minor: 57),
            content_signature: 1234,
            items: {
                100: (flags: "GROUND", minimap_color: Some(24)),
                200: (flags: "CONTAINER | MOVEABLE"),
            },
        )"#;
        let catalog: StaticCatalog = ron::de::from_str(text).unwrap();
        assert_eq!(catalog.schema_version(), SchemaVersion::new(3, 57));
        assert_eq!(catalog.content_signature(), 1234);
        assert!(catalog.create_item(100).is_ground());
        assert_eq!(catalog.create_item(100).minimap_color(), Some(24));
        assert!(catalog.create_item(200).is_container());
    }
}
