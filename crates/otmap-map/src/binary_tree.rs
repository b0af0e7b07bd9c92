//! Escape-coded node trees.
//!
//! A tree is serialized as a flat byte stream partitioned by three reserved marker bytes:
//!
//! - [`NODE_START`] opens a node; the next (possibly escaped) byte is the node's kind.
//! - [`NODE_END`] closes the innermost open node.
//! - [`ESCAPE`] makes the following byte literal, so payload bytes that collide with a marker survive the trip.
//!
//! Between its kind byte and its end marker a node holds raw payload bytes and nested child nodes in any interleaving. Decoding
//! concatenates the payload and keeps the children in encounter order, so the in-memory [`TreeNode`] is "kind, payload,
//! children" regardless of how the writer interleaved them.

mod reader;
mod writer;

pub use reader::{decode, NodeCursor};
pub use writer::TreeWriter;

pub const NODE_START: u8 = 0xFE;
pub const NODE_END: u8 = 0xFF;
pub const ESCAPE: u8 = 0xFD;

#[inline]
pub(crate) fn is_marker(byte: u8) -> bool {
    matches!(byte, NODE_START | NODE_END | ESCAPE)
}

/// A fully decoded node. Owns its children.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TreeNode {
    pub kind: u8,
    pub payload: Vec<u8>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(kind: u8) -> Self {
        Self {
            kind,
            payload: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A forward-only reader over this node's payload.
    pub fn cursor(&self) -> NodeCursor<'_> {
        NodeCursor::new(self)
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Serializes the tree rooted at `self`. [`decode`] is the exact inverse.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = TreeWriter::new();
        writer.write_node(self);
        writer.finish()
    }
}

/// Length-prefixed strings are stored as ISO-8859-1, which maps every byte to the char with the same code point.
pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Inverse of [`latin1_decode`]. Chars outside of Latin-1 become `?` and the result is capped at `u16::MAX` bytes.
pub(crate) fn latin1_encode(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .take(u16::MAX as usize)
        .collect()
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

    fn sample_tree() -> TreeNode {
        let mut leaf = TreeNode::new(NODE_END);
        leaf.payload = vec![ESCAPE, 1, NODE_START, NODE_END, 0];

        let mut middle = TreeNode::new(4);
        middle.payload = vec![0x10, 0x20, 7];
        middle.children = vec![leaf, TreeNode::new(5)];

        let mut root = TreeNode::new(0);
        root.payload = 3u32.to_le_bytes().to_vec();
        root.children = vec![middle, TreeNode::new(ESCAPE)];
        root
    }

    #[test]
    fn decode_inverts_encode() {
        let tree = sample_tree();
        let bytes = tree.encode();
        assert_eq!(decode(&bytes).unwrap(), tree);
    }

    #[test]
    fn markers_in_payload_are_escaped() {
        let mut node = TreeNode::new(1);
        node.payload = vec![NODE_START, 2, ESCAPE];
        assert_eq!(
            node.encode(),
            vec![NODE_START, 1, ESCAPE, NODE_START, 2, ESCAPE, ESCAPE, NODE_END]
        );
    }

    #[test]
    fn latin1_strings() {
        let s = "Thaïs";
        let bytes = latin1_encode(s);
        assert_eq!(bytes, vec![b'T', b'h', b'a', 0xEF, b's']);
        assert_eq!(latin1_decode(&bytes), s);
        assert_eq!(latin1_encode("a€b"), b"a?b".to_vec());
    }
}
