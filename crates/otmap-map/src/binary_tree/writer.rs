use super::{is_marker, latin1_encode, TreeNode, ESCAPE, NODE_END, NODE_START};

use otmap_core::Position;

/// Streams a tree into a byte buffer.
///
/// Nodes are opened with [`start_node`](Self::start_node) and closed with [`end_node`](Self::end_node) in LIFO order. Payload
/// writes always go to the innermost open node. Unbalanced use is a bug in the caller and panics: closing a node that was never
/// opened panics immediately, and [`finish`](Self::finish) panics if any node is still open.
#[derive(Debug, Default)]
pub struct TreeWriter {
    bytes: Vec<u8>,
    depth: usize,
}

impl TreeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues writing after `prefix`, which is emitted verbatim (no escaping).
    pub fn with_prefix(prefix: Vec<u8>) -> Self {
        Self {
            bytes: prefix,
            depth: 0,
        }
    }

    pub fn start_node(&mut self, kind: u8) {
        self.bytes.push(NODE_START);
        self.depth += 1;
        self.write_escaped(&[kind]);
    }

    pub fn end_node(&mut self) {
        assert!(self.depth > 0, "BUG: end_node without a matching start_node");
        self.bytes.push(NODE_END);
        self.depth -= 1;
    }

    fn write_escaped(&mut self, data: &[u8]) {
        debug_assert!(self.depth > 0, "BUG: payload written outside of any node");
        for &byte in data {
            if is_marker(byte) {
                self.bytes.push(ESCAPE);
            }
            self.bytes.push(byte);
        }
    }

    pub fn add_u8(&mut self, value: u8) {
        self.write_escaped(&[value]);
    }

    pub fn add_u16(&mut self, value: u16) {
        self.write_escaped(&value.to_le_bytes());
    }

    pub fn add_u32(&mut self, value: u32) {
        self.write_escaped(&value.to_le_bytes());
    }

    pub fn add_string(&mut self, value: &str) {
        let bytes = latin1_encode(value);
        self.add_u16(bytes.len() as u16);
        self.write_escaped(&bytes);
    }

    pub fn add_position(&mut self, p: Position) {
        self.add_u16(p.x);
        self.add_u16(p.y);
        self.add_u8(p.z);
    }

    pub fn add_offset(&mut self, x: u8, y: u8) {
        self.add_u8(x);
        self.add_u8(y);
    }

    /// Writes an in-memory node (and all of its descendants) as a child of the current node, or as a root.
    pub fn write_node(&mut self, node: &TreeNode) {
        self.start_node(node.kind);
        self.write_escaped(&node.payload);
        for child in node.children.iter() {
            self.write_node(child);
        }
        self.end_node();
    }

    pub fn finish(self) -> Vec<u8> {
        assert_eq!(self.depth, 0, "BUG: {} tree node(s) left open", self.depth);
        self.bytes
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
    use crate::binary_tree::decode;

    #[test]
    fn streamed_tree_decodes_to_same_structure() {
        let mut w = TreeWriter::new();
        w.start_node(0);
        w.add_u32(0xFDFE_FF01);
        w.start_node(2);
        w.add_string("desc");
        w.start_node(4);
        w.add_position(Position::new(0xFEFF, 0x00FD, 7));
        w.end_node();
        w.end_node();
        w.start_node(12);
        w.end_node();
        w.end_node();
        let bytes = w.finish();

        let root = decode(&bytes).unwrap();
        assert_eq!(root.kind, 0);
        assert_eq!(root.cursor().read_u32().unwrap(), 0xFDFE_FF01);
        assert_eq!(root.children.len(), 2);

        let map_data = &root.children[0];
        assert_eq!(map_data.kind, 2);
        assert_eq!(map_data.cursor().read_string().unwrap(), "desc");
        let area = &map_data.children[0];
        assert_eq!(
            area.cursor().read_position().unwrap(),
            Position::new(0xFEFF, 0x00FD, 7)
        );
        assert_eq!(root.children[1], TreeNode::new(12));

        // Re-encoding the decoded tree reproduces the stream.
        assert_eq!(root.encode(), bytes);
    }

    #[test]
    fn prefix_is_not_escaped() {
        let mut w = TreeWriter::with_prefix(vec![0xFF; 4]);
        w.start_node(0);
        w.end_node();
        assert_eq!(w.finish(), vec![0xFF, 0xFF, 0xFF, 0xFF, NODE_START, 0, NODE_END]);
    }

    #[test]
    #[should_panic]
    fn unclosed_node_panics() {
        let mut w = TreeWriter::new();
        w.start_node(0);
        w.finish();
    }

    #[test]
    #[should_panic]
    fn extra_end_node_panics() {
        let mut w = TreeWriter::new();
        w.end_node();
    }
}
