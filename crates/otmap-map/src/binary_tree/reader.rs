use super::{latin1_decode, TreeNode, ESCAPE, NODE_END, NODE_START};
use crate::TreeError;

use byteorder::{ByteOrder, LittleEndian};
use otmap_core::Position;

/// Decodes the tree whose start marker is the first byte of `bytes`.
///
/// Bytes after the root's end marker are ignored. Nesting depth is limited only by memory; the open nodes are kept on an
/// explicit stack rather than the call stack.
pub fn decode(bytes: &[u8]) -> Result<TreeNode, TreeError> {
    let mut iter = bytes.iter().copied();

    match iter.next() {
        Some(NODE_START) => {}
        Some(other) => return Err(TreeError::MissingNodeStart(other)),
        None => return Err(TreeError::Truncated { open_nodes: 0 }),
    }

    let mut open = vec![TreeNode::new(read_kind(&mut iter, 1)?)];

    while let Some(byte) = iter.next() {
        match byte {
            NODE_START => {
                let kind = read_kind(&mut iter, open.len() + 1)?;
                open.push(TreeNode::new(kind));
            }
            NODE_END => {
                // Nonempty by the loop invariant: the root is popped last and returns.
                let node = open.pop().ok_or(TreeError::Truncated { open_nodes: 0 })?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            ESCAPE => {
                let literal = iter.next().ok_or(TreeError::Truncated {
                    open_nodes: open.len(),
                })?;
                push_payload(&mut open, literal)?;
            }
            other => push_payload(&mut open, other)?,
        }
    }

    Err(TreeError::Truncated {
        open_nodes: open.len(),
    })
}

fn read_kind(iter: &mut impl Iterator<Item = u8>, open_nodes: usize) -> Result<u8, TreeError> {
    match iter.next() {
        Some(ESCAPE) => iter.next().ok_or(TreeError::Truncated { open_nodes }),
        Some(marker @ (NODE_START | NODE_END)) => Err(TreeError::UnexpectedMarker(marker)),
        Some(kind) => Ok(kind),
        None => Err(TreeError::MissingNodeKind),
    }
}

fn push_payload(open: &mut [TreeNode], byte: u8) -> Result<(), TreeError> {
    let node = open.last_mut().ok_or(TreeError::Truncated { open_nodes: 0 })?;
    node.payload.push(byte);
    Ok(())
}

/// Forward-only reader over one node's payload. Reading past the end of the payload is an error, never a short read.
#[derive(Clone, Debug)]
pub struct NodeCursor<'a> {
    node: &'a TreeNode,
    remaining: &'a [u8],
}

impl<'a> NodeCursor<'a> {
    pub fn new(node: &'a TreeNode) -> Self {
        Self {
            node,
            remaining: &node.payload,
        }
    }

    pub fn kind(&self) -> u8 {
        self.node.kind
    }

    pub fn children(&self) -> &'a [TreeNode] {
        &self.node.children
    }

    pub fn has_children(&self) -> bool {
        self.node.has_children()
    }

    /// True while unread payload bytes remain.
    pub fn can_read(&self) -> bool {
        !self.remaining.is_empty()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TreeError> {
        if n > self.remaining.len() {
            return Err(TreeError::ReadPastEnd {
                kind: self.node.kind,
                wanted: n,
                remaining: self.remaining.len(),
            });
        }
        let (head, tail) = self.remaining.split_at(n);
        self.remaining = tail;
        Ok(head)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), TreeError> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, TreeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, TreeError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, TreeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// A u16 byte length followed by that many Latin-1 bytes.
    pub fn read_string(&mut self) -> Result<String, TreeError> {
        let len = self.read_u16()? as usize;
        Ok(latin1_decode(self.take(len)?))
    }

    /// `x: u16, y: u16, z: u8`.
    pub fn read_position(&mut self) -> Result<Position, TreeError> {
        let x = self.read_u16()?;
        let y = self.read_u16()?;
        let z = self.read_u8()?;
        Ok(Position::new(x, y, z))
    }

    /// A tile's offset inside its area: `x: u8, y: u8`.
    pub fn read_offset(&mut self) -> Result<(u8, u8), TreeError> {
        Ok((self.read_u8()?, self.read_u8()?))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
