//! Huffman dictionary and expansion
//!
//! The dictionary is a flat array of 255 nodes. Each node holds one value per
//! branch: values up to 255 are literal bytes, larger values are
//! `256 + child_index`. Traversal starts at node 254.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use super::bits::BitstreamReader;
use crate::common::{HUFFMAN_DICT_BYTES, HUFFMAN_NODE_COUNT, HUFFMAN_ROOT};
use crate::{Result, WolfError};

/// One node of the Huffman dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HuffmanNode {
    /// Branch taken on a 0 bit
    pub node_0: u16,
    /// Branch taken on a 1 bit
    pub node_1: u16,
}

impl HuffmanNode {
    /// Create a node from its two branch values
    pub const fn new(node_0: u16, node_1: u16) -> Self {
        Self { node_0, node_1 }
    }

    #[inline]
    fn branch(&self, bit: bool) -> u16 {
        if bit {
            self.node_1
        } else {
            self.node_0
        }
    }
}

/// A complete, immutable Huffman dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: [HuffmanNode; HUFFMAN_NODE_COUNT],
}

impl HuffmanTree {
    /// Build a tree from its nodes
    pub fn from_nodes(nodes: [HuffmanNode; HUFFMAN_NODE_COUNT]) -> Self {
        Self { nodes }
    }

    /// Read 255 `(u16 LE, u16 LE)` pairs from a dictionary stream
    ///
    /// Anything after the 255th pair (dictionary files carry one unused
    /// trailing node) is left unread.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut nodes = [HuffmanNode::default(); HUFFMAN_NODE_COUNT];
        for node in nodes.iter_mut() {
            node.node_0 = reader.read_u16::<LittleEndian>()?;
            node.node_1 = reader.read_u16::<LittleEndian>()?;
        }
        log::debug!("Loaded Huffman dictionary of {HUFFMAN_NODE_COUNT} nodes");
        Ok(Self { nodes })
    }

    /// Parse a dictionary held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HUFFMAN_DICT_BYTES {
            return Err(WolfError::TruncatedInput {
                needed: HUFFMAN_DICT_BYTES,
                available: data.len(),
            });
        }
        Self::from_reader(data)
    }

    /// Node at `index`
    pub fn node(&self, index: usize) -> Option<&HuffmanNode> {
        self.nodes.get(index)
    }

    /// All nodes, root last
    pub fn nodes(&self) -> &[HuffmanNode; HUFFMAN_NODE_COUNT] {
        &self.nodes
    }

    /// The root node
    pub fn root(&self) -> &HuffmanNode {
        &self.nodes[HUFFMAN_ROOT]
    }
}

/// Expand a Huffman-coded stream into `destination[..length]`
///
/// # Arguments
/// * `source` - The compressed bytes, read LSB-first
/// * `destination` - Pre-allocated output, at least `length` bytes long
/// * `length` - Number of output bytes to produce
/// * `tree` - The dictionary shared by all chunks of one graphics file
///
/// Each output byte may take at most [`HUFFMAN_NODE_COUNT`] transitions; a
/// tree that loops or points outside the node array fails with
/// [`WolfError::MalformedTree`].
pub fn huffman_expand(
    source: &[u8],
    destination: &mut [u8],
    length: usize,
    tree: &HuffmanTree,
) -> Result<()> {
    if destination.len() < length {
        return Err(WolfError::NullBuffer {
            buffer: "Huffman destination",
        });
    }
    if length == 0 {
        return Ok(());
    }

    log::debug!("Huffman-expanding {} bytes to {} bytes", source.len(), length);

    let mut bits = BitstreamReader::new(source);
    for slot in destination[..length].iter_mut() {
        *slot = decode_symbol(&mut bits, tree)?;
    }

    log::trace!("consumed {} of {} input bits", bits.bits_consumed(), source.len() * 8);
    Ok(())
}

/// Walk from the root to a leaf and return its byte
#[inline]
fn decode_symbol(bits: &mut BitstreamReader<'_>, tree: &HuffmanTree) -> Result<u8> {
    let mut node = HUFFMAN_ROOT;
    for steps in 1..=HUFFMAN_NODE_COUNT {
        let value = tree.nodes[node].branch(bits.read_bit()?);
        if value < 256 {
            return Ok(value as u8);
        }
        node = (value - 256) as usize;
        if node >= HUFFMAN_NODE_COUNT {
            return Err(WolfError::MalformedTree { node, steps });
        }
    }
    Err(WolfError::MalformedTree {
        node,
        steps: HUFFMAN_NODE_COUNT,
    })
}
