//! Picture assembly
//!
//! Graphics chunks are Huffman-compressed and start with a 4-byte
//! little-endian expanded length. Chunk 0 of the graphics file is the picture
//! table: one `(width, height)` pair of little-endian 16-bit fields per picture.

use byteorder::{ByteOrder, LittleEndian};

use crate::common::{alloc_buffer, PIC_LENGTH_PREFIX};
use crate::compression::{huffman_expand, HuffmanTree};
use crate::{Result, WolfError};

/// Dimensions of one picture as listed in the picture table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PicSize {
    /// Width in texels
    pub width: i16,
    /// Height in texels
    pub height: i16,
}

impl PicSize {
    /// Create a size entry
    pub const fn new(width: i16, height: i16) -> Self {
        Self { width, height }
    }

    /// Number of texels, treating negative dimensions as empty
    pub fn texel_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }
}

/// A decoded picture in the game's four-plane VGA order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// Width in texels
    pub width: i16,
    /// Height in texels
    pub height: i16,
    /// Texels, plane by plane
    pub texels: Vec<u8>,
}

impl Picture {
    /// Reorder the planar texels into row-major order
    ///
    /// Returns `None` when the width is negative or not a multiple of four, or
    /// when the texel count does not match the dimensions.
    pub fn to_linear(&self) -> Option<Vec<u8>> {
        let size = PicSize::new(self.width, self.height);
        if self.width < 0 || self.height < 0 || self.width % 4 != 0 {
            return None;
        }
        if self.texels.len() != size.texel_count() {
            return None;
        }
        let width = self.width as usize;
        let height = self.height as usize;
        let quarter = width / 4;

        let mut linear = Vec::with_capacity(self.texels.len());
        for y in 0..height {
            for x in 0..width {
                linear.push(self.texels[y * quarter + x / 4 + (x % 4) * quarter * height]);
            }
        }
        Some(linear)
    }

    /// Width and height as little-endian words followed by the planar texels
    pub fn to_vga_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.texels.len());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.texels);
        out
    }
}

/// Split a graphics chunk into its expanded length and Huffman payload
pub fn split_chunk(chunk: &[u8]) -> Result<(usize, &[u8])> {
    if chunk.len() < PIC_LENGTH_PREFIX {
        return Err(WolfError::TruncatedInput {
            needed: PIC_LENGTH_PREFIX,
            available: chunk.len(),
        });
    }
    let (prefix, payload) = chunk.split_at(PIC_LENGTH_PREFIX);
    Ok((LittleEndian::read_u32(prefix) as usize, payload))
}

/// Decode the picture table chunk into `picture_count` size entries
pub fn decode_picture_table(
    tree: &HuffmanTree,
    chunk: &[u8],
    picture_count: usize,
) -> Result<Vec<PicSize>> {
    let (expanded_length, payload) = split_chunk(chunk)?;
    let table_bytes = picture_count * 4;
    if expanded_length < table_bytes {
        return Err(WolfError::TruncatedInput {
            needed: table_bytes,
            available: expanded_length,
        });
    }

    log::debug!("Decoding picture table: {picture_count} entries from {} bytes", payload.len());

    let mut expanded = alloc_buffer(table_bytes)?;
    huffman_expand(payload, &mut expanded, table_bytes, tree)?;

    // Each field is low | (high << 8).
    Ok(expanded
        .chunks_exact(4)
        .map(|entry| {
            PicSize::new(
                LittleEndian::read_i16(&entry[0..2]),
                LittleEndian::read_i16(&entry[2..4]),
            )
        })
        .collect())
}

/// Decode one picture chunk whose dimensions come from the picture table
pub fn decompress_picture(tree: &HuffmanTree, chunk: &[u8], size: PicSize) -> Result<Picture> {
    let (expanded_length, payload) = split_chunk(chunk)?;
    let expected = size.texel_count();
    if expanded_length != expected {
        return Err(WolfError::PictureSizeMismatch {
            expected,
            actual: expanded_length,
        });
    }

    log::debug!(
        "Decoding {}x{} picture from {} bytes",
        size.width,
        size.height,
        payload.len()
    );

    let mut texels = alloc_buffer(expanded_length)?;
    huffman_expand(payload, &mut texels, expanded_length, tree)?;

    Ok(Picture {
        width: size.width,
        height: size.height,
        texels,
    })
}
