//! wolfx - Rust decoders for Wolfenstein 3D data files
//!
//! This crate expands the compressed assets of the game's data files: level
//! maps (Carmack compression wrapped around RLEW) and VGA graphics (Huffman
//! coding against a per-file dictionary). Locating chunks inside the data files
//! is left to the caller; every decoder works on an in-memory chunk.
//!
//! # Features
//!
//! - RLEW, Carmack and Huffman expansion into caller-provided buffers
//! - Bounds-checked back-references and bounded Huffman traversal
//! - Two-stage map plane assembly and full level assembly
//! - Picture table decoding and picture assembly, with planar-to-linear reordering
//! - An [`AssetSource`] session owning the dictionary and picture table
//!
//! # Example
//!
//! ```no_run
//! use wolfx::{AssetSource, GameVersion};
//! use std::fs::File;
//!
//! let mut source = AssetSource::new(GameVersion::from_extension("WL6")?);
//! source.load_huffman_tree(File::open("VGADICT.WL6")?)?;
//!
//! // Chunks cut out of VGAGRAPH.WL6 by the caller
//! let table_chunk = std::fs::read("chunk000.bin")?;
//! source.load_picture_table(&table_chunk)?;
//!
//! let chunk = std::fs::read("chunk003.bin")?;
//! let picture = source.decompress_picture(3, &chunk)?;
//! println!("{}x{}", picture.width, picture.height);
//!
//! // Map planes use the session's RLEW tag
//! let plane_chunk = std::fs::read("level00-plane0.bin")?;
//! let plane = source.decompress_map_plane(&plane_chunk, plane_chunk.len(), 64, 64)?;
//! assert_eq!(plane.words.len(), 64 * 64);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod common;
pub mod compression;
pub mod error;
pub mod map;
pub mod pic;
pub mod source;

// Re-export commonly used types
pub use common::{
    GameVersion, Result, WolfError, Word, FAR_TAG, HUFFMAN_NODE_COUNT, HUFFMAN_ROOT, MAP_PLANES,
    NEAR_TAG,
};
pub use compression::{
    carmack_expand, huffman_expand, rlew_expand, BitstreamReader, HuffmanNode, HuffmanTree,
};
pub use map::{decompress_level, decompress_map_plane, Level, LevelChunks, LevelPlane, MapPlane};
pub use pic::{decode_picture_table, decompress_picture, PicSize, Picture};
pub use source::{AssetSource, PictureBatch, DEFAULT_RLEW_TAG};

// Convenience functions

/// Carmack-expand a byte stream into `length` words
///
/// # Arguments
/// * `data` - The compressed token stream
/// * `length` - Number of words to produce
pub fn carmack_bytes(data: &[u8], length: usize) -> Result<Vec<Word>> {
    compression::carmack_expand_to_vec(data, length)
}

/// RLEW-expand a little-endian word stream given as bytes
///
/// A trailing odd byte is ignored.
pub fn rlew_bytes(data: &[u8], length: usize, rlew_tag: Word) -> Result<Vec<Word>> {
    let words: Vec<Word> = data
        .chunks_exact(2)
        .map(|pair| Word::from_le_bytes([pair[0], pair[1]]))
        .collect();
    compression::rlew_expand_to_vec(&words, length, rlew_tag)
}

/// Huffman-expand a byte stream into `length` bytes
pub fn huffman_bytes(data: &[u8], length: usize, tree: &HuffmanTree) -> Result<Vec<u8>> {
    compression::huffman_expand_to_vec(data, length, tree)
}
