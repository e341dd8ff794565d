//! Common types and constants for the Wolfenstein 3D decoders
//!
//! This module defines the error type, the shared constants of the Carmack,
//! RLEW and Huffman formats, and the game version table used by the
//! picture and map assemblers.

use std::fmt;

use thiserror::Error;

/// A 16-bit little-endian word, the unit of Carmack and RLEW data
pub type Word = u16;

/// Carmack flag byte marking a near back-reference (1-byte offset)
pub const NEAR_TAG: u8 = 0xA7;

/// Carmack flag byte marking a far back-reference (2-byte absolute offset)
pub const FAR_TAG: u8 = 0xA8;

/// Number of nodes in a Huffman dictionary
pub const HUFFMAN_NODE_COUNT: usize = 255;

/// Index of the Huffman tree root
pub const HUFFMAN_ROOT: usize = 254;

/// Size in bytes of the 255 node pairs read from a dictionary file
pub const HUFFMAN_DICT_BYTES: usize = HUFFMAN_NODE_COUNT * 4;

/// Number of planes that make up one level
pub const MAP_PLANES: usize = 3;

/// Size of the little-endian length prefix of a picture chunk
pub const PIC_LENGTH_PREFIX: usize = 4;

/// Error type for decoding operations
#[derive(Debug, Error)]
pub enum WolfError {
    /// A required buffer or tree is absent, or too small for the requested length
    #[error("Missing or undersized buffer: {buffer}")]
    NullBuffer {
        /// Which buffer was rejected
        buffer: &'static str,
    },

    /// The backing store for an output buffer could not be obtained
    #[error("Could not allocate {requested} elements for an output buffer")]
    AllocationFailure {
        /// Number of elements requested
        requested: usize,
    },

    /// Huffman traversal left the tree or did not reach a leaf in time
    #[error("Malformed Huffman tree at node {node} after {steps} steps")]
    MalformedTree {
        /// Node index being visited when traversal was aborted
        node: usize,
        /// Transitions taken since the last emitted byte
        steps: usize,
    },

    /// The source ran out before the declared output length was produced
    #[error("Truncated input: needed {needed} more units, {available} available")]
    TruncatedInput {
        /// Units (bytes, words or bits) the decoder needed
        needed: usize,
        /// Units that were left in the source
        available: usize,
    },

    /// A Carmack back-reference points at data that has not been written yet
    #[error("Invalid back-reference at word {position}: {count} words from word {from}")]
    InvalidBackReference {
        /// Write position when the token was read
        position: usize,
        /// Word index the copy would start from
        from: usize,
        /// Number of words the token asked for
        count: usize,
    },

    /// A copy or run would write past the declared output length
    #[error("Output overrun at word {position}: {count} words requested, {remaining} remaining")]
    OutputOverrun {
        /// Write position when the token was read
        position: usize,
        /// Number of words the token asked for
        count: usize,
        /// Words left before the declared length is reached
        remaining: usize,
    },

    /// A picture's expanded length disagrees with its table entry
    #[error("Picture size mismatch: table says {expected} texels, chunk holds {actual}")]
    PictureSizeMismatch {
        /// width * height from the picture table
        expected: usize,
        /// Expanded length stored in the chunk prefix
        actual: usize,
    },

    /// The magic number is not covered by the picture table
    #[error("Unknown picture: {magic}")]
    UnknownPicture {
        /// Requested magic number
        magic: u32,
    },

    /// The data file extension does not name a supported game version
    #[error("Unknown game version: {0:?} (expected WL1, WL3 or WL6)")]
    UnknownGameVersion(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, WolfError>;

/// Released editions of the game, identified by their data file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameVersion {
    /// Shareware episode
    WL1,
    /// Original three-episode registered release
    WL3,
    /// Six-episode registered release
    #[default]
    WL6,
}

impl GameVersion {
    /// All supported versions, in detection order
    pub const ALL: [GameVersion; 3] = [GameVersion::WL1, GameVersion::WL3, GameVersion::WL6];

    /// Data file extension used by this version
    pub fn extension(&self) -> &'static str {
        match self {
            GameVersion::WL1 => "WL1",
            GameVersion::WL3 => "WL3",
            GameVersion::WL6 => "WL6",
        }
    }

    /// Parse a data file extension, ignoring case and a leading dot
    pub fn from_extension(ext: &str) -> Result<Self> {
        let trimmed = ext.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|v| v.extension().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| WolfError::UnknownGameVersion(ext.to_string()))
    }

    /// Chunk index of the first picture in the graphics file
    pub fn pic_start(&self) -> u32 {
        // Same layout for every edition we know of.
        3
    }

    /// Number of pictures listed in the picture table
    pub fn pic_count(&self) -> usize {
        132
    }

    /// Chunk index of the last picture
    pub fn pic_end(&self) -> u32 {
        self.pic_start() + self.pic_count() as u32 - 1
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Allocate a zeroed buffer of exactly `len` elements, reporting failure
/// instead of aborting the process.
pub(crate) fn alloc_buffer<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| WolfError::AllocationFailure { requested: len })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// Read a little-endian word at byte `pos`, if both bytes are present
#[inline]
pub(crate) fn word_at(bytes: &[u8], pos: usize) -> Option<Word> {
    let lo = *bytes.get(pos)?;
    let hi = *bytes.get(pos + 1)?;
    Some(Word::from_le_bytes([lo, hi]))
}
