//! Level map assembly
//!
//! A stored plane is Carmack-compressed. Its first word is the byte length of
//! the Carmack-expanded data, which in turn starts with the byte length of the
//! RLEW-expanded plane, followed by the RLEW stream itself.

use std::fmt;

use crate::common::{alloc_buffer, word_at, Word, MAP_PLANES};
use crate::compression::{carmack_expand, rlew_expand};
use crate::{Result, WolfError};

/// The three parallel grids that make up a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapPlane {
    /// Floors and walls
    Architecture = 0,
    /// Actors and decoration objects
    Objects = 1,
    /// Waypoints and triggers
    Logic = 2,
}

impl MapPlane {
    /// All planes in storage order
    pub const ALL: [MapPlane; MAP_PLANES] = [
        MapPlane::Architecture,
        MapPlane::Objects,
        MapPlane::Logic,
    ];

    /// Create a plane from its storage index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Storage index of this plane
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for MapPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapPlane::Architecture => "Architecture",
            MapPlane::Objects => "Objects",
            MapPlane::Logic => "Logic",
        };
        f.write_str(name)
    }
}

/// One fully expanded plane: `width * height` words, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPlane {
    /// Width of the level in tiles
    pub width: u16,
    /// Height of the level in tiles
    pub height: u16,
    /// Tile words, row-major
    pub words: Vec<Word>,
}

impl LevelPlane {
    /// Word at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<Word> {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        self.words.get(y * self.width as usize + x).copied()
    }

    /// Words as little-endian bytes, the extractor's raw plane output
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

/// Compressed chunks of one level as cut from the maps file
#[derive(Debug, Clone, Copy)]
pub struct LevelChunks<'a> {
    /// Compressed chunk per plane, in storage order
    pub planes: [&'a [u8]; MAP_PLANES],
    /// Declared Carmack-compressed byte length per plane
    pub carmack_lengths: [usize; MAP_PLANES],
    /// Width of the level in tiles
    pub width: u16,
    /// Height of the level in tiles
    pub height: u16,
}

/// A level whose planes were decoded independently
#[derive(Debug, Clone, Default)]
pub struct Level {
    /// Decoded planes; `None` where decoding failed
    pub planes: [Option<LevelPlane>; MAP_PLANES],
}

impl Level {
    /// Decoded plane, if it could be expanded
    pub fn plane(&self, plane: MapPlane) -> Option<&LevelPlane> {
        self.planes[plane.index()].as_ref()
    }

    /// Whether every plane decoded
    pub fn is_complete(&self) -> bool {
        self.planes.iter().all(Option::is_some)
    }
}

/// Expand one stored plane
///
/// # Arguments
/// * `chunk` - The stored plane, starting at its Carmack length prefix
/// * `carmack_len` - Declared compressed length in bytes, prefix included
/// * `width`, `height` - Level dimensions; the result has `width * height` words
/// * `rlew_tag` - RLEW tag from the map atlas
pub fn decompress_map_plane(
    chunk: &[u8],
    carmack_len: usize,
    width: u16,
    height: u16,
    rlew_tag: Word,
) -> Result<LevelPlane> {
    if chunk.len() < carmack_len {
        return Err(WolfError::TruncatedInput {
            needed: carmack_len,
            available: chunk.len(),
        });
    }
    let chunk = &chunk[..carmack_len];
    let plane_words = width as usize * height as usize;

    // Stage 1: Carmack, sized by the chunk's own prefix.
    let expanded_bytes = word_at(chunk, 0).ok_or(WolfError::TruncatedInput {
        needed: 2,
        available: chunk.len(),
    })? as usize;
    let rlew_words = expanded_bytes / 2;

    log::debug!(
        "Map plane {width}x{height}: {carmack_len} Carmack bytes -> {rlew_words} RLEW words"
    );

    let mut rlew_buffer = alloc_buffer(rlew_words)?;
    carmack_expand(&chunk[2..], &mut rlew_buffer, rlew_words)?;

    // Stage 2: RLEW, skipping the plane length prefix.
    let (&declared_bytes, payload) = rlew_buffer.split_first().ok_or(WolfError::TruncatedInput {
        needed: 1,
        available: 0,
    })?;
    if declared_bytes as usize != plane_words * 2 {
        log::warn!(
            "Map plane declares {declared_bytes} bytes, {width}x{height} needs {}",
            plane_words * 2
        );
    }

    let mut words = alloc_buffer(plane_words)?;
    rlew_expand(payload, &mut words, plane_words, rlew_tag)?;

    Ok(LevelPlane {
        width,
        height,
        words,
    })
}

/// Expand all planes of a level, keeping going past planes that fail
pub fn decompress_level(chunks: &LevelChunks<'_>, rlew_tag: Word) -> Level {
    let mut level = Level::default();
    for plane in MapPlane::ALL {
        let i = plane.index();
        match decompress_map_plane(
            chunks.planes[i],
            chunks.carmack_lengths[i],
            chunks.width,
            chunks.height,
            rlew_tag,
        ) {
            Ok(decoded) => level.planes[i] = Some(decoded),
            Err(e) => log::warn!("Could not decode {plane} plane: {e}"),
        }
    }
    level
}
