//! Decoding session for one set of game data files
//!
//! [`AssetSource`] owns everything the decoders share between calls: the game
//! version, the map atlas RLEW tag, the Huffman dictionary of the graphics
//! file and the picture-size table decoded with it. Loading replaces the
//! cached value outright, so a decode never sees a half-loaded tree.

use std::io::Read;

use crate::common::{GameVersion, Word};
use crate::compression::HuffmanTree;
use crate::map::{self, Level, LevelChunks, LevelPlane};
use crate::pic::{self, PicSize, Picture};
use crate::{Result, WolfError};

/// RLEW tag found in the map atlas header of every released edition
pub const DEFAULT_RLEW_TAG: Word = 0xABCD;

/// Outcome of a batch picture extraction
#[derive(Debug, Default)]
pub struct PictureBatch {
    /// Successfully decoded pictures with their magic numbers
    pub pictures: Vec<(u32, Picture)>,
    /// Magic numbers that could not be decoded
    pub failed: Vec<u32>,
}

impl PictureBatch {
    /// Whether every requested picture decoded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Session context passed to every decode call
#[derive(Debug, Clone)]
pub struct AssetSource {
    version: GameVersion,
    rlew_tag: Word,
    tree: Option<HuffmanTree>,
    pic_table: Option<Vec<PicSize>>,
}

impl Default for AssetSource {
    fn default() -> Self {
        Self::new(GameVersion::default())
    }
}

impl AssetSource {
    /// Create a session for `version` with the standard RLEW tag
    pub fn new(version: GameVersion) -> Self {
        Self {
            version,
            rlew_tag: DEFAULT_RLEW_TAG,
            tree: None,
            pic_table: None,
        }
    }

    /// Use the RLEW tag read from the map atlas header
    pub fn with_rlew_tag(mut self, rlew_tag: Word) -> Self {
        self.rlew_tag = rlew_tag;
        self
    }

    /// Game version of this session
    pub fn version(&self) -> GameVersion {
        self.version
    }

    /// RLEW tag used for map planes
    pub fn rlew_tag(&self) -> Word {
        self.rlew_tag
    }

    /// Load the graphics dictionary, replacing any previously loaded tree
    ///
    /// The picture table was decoded with the old tree, so it is dropped too.
    pub fn load_huffman_tree<R: Read>(&mut self, reader: R) -> Result<()> {
        let tree = HuffmanTree::from_reader(reader)?;
        if self.tree.replace(tree).is_some() {
            log::debug!("Replaced Huffman dictionary for {}", self.version);
            self.pic_table = None;
        }
        Ok(())
    }

    /// Install an already-built tree
    pub fn set_huffman_tree(&mut self, tree: HuffmanTree) {
        self.tree = Some(tree);
        self.pic_table = None;
    }

    /// Forget the cached tree and picture table
    pub fn invalidate_tree(&mut self) {
        self.tree = None;
        self.pic_table = None;
    }

    /// The loaded Huffman tree
    pub fn huffman_tree(&self) -> Result<&HuffmanTree> {
        self.tree.as_ref().ok_or(WolfError::NullBuffer {
            buffer: "Huffman tree",
        })
    }

    /// Decode and cache the picture table from graphics chunk 0
    pub fn load_picture_table(&mut self, chunk: &[u8]) -> Result<&[PicSize]> {
        let tree = self.huffman_tree()?;
        let table = pic::decode_picture_table(tree, chunk, self.version.pic_count())?;
        log::debug!("Loaded {} picture sizes for {}", table.len(), self.version);
        let table = self.pic_table.insert(table);
        Ok(table.as_slice())
    }

    /// The cached picture table, if loaded
    pub fn picture_table(&self) -> Option<&[PicSize]> {
        self.pic_table.as_deref()
    }

    /// Table entry for the picture stored in chunk `magic`
    pub fn picture_size(&self, magic: u32) -> Result<PicSize> {
        let table = self.pic_table.as_deref().ok_or(WolfError::NullBuffer {
            buffer: "picture table",
        })?;
        magic
            .checked_sub(self.version.pic_start())
            .and_then(|index| table.get(index as usize))
            .copied()
            .ok_or(WolfError::UnknownPicture { magic })
    }

    /// Decode the picture stored in chunk `magic`
    pub fn decompress_picture(&self, magic: u32, chunk: &[u8]) -> Result<Picture> {
        let size = self.picture_size(magic)?;
        pic::decompress_picture(self.huffman_tree()?, chunk, size)
    }

    /// Decode a batch of picture chunks, skipping the ones that fail
    ///
    /// Every failure is logged with its magic number and listed in
    /// [`PictureBatch::failed`].
    pub fn extract_pictures<'a, I>(&self, chunks: I) -> PictureBatch
    where
        I: IntoIterator<Item = (u32, &'a [u8])>,
    {
        let mut batch = PictureBatch::default();
        for (magic, chunk) in chunks {
            match self.decompress_picture(magic, chunk) {
                Ok(picture) => batch.pictures.push((magic, picture)),
                Err(e) => {
                    log::warn!("Could not decode picture {magic}: {e}");
                    batch.failed.push(magic);
                }
            }
        }
        if !batch.is_complete() {
            log::warn!(
                "{} of {} pictures failed",
                batch.failed.len(),
                batch.failed.len() + batch.pictures.len()
            );
        }
        batch
    }

    /// Expand one map plane with this session's RLEW tag
    pub fn decompress_map_plane(
        &self,
        chunk: &[u8],
        carmack_len: usize,
        width: u16,
        height: u16,
    ) -> Result<LevelPlane> {
        map::decompress_map_plane(chunk, carmack_len, width, height, self.rlew_tag)
    }

    /// Expand every plane of a level with this session's RLEW tag
    pub fn decompress_level(&self, chunks: &LevelChunks<'_>) -> Level {
        map::decompress_level(chunks, self.rlew_tag)
    }
}
