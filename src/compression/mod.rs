//! Carmack, RLEW and Huffman expansion
//!
//! Every decoder fills a caller-allocated buffer whose length is known before
//! decoding starts. The decoders are pure: the same source, tree and tag always
//! produce the same output.

mod bits;
mod carmack;
mod huffman;
mod rlew;

pub use bits::BitstreamReader;
pub use carmack::carmack_expand;
pub use huffman::{huffman_expand, HuffmanNode, HuffmanTree};
pub use rlew::rlew_expand;

use crate::common::{alloc_buffer, Word};
use crate::Result;

/// Carmack-expand `source` into a new buffer of `length` words
pub fn carmack_expand_to_vec(source: &[u8], length: usize) -> Result<Vec<Word>> {
    let mut output = alloc_buffer(length)?;
    carmack_expand(source, &mut output, length)?;
    Ok(output)
}

/// RLEW-expand `source` into a new buffer of `length` words
pub fn rlew_expand_to_vec(source: &[Word], length: usize, rlew_tag: Word) -> Result<Vec<Word>> {
    let mut output = alloc_buffer(length)?;
    rlew_expand(source, &mut output, length, rlew_tag)?;
    Ok(output)
}

/// Huffman-expand `source` into a new buffer of `length` bytes
pub fn huffman_expand_to_vec(source: &[u8], length: usize, tree: &HuffmanTree) -> Result<Vec<u8>> {
    let mut output = alloc_buffer(length)?;
    huffman_expand(source, &mut output, length, tree)?;
    Ok(output)
}
