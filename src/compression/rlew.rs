//! RLEW (run-length encoding on words) expansion
//!
//! A word equal to the tag introduces a `(count, value)` pair; any other word
//! is copied verbatim. The tag itself comes from the map atlas header.

use crate::common::Word;
use crate::{Result, WolfError};

/// Expand an RLEW stream into `destination[..length]`
///
/// # Arguments
/// * `source` - The compressed word stream
/// * `destination` - Pre-allocated output, at least `length` words long
/// * `length` - Number of output words to produce
/// * `rlew_tag` - Word that marks a run
///
/// Reads are bounded by `source.len()`: a stream that ends before `length`
/// words are produced fails with [`WolfError::TruncatedInput`].
pub fn rlew_expand(
    source: &[Word],
    destination: &mut [Word],
    length: usize,
    rlew_tag: Word,
) -> Result<()> {
    if destination.len() < length {
        return Err(WolfError::NullBuffer {
            buffer: "RLEW destination",
        });
    }
    if length == 0 {
        return Ok(());
    }

    log::debug!("RLEW-expanding {} source words to {} words", source.len(), length);

    let output = &mut destination[..length];
    let mut read = 0;
    let mut write = 0;

    while write < length {
        let current = next_word(source, &mut read, 1)?;

        if current == rlew_tag {
            let count = next_word(source, &mut read, 2)? as usize;
            let value = next_word(source, &mut read, 1)?;

            let remaining = length - write;
            if count > remaining {
                return Err(WolfError::OutputOverrun {
                    position: write,
                    count,
                    remaining,
                });
            }
            log::trace!("run of {count} x {value:#06x} at word {write}");
            output[write..write + count].fill(value);
            write += count;
        } else {
            output[write] = current;
            write += 1;
        }
    }

    Ok(())
}

/// Fetch the word at `*read` and advance; `needed` is how many words the
/// current token still requires, for error reporting.
#[inline]
fn next_word(source: &[Word], read: &mut usize, needed: usize) -> Result<Word> {
    let word = source.get(*read).copied().ok_or(WolfError::TruncatedInput {
        needed,
        available: 0,
    })?;
    *read += 1;
    Ok(word)
}
