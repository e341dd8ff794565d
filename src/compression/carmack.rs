//! Carmack expansion
//!
//! The stream is a sequence of `(count, flag)` byte pairs. `flag` selects the
//! token kind:
//!
//! - `NEAR_TAG` with `count != 0`: one offset byte follows; copy `count` words
//!   starting `offset` words behind the write position.
//! - `FAR_TAG` with `count != 0`: a little-endian word offset follows; copy
//!   `count` words starting at absolute word `offset` of the output.
//! - `NEAR_TAG`/`FAR_TAG` with `count == 0`: escape; the next byte is the low
//!   byte of a literal word whose high byte is the flag.
//! - anything else: the pair itself is a literal little-endian word.
//!
//! Copies run one word at a time, so a source range that overlaps the words
//! being written repeats the pattern.

use crate::common::{Word, FAR_TAG, NEAR_TAG};
use crate::{Result, WolfError};

/// Byte cursor over the token stream
struct TokenReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TokenReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    fn byte(&mut self, needed: usize) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or(WolfError::TruncatedInput {
            needed,
            available: 0,
        })?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    fn word(&mut self) -> Result<Word> {
        let available = self.data.len().saturating_sub(self.pos);
        if available < 2 {
            return Err(WolfError::TruncatedInput {
                needed: 2,
                available,
            });
        }
        let w = Word::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(w)
    }
}

/// Expand a Carmack stream into `destination[..length]`
///
/// # Arguments
/// * `source` - The compressed token stream
/// * `destination` - Pre-allocated output, at least `length` words long
/// * `length` - Number of output words to produce
///
/// A back-reference that would read words not yet written fails with
/// [`WolfError::InvalidBackReference`]; one that would write past `length`
/// fails with [`WolfError::OutputOverrun`].
pub fn carmack_expand(source: &[u8], destination: &mut [Word], length: usize) -> Result<()> {
    if destination.len() < length {
        return Err(WolfError::NullBuffer {
            buffer: "Carmack destination",
        });
    }
    if length == 0 {
        return Ok(());
    }

    log::debug!("Carmack-expanding {} bytes to {} words", source.len(), length);

    let output = &mut destination[..length];
    let mut reader = TokenReader::new(source);
    let mut write = 0;

    while write < length {
        let count = reader.byte(2)?;
        let flag = reader.byte(1)?;

        match (flag, count) {
            (NEAR_TAG, 0) | (FAR_TAG, 0) => {
                let low = reader.byte(1)?;
                log::trace!("escaped literal {flag:#04x}{low:02x} at word {write}");
                output[write] = Word::from_le_bytes([low, flag]);
                write += 1;
            }
            (NEAR_TAG, count) => {
                let offset = reader.byte(1)? as usize;
                let from = write.checked_sub(offset).filter(|_| offset != 0).ok_or(
                    WolfError::InvalidBackReference {
                        position: write,
                        from: write.wrapping_sub(offset),
                        count: count as usize,
                    },
                )?;
                log::trace!("near copy of {count} words from {from} at word {write}");
                write = copy_words(output, from, write, count as usize)?;
            }
            (FAR_TAG, count) => {
                let from = reader.word()? as usize;
                if from >= write {
                    return Err(WolfError::InvalidBackReference {
                        position: write,
                        from,
                        count: count as usize,
                    });
                }
                log::trace!("far copy of {count} words from {from} at word {write}");
                write = copy_words(output, from, write, count as usize)?;
            }
            _ => {
                output[write] = Word::from_le_bytes([count, flag]);
                write += 1;
            }
        }
    }

    Ok(())
}

/// Copy `count` words from `from` to `write`, word by word so that an
/// overlapping range repeats. Returns the new write position.
#[inline]
fn copy_words(output: &mut [Word], from: usize, write: usize, count: usize) -> Result<usize> {
    let remaining = output.len() - write;
    if count > remaining {
        return Err(WolfError::OutputOverrun {
            position: write,
            count,
            remaining,
        });
    }
    for i in 0..count {
        output[write + i] = output[from + i];
    }
    Ok(write + count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(source: &[u8], length: usize) -> Result<Vec<Word>> {
        let mut output = vec![0; length];
        carmack_expand(source, &mut output, length)?;
        Ok(output)
    }

    #[test]
    fn test_literal_words() {
        let out = expand(&[0x34, 0x12, 0x78, 0x56], 2).unwrap();
        assert_eq!(out, vec![0x1234, 0x5678]);
    }

    #[test]
    fn test_near_copy() {
        let source = [0x11, 0x11, 0x22, 0x22, 0x02, NEAR_TAG, 0x02];
        let out = expand(&source, 4).unwrap();
        assert_eq!(out, vec![0x1111, 0x2222, 0x1111, 0x2222]);
    }

    #[test]
    fn test_near_copy_overlapping() {
        // One word back, four words long: repeats the last word.
        let source = [0x05, 0x00, 0x04, NEAR_TAG, 0x01];
        let out = expand(&source, 5).unwrap();
        assert_eq!(out, vec![5, 5, 5, 5, 5]);
    }

    #[test]
    fn test_far_copy_is_absolute() {
        let source = [
            0x34, 0x12, 0x78, 0x56, 0xBC, 0x9A, // three literals
            0x02, FAR_TAG, 0x00, 0x00, // copy words 0..2
        ];
        let out = expand(&source, 5).unwrap();
        assert_eq!(out, vec![0x1234, 0x5678, 0x9ABC, 0x1234, 0x5678]);
    }

    #[test]
    fn test_far_copy_high_offset() {
        let mut source = Vec::new();
        for i in 0..300u16 {
            source.extend_from_slice(&i.to_le_bytes());
        }
        // Copy words 258..260.
        source.extend_from_slice(&[0x02, FAR_TAG, 0x02, 0x01]);
        let out = expand(&source, 302).unwrap();
        assert_eq!(&out[300..], &[258, 259]);
    }

    #[test]
    fn test_escape_sequences() {
        let out = expand(&[0x00, NEAR_TAG, 0x99], 1).unwrap();
        assert_eq!(out, vec![0xA799]);

        let out = expand(&[0x00, FAR_TAG, 0x01, 0x42, 0x00], 2).unwrap();
        assert_eq!(out, vec![0xA801, 0x0042]);
    }

    #[test]
    fn test_zero_length() {
        let mut output = [0xFFFF; 3];
        carmack_expand(&[], &mut output, 0).unwrap();
        assert_eq!(output, [0xFFFF; 3]);
    }

    #[test]
    fn test_back_reference_before_start() {
        let err = expand(&[0x01, 0x00, 0x01, NEAR_TAG, 0x02], 3).unwrap_err();
        assert!(matches!(err, WolfError::InvalidBackReference { position: 1, .. }));

        let err = expand(&[0x01, 0x00, 0x01, NEAR_TAG, 0x00], 3).unwrap_err();
        assert!(matches!(err, WolfError::InvalidBackReference { .. }));

        let err = expand(&[0x01, 0x00, 0x01, FAR_TAG, 0x01, 0x00], 3).unwrap_err();
        assert!(matches!(err, WolfError::InvalidBackReference { from: 1, .. }));
    }

    #[test]
    fn test_copy_past_length() {
        let err = expand(&[0x01, 0x00, 0x05, NEAR_TAG, 0x01], 3).unwrap_err();
        assert!(matches!(
            err,
            WolfError::OutputOverrun {
                position: 1,
                count: 5,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            expand(&[0x01, 0x00], 2),
            Err(WolfError::TruncatedInput { .. })
        ));
        assert!(matches!(
            expand(&[0x01, 0x00, 0x01, FAR_TAG, 0x00], 2),
            Err(WolfError::TruncatedInput { needed: 2, available: 1 })
        ));
        assert!(matches!(
            expand(&[0x00, NEAR_TAG], 1),
            Err(WolfError::TruncatedInput { .. })
        ));
    }
}
