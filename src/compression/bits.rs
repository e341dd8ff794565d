//! LSB-first bit reader used by the Huffman decoder

use crate::{Result, WolfError};

/// Reads single bits from a byte slice, least significant bit first
#[derive(Debug, Clone)]
pub struct BitstreamReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitstreamReader<'a> {
    /// Create a reader positioned at bit 0 of the first byte
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Read the next bit
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = *self.data.get(self.byte_pos).ok_or(WolfError::TruncatedInput {
            needed: 1,
            available: 0,
        })?;
        let bit = (byte >> self.bit_pos) & 1 != 0;

        if self.bit_pos == 7 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        } else {
            self.bit_pos += 1;
        }
        Ok(bit)
    }

    /// Number of bits consumed so far
    pub fn bits_consumed(&self) -> usize {
        self.byte_pos * 8 + self.bit_pos as usize
    }

    /// Number of bits left in the source
    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bits_consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_first_order() {
        let mut reader = BitstreamReader::new(&[0b0000_0010, 0b1000_0000]);
        let bits: Vec<bool> = (0..16).map(|_| reader.read_bit().unwrap()).collect();

        assert!(!bits[0]);
        assert!(bits[1]);
        assert!(bits[2..15].iter().all(|b| !b));
        assert!(bits[15]);
        assert_eq!(reader.bits_consumed(), 16);
        assert_eq!(reader.bits_remaining(), 0);
    }

    #[test]
    fn test_exhausted() {
        let mut reader = BitstreamReader::new(&[0xFF]);
        for _ in 0..8 {
            assert!(reader.read_bit().unwrap());
        }
        assert!(matches!(
            reader.read_bit(),
            Err(WolfError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_empty() {
        let mut reader = BitstreamReader::new(&[]);
        assert_eq!(reader.bits_remaining(), 0);
        assert!(reader.read_bit().is_err());
    }
}
