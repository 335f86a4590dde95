//! Append-only bit storage with random-access fixed-width reads.
//!
//! Bits are packed little-endian into 64-bit words: bit `i` lives in word
//! `i / 64` at position `i % 64`. Values wider than the space left in the
//! current word are split across two words transparently, both on append
//! and on read.
//!
//! A buffer is written once while a structure is being built and only read
//! afterwards; nothing in this crate interleaves the two phases.

use crate::error::{Error, Result};

/// Mask selecting the `width` low-order bits (`width <= 64`).
#[inline]
pub(crate) fn low_mask(width: usize) -> u64 {
    if width >= 64 {
        !0u64
    } else {
        (1u64 << width) - 1
    }
}

/// A growable, word-packed sequence of bits.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    words: Vec<u64>,
    len: usize,
}

impl std::fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitBuffer")
            .field("len", &self.len)
            .field("words", &self.words.len())
            .finish()
    }
}

impl BitBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
        }
    }

    /// Reconstruct a buffer from packed words.
    ///
    /// Bits at or beyond `len` must be zero; decoding relies on this when it
    /// rebuilds rank directories.
    pub fn from_parts(words: Vec<u64>, len: usize) -> Result<Self> {
        if words.len() != len.div_ceil(64) {
            return Err(Error::InvalidEncoding(format!(
                "bit buffer of {len} bits needs {} words, got {}",
                len.div_ceil(64),
                words.len()
            )));
        }
        if len % 64 != 0 {
            let tail = words[words.len() - 1];
            if tail & !low_mask(len % 64) != 0 {
                return Err(Error::InvalidEncoding(
                    "bit buffer has set bits past its length".to_string(),
                ));
            }
        }
        Ok(Self { words, len })
    }

    /// Return the total number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if no bits have been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed words backing the buffer.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * 8
    }

    /// Append the `width` low-order bits of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `width > 64`.
    pub fn append_bits(&mut self, value: u64, width: usize) {
        assert!(width <= 64, "width {width} exceeds 64 bits");
        if width == 0 {
            return;
        }
        let value = value & low_mask(width);
        let offset = self.len % 64;
        if offset == 0 {
            self.words.push(value);
        } else {
            let last = self.words.len() - 1;
            self.words[last] |= value << offset;
            if offset + width > 64 {
                self.words.push(value >> (64 - offset));
            }
        }
        self.len += width;
    }

    /// Append `count` zero-bits.
    pub fn append_zeros(&mut self, count: usize) {
        self.len += count;
        self.words.resize(self.len.div_ceil(64), 0);
    }

    /// Append a single one-bit.
    pub fn append_one(&mut self) {
        self.append_bits(1, 1);
    }

    /// Return the bit at `pos`, or false past the end.
    #[inline]
    pub fn get(&self, pos: usize) -> bool {
        if pos >= self.len {
            return false;
        }
        (self.words[pos / 64] >> (pos % 64)) & 1 == 1
    }

    /// Read `width` bits starting at bit `offset`.
    pub fn read_bits(&self, offset: usize, width: usize) -> Result<u64> {
        if width > 64 || offset.checked_add(width).is_none_or(|end| end > self.len) {
            return Err(Error::BitRangeOutOfBounds {
                offset,
                width,
                len: self.len,
            });
        }
        Ok(self.read_bits_unchecked(offset, width))
    }

    /// Read `width` bits at `offset` without bounds checks against `len`.
    ///
    /// Callers guarantee `offset + width <= len` and `width <= 64`.
    #[inline]
    pub(crate) fn read_bits_unchecked(&self, offset: usize, width: usize) -> u64 {
        if width == 0 {
            return 0;
        }
        let word_idx = offset / 64;
        let bit_offset = offset % 64;
        let mut value = self.words[word_idx] >> bit_offset;
        if bit_offset + width > 64 {
            value |= self.words[word_idx + 1] << (64 - bit_offset);
        }
        value & low_mask(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read_across_words() {
        let mut buf = BitBuffer::new();
        for i in 0..40u64 {
            buf.append_bits(i * 3 + 1, 7);
        }
        assert_eq!(buf.len(), 280);
        for i in 0..40u64 {
            assert_eq!(buf.read_bits(i as usize * 7, 7).unwrap(), i * 3 + 1);
        }
    }

    #[test]
    fn full_width_values() {
        let mut buf = BitBuffer::new();
        buf.append_bits(0b101, 3);
        buf.append_bits(u64::MAX - 5, 64);
        buf.append_bits(0xdead_beef_cafe_f00d, 64);
        assert_eq!(buf.read_bits(0, 3).unwrap(), 0b101);
        assert_eq!(buf.read_bits(3, 64).unwrap(), u64::MAX - 5);
        assert_eq!(buf.read_bits(67, 64).unwrap(), 0xdead_beef_cafe_f00d);
    }

    #[test]
    fn value_is_truncated_to_width() {
        let mut buf = BitBuffer::new();
        buf.append_bits(0xff, 4);
        buf.append_bits(0, 4);
        assert_eq!(buf.read_bits(0, 8).unwrap(), 0x0f);
    }

    #[test]
    fn unary_runs() {
        let mut buf = BitBuffer::new();
        buf.append_zeros(3);
        buf.append_one();
        buf.append_zeros(100);
        buf.append_one();
        assert_eq!(buf.len(), 105);
        assert!(!buf.get(0));
        assert!(buf.get(3));
        assert!(!buf.get(50));
        assert!(buf.get(104));
        assert!(!buf.get(105));
        assert_eq!(buf.words().len(), 2);
    }

    #[test]
    fn read_past_end_is_an_error() {
        let mut buf = BitBuffer::new();
        buf.append_bits(0b11, 2);
        assert!(matches!(
            buf.read_bits(1, 2),
            Err(Error::BitRangeOutOfBounds {
                offset: 1,
                width: 2,
                len: 2
            })
        ));
        assert_eq!(buf.read_bits(2, 0).unwrap(), 0);
        assert!(buf.read_bits(usize::MAX, 1).is_err());
    }

    #[test]
    fn from_parts_validates_shape() {
        assert!(BitBuffer::from_parts(vec![0b1], 1).is_ok());
        assert!(BitBuffer::from_parts(vec![0b10], 1).is_err());
        assert!(BitBuffer::from_parts(vec![0, 0], 64).is_err());
        assert!(BitBuffer::from_parts(Vec::new(), 0).is_ok());
    }
}
