//! Rank/select directory over a finished bit sequence.
//!
//! Implements the Rank9 counting scheme with sampled select hints.
//!
//! # Layout
//!
//! For every 512-bit block of the underlying [`BitBuffer`] the directory
//! keeps two 64-bit words:
//! - Word 0: Absolute rank (number of 1s before this block)
//! - Word 1: Relative ranks (7 x 9-bit cumulative counts within the block)
//!
//! A sentinel entry after the last block holds the total number of ones, so
//! `rank1(len)` and the select binary searches never need a special case.
//!
//! Select is answered by jumping to a sampled block (one sample every 512
//! ones, or 512 zeros for `select0`), binary-searching the absolute ranks up
//! to the next sample, then walking at most seven sub-block counters and one
//! word.
//!
//! The directory owns the bits it indexes, so they cannot change underneath
//! it.

use crate::bitbuf::{low_mask, BitBuffer};
use crate::error::{Error, Result};

const BLOCK_BITS: usize = 512;
const WORDS_PER_BLOCK: usize = BLOCK_BITS / 64;
const SELECT_SAMPLE: usize = 512;

/// A bit sequence plus its rank/select directory.
#[derive(Clone, PartialEq, Eq)]
pub struct SparseRankSelect {
    bits: BitBuffer,
    /// Interleaved directory: [abs_rank, rel_ranks] per block, plus sentinel.
    directory: Vec<u64>,
    /// Block index hint for every 512th one-bit.
    select1_index: Vec<u32>,
    /// Block index hint for every 512th zero-bit.
    select0_index: Vec<u32>,
    ones: usize,
}

impl std::fmt::Debug for SparseRankSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseRankSelect")
            .field("len", &self.bits.len())
            .field("ones", &self.ones)
            .finish()
    }
}

impl SparseRankSelect {
    /// Build the directory over `bits` in one pass.
    pub fn new(bits: BitBuffer) -> Self {
        let num_blocks = bits.len().div_ceil(BLOCK_BITS);
        let words = bits.words();
        let mut directory = vec![0u64; (num_blocks + 1) * 2];
        let mut select1_index = Vec::new();
        let mut select0_index = Vec::new();

        let mut total_rank = 0u64;
        let mut next_select1_threshold = 0u64;
        let mut next_select0_threshold = 0u64;

        for i in 0..num_blocks {
            directory[i * 2] = total_rank;
            let total_zeros = (i * BLOCK_BITS) as u64 - total_rank;

            while total_rank >= next_select1_threshold {
                select1_index.push(i as u32);
                next_select1_threshold += SELECT_SAMPLE as u64;
            }
            while total_zeros >= next_select0_threshold {
                select0_index.push(i as u32);
                next_select0_threshold += SELECT_SAMPLE as u64;
            }

            let mut relative_ranks = 0u64;
            let mut current_rel = 0u64;
            for j in 0..WORDS_PER_BLOCK {
                if j > 0 {
                    relative_ranks |= current_rel << (9 * (j - 1));
                }
                let word = words.get(i * WORDS_PER_BLOCK + j).copied().unwrap_or(0);
                current_rel += u64::from(word.count_ones());
            }
            directory[i * 2 + 1] = relative_ranks;
            total_rank += current_rel;
        }

        // Sentinel
        directory[num_blocks * 2] = total_rank;
        let total_zeros = (num_blocks * BLOCK_BITS) as u64 - total_rank;
        while total_rank >= next_select1_threshold {
            select1_index.push(num_blocks as u32);
            next_select1_threshold += SELECT_SAMPLE as u64;
        }
        while total_zeros >= next_select0_threshold {
            select0_index.push(num_blocks as u32);
            next_select0_threshold += SELECT_SAMPLE as u64;
        }

        Self {
            bits,
            directory,
            select1_index,
            select0_index,
            ones: total_rank as usize,
        }
    }

    /// The indexed bits.
    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Return the total number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Return true if the sequence has length 0.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of one-bits.
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of zero-bits.
    pub fn count_zeros(&self) -> usize {
        self.bits.len() - self.ones
    }

    /// Bits spent on the directory and select samples.
    pub fn directory_bits(&self) -> usize {
        let samples = self.select1_index.len() + self.select0_index.len();
        self.directory.len() * 64 + samples * 32
    }

    /// Approximate heap memory usage in bytes, bits included.
    pub fn heap_bytes(&self) -> usize {
        self.bits.heap_bytes()
            + self.directory.capacity() * 8
            + self.select1_index.capacity() * 4
            + self.select0_index.capacity() * 4
    }

    /// Return true if the bit at `pos` is set.
    #[inline]
    pub fn get(&self, pos: usize) -> bool {
        self.bits.get(pos)
    }

    #[inline]
    fn word(&self, block_idx: usize, sub_block_idx: usize) -> u64 {
        self.bits
            .words()
            .get(block_idx * WORDS_PER_BLOCK + sub_block_idx)
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    fn abs_rank(&self, block_idx: usize) -> usize {
        self.directory[block_idx * 2] as usize
    }

    #[inline]
    fn rel_rank(&self, block_idx: usize, sub_block_idx: usize) -> usize {
        if sub_block_idx == 0 {
            return 0;
        }
        ((self.directory[block_idx * 2 + 1] >> (9 * (sub_block_idx - 1))) & 0x1FF) as usize
    }

    #[inline]
    fn num_entries(&self) -> usize {
        self.directory.len() / 2
    }

    /// Return the number of set bits in the range [0, pos).
    pub fn rank1(&self, pos: usize) -> usize {
        let pos = pos.min(self.bits.len());
        let block_idx = pos / BLOCK_BITS;
        let sub_block_idx = (pos % BLOCK_BITS) / 64;
        let bit_offset = pos % 64;

        let word = self.word(block_idx, sub_block_idx) & low_mask(bit_offset);
        self.abs_rank(block_idx)
            + self.rel_rank(block_idx, sub_block_idx)
            + word.count_ones() as usize
    }

    /// Return the number of unset bits in the range [0, pos).
    pub fn rank0(&self, pos: usize) -> usize {
        let pos = pos.min(self.bits.len());
        pos - self.rank1(pos)
    }

    /// Return the position of the `k`-th set bit (0-indexed).
    pub fn select1(&self, k: usize) -> Result<usize> {
        if k >= self.ones {
            return Err(Error::IndexOutOfBounds(k));
        }

        let target = k + 1;
        let select_idx = k / SELECT_SAMPLE;
        let mut block_low = self.select1_index[select_idx] as usize;
        let mut block_high = match self.select1_index.get(select_idx + 1) {
            Some(&b) => b as usize + 1,
            None => self.num_entries(),
        };

        while block_low < block_high {
            let mid = block_low + (block_high - block_low) / 2;
            if self.abs_rank(mid) < target {
                block_low = mid + 1;
            } else {
                block_high = mid;
            }
        }
        let block_idx = block_low - 1;
        let mut remaining_k = target - self.abs_rank(block_idx);

        let mut sub_block_idx = 0;
        for j in 1..WORDS_PER_BLOCK {
            if self.rel_rank(block_idx, j) < remaining_k {
                sub_block_idx = j;
            } else {
                break;
            }
        }
        remaining_k -= self.rel_rank(block_idx, sub_block_idx);

        let word = self.word(block_idx, sub_block_idx);
        Ok(block_idx * BLOCK_BITS + sub_block_idx * 64 + select_in_word(word, remaining_k - 1))
    }

    /// Return the position of the `k`-th unset bit (0-indexed).
    pub fn select0(&self, k: usize) -> Result<usize> {
        if k >= self.count_zeros() {
            return Err(Error::IndexOutOfBounds(k));
        }

        let target = k + 1;
        let select_idx = k / SELECT_SAMPLE;
        let mut block_low = self.select0_index[select_idx] as usize;
        let mut block_high = match self.select0_index.get(select_idx + 1) {
            Some(&b) => b as usize + 1,
            None => self.num_entries(),
        };

        while block_low < block_high {
            let mid = block_low + (block_high - block_low) / 2;
            let rank0_at_mid = mid * BLOCK_BITS - self.abs_rank(mid);
            if rank0_at_mid < target {
                block_low = mid + 1;
            } else {
                block_high = mid;
            }
        }
        let block_idx = block_low - 1;
        let mut remaining_k = target - (block_idx * BLOCK_BITS - self.abs_rank(block_idx));

        let mut sub_block_idx = 0;
        for j in 1..WORDS_PER_BLOCK {
            let rel_rank0 = j * 64 - self.rel_rank(block_idx, j);
            if rel_rank0 < remaining_k {
                sub_block_idx = j;
            } else {
                break;
            }
        }
        remaining_k -= sub_block_idx * 64 - self.rel_rank(block_idx, sub_block_idx);

        let word = !self.word(block_idx, sub_block_idx);
        Ok(block_idx * BLOCK_BITS + sub_block_idx * 64 + select_in_word(word, remaining_k - 1))
    }
}

/// Position of the `k`-th set bit of `word` (0-indexed). `word` must have
/// more than `k` set bits.
#[inline]
fn select_in_word(mut word: u64, k: usize) -> usize {
    #[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
    {
        // SAFETY: the bmi2 target feature is statically enabled.
        let res = unsafe { core::arch::x86_64::_pdep_u64(1u64 << k, word) };
        return res.trailing_zeros() as usize;
    }

    #[allow(unreachable_code)]
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_bools(bits: &[bool]) -> SparseRankSelect {
        let mut buf = BitBuffer::new();
        for &b in bits {
            if b {
                buf.append_one();
            } else {
                buf.append_zeros(1);
            }
        }
        SparseRankSelect::new(buf)
    }

    #[test]
    fn rank_basic() {
        let rs = from_bools(&[true, true, false, true, false, false, true]);
        assert_eq!(rs.rank1(0), 0);
        assert_eq!(rs.rank1(1), 1);
        assert_eq!(rs.rank1(4), 3);
        assert_eq!(rs.rank1(7), 4);
        assert_eq!(rs.rank1(100), 4);
        assert_eq!(rs.rank0(4), 1);
        assert_eq!(rs.rank0(7), 3);
        assert!(rs.get(0));
        assert!(!rs.get(2));
    }

    #[test]
    fn select_basic() {
        let rs = from_bools(&[true, true, false, true]);
        assert_eq!(rs.select1(0).unwrap(), 0);
        assert_eq!(rs.select1(1).unwrap(), 1);
        assert_eq!(rs.select1(2).unwrap(), 3);
        assert!(matches!(rs.select1(3), Err(Error::IndexOutOfBounds(3))));

        assert_eq!(rs.select0(0).unwrap(), 2);
        assert!(rs.select0(1).is_err());
    }

    #[test]
    fn empty_sequence() {
        let rs = SparseRankSelect::new(BitBuffer::new());
        assert!(rs.is_empty());
        assert_eq!(rs.rank1(0), 0);
        assert_eq!(rs.rank0(10), 0);
        assert!(rs.select1(0).is_err());
        assert!(rs.select0(0).is_err());
    }

    #[test]
    fn sparse_unary_sequence_spanning_many_blocks() {
        // One-bit after every run of 37 zeros, over several sample strides.
        let mut buf = BitBuffer::new();
        let n = 3000;
        for _ in 0..n {
            buf.append_zeros(37);
            buf.append_one();
        }
        let rs = SparseRankSelect::new(buf);
        assert_eq!(rs.count_ones(), n);
        assert_eq!(rs.count_zeros(), n * 37);
        for k in 0..n {
            let pos = rs.select1(k).unwrap();
            assert_eq!(pos, k * 38 + 37);
            assert_eq!(rs.rank1(pos), k);
            assert_eq!(rs.rank1(pos + 1), k + 1);
        }
        for k in (0..n * 37).step_by(101) {
            let pos = rs.select0(k).unwrap();
            assert_eq!(pos, (k / 37) * 38 + k % 37);
            assert_eq!(rs.rank0(pos), k);
        }
    }

    #[test]
    fn dense_block_boundaries() {
        let mut buf = BitBuffer::new();
        for _ in 0..(BLOCK_BITS * 3 / 64) {
            buf.append_bits(!0u64, 64);
        }
        buf.append_zeros(5);
        let rs = SparseRankSelect::new(buf);
        assert_eq!(rs.select1(511).unwrap(), 511);
        assert_eq!(rs.select1(512).unwrap(), 512);
        assert_eq!(rs.select1(1535).unwrap(), 1535);
        assert_eq!(rs.select0(0).unwrap(), 1536);
        assert_eq!(rs.select0(4).unwrap(), 1540);
        assert_eq!(rs.rank1(rs.len()), 1536);
    }

    #[test]
    fn select_in_word_positions() {
        assert_eq!(select_in_word(0b1011, 0), 0);
        assert_eq!(select_in_word(0b1011, 2), 3);
        assert_eq!(select_in_word(1u64 << 63, 0), 63);
    }
}
