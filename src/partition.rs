//! Directory mapping global positions and values to partition blocks.
//!
//! One entry per block: the block's base (its smallest value) and the number
//! of elements stored in earlier blocks. Both columns are non-decreasing, so
//! every lookup is a binary search.

use crate::error::{Error, Result};

/// Block bases and prefix counts for a partitioned sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionDirectory {
    block_size: usize,
    bases: Vec<u64>,
    /// `counts[j]` = elements before block `j`; one trailing entry holds `n`.
    counts: Vec<usize>,
}

impl PartitionDirectory {
    /// Create an empty directory for blocks of at most `block_size` elements.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
            bases: Vec::new(),
            counts: vec![0],
        }
    }

    /// Register the next block.
    pub fn push(&mut self, base: u64, len: usize) {
        debug_assert!(self.bases.last().is_none_or(|&b| b <= base));
        let before = self.len();
        self.bases.push(base);
        self.counts.push(before + len);
    }

    /// Maximum number of elements per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.bases.len()
    }

    /// Total number of elements across all blocks.
    pub fn len(&self) -> usize {
        self.counts[self.counts.len() - 1]
    }

    /// Return true if no elements are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest value of block `block_id`.
    pub fn base(&self, block_id: usize) -> u64 {
        self.bases[block_id]
    }

    /// Block bases in order.
    pub fn bases(&self) -> &[u64] {
        &self.bases
    }

    /// Number of elements stored before block `block_id`.
    pub fn count_before(&self, block_id: usize) -> usize {
        self.counts[block_id]
    }

    /// Bits spent on bases and prefix counts.
    pub fn bit_length(&self) -> usize {
        (self.bases.len() + self.counts.len()) * 64
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.bases.capacity() * 8 + self.counts.capacity() * std::mem::size_of::<usize>()
    }

    /// Map global index `i` to `(block_id, local_index)`.
    pub fn block_for_index(&self, i: usize) -> Result<(usize, usize)> {
        if i >= self.len() {
            return Err(Error::IndexOutOfBounds(i));
        }
        let block_id = self.counts[1..].partition_point(|&c| c <= i);
        Ok((block_id, i - self.counts[block_id]))
    }

    /// Last block whose base is `<= x`, or the first block if `x` is below
    /// every base.
    pub fn block_for_value(&self, x: u64) -> usize {
        self.bases.partition_point(|&b| b <= x).saturating_sub(1)
    }

    /// Last block whose base is `< x`. Every element of earlier blocks is
    /// then below `x` and every element of later blocks is at least `x`.
    pub fn last_block_below(&self, x: u64) -> Option<usize> {
        self.bases.partition_point(|&b| b < x).checked_sub(1)
    }
}
