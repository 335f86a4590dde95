//! Uniformly partitioned Elias–Fano for clustered monotone sequences.
//!
//! Intuition: plain Elias–Fano chooses a single `L = floor(log2(U/n))` based on the *global*
//! universe size. If a sequence is locally clustered (common in posting lists and ANN neighbor
//! lists), using a single global `L` can waste bits. Partitioned Elias–Fano splits the sequence
//! into blocks of `b` consecutive elements and encodes each block with its own local universe,
//! improving compression while preserving fast random access via per-block decoding.
//!
//! - blocks are encoded as independent `EliasFano` structures over values shifted by the block base
//! - a [`PartitionDirectory`] maps global indices and values to blocks by binary search
//! - every query answers exactly what [`EliasFano`] would answer over the whole sequence
//! - serialization is stable and versioned

use std::io::{Read, Write};
use std::iter::FusedIterator;

use crate::codec::{put_u64, ByteReader};
use crate::elias_fano::{self, EliasFano};
use crate::error::{Error, Result};
use crate::partition::PartitionDirectory;
use crate::sequence::MonotoneSequence;

const MAGIC: &[u8; 8] = b"QSEFUP01";

/// Default maximum number of elements per block.
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Construction options for [`UniformlyPartitionedEliasFano`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionOptions {
    block_size: usize,
    parallel: bool,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            parallel: false,
        }
    }
}

impl PartitionOptions {
    /// Options with the given block size and serial construction.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            ..Self::default()
        }
    }

    /// Set the maximum number of elements per block. Clamped to `[1, n]` at
    /// build time.
    #[must_use]
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Build blocks on the rayon thread pool. Has no effect unless the
    /// `rayon` feature is enabled.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether parallel construction was requested.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

/// Uniformly partitioned Elias–Fano encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformlyPartitionedEliasFano {
    universe: u64,
    directory: PartitionDirectory,
    blocks: Vec<EliasFano>,
}

fn build_block(chunk: &[u64]) -> EliasFano {
    let base = chunk[0];
    let last = chunk[chunk.len() - 1];
    let rel: Vec<u64> = chunk.iter().map(|&v| v - base).collect();
    EliasFano::build(&rel, last - base + 1)
}

impl UniformlyPartitionedEliasFano {
    /// Build from a sorted sequence with `max + 1` as the universe.
    ///
    /// `block_size` is the maximum number of items per block (clamped to
    /// `[1, n]`; values 64–256 are typical engineering choices).
    pub fn new(values: &[u64], block_size: usize) -> Result<Self> {
        let universe = elias_fano::implied_universe(values)?;
        Ok(Self::build(values, universe, PartitionOptions::new(block_size)))
    }

    /// Build from a sorted sequence over an explicit universe.
    pub fn with_universe(values: &[u64], universe: u64, block_size: usize) -> Result<Self> {
        elias_fano::validate(values, universe)?;
        Ok(Self::build(values, universe, PartitionOptions::new(block_size)))
    }

    /// Build with full control over the options. `universe` defaults to
    /// `max + 1`.
    pub fn with_options(
        values: &[u64],
        universe: Option<u64>,
        options: PartitionOptions,
    ) -> Result<Self> {
        let universe = match universe {
            Some(u) => {
                elias_fano::validate(values, u)?;
                u
            }
            None => elias_fano::implied_universe(values)?,
        };
        Ok(Self::build(values, universe, options))
    }

    fn build(values: &[u64], universe: u64, options: PartitionOptions) -> Self {
        let n = values.len();
        let block_size = options.block_size.clamp(1, n.max(1));

        #[cfg(feature = "rayon")]
        let blocks: Vec<EliasFano> = if options.is_parallel() {
            use rayon::prelude::*;
            values.par_chunks(block_size).map(build_block).collect()
        } else {
            values.chunks(block_size).map(build_block).collect()
        };
        #[cfg(not(feature = "rayon"))]
        let blocks: Vec<EliasFano> = values.chunks(block_size).map(build_block).collect();

        let mut directory = PartitionDirectory::new(block_size);
        for (chunk, block) in values.chunks(block_size).zip(&blocks) {
            directory.push(chunk[0], block.len());
        }

        log::debug!(
            "UniformlyPartitionedEliasFano::build n={} universe={} block_size={} blocks={}",
            n,
            universe,
            block_size,
            blocks.len()
        );

        Self {
            universe,
            directory,
            blocks,
        }
    }

    /// Return the universe size used to build this structure.
    #[must_use]
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Return the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Return true if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Maximum number of values per block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.directory.block_size()
    }

    /// Number of blocks.
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The block directory.
    pub fn directory(&self) -> &PartitionDirectory {
        &self.directory
    }

    /// Bits of encoded payload across all blocks plus the directory.
    pub fn bit_length(&self) -> usize {
        self.blocks.iter().map(EliasFano::bit_length).sum::<usize>() + self.directory.bit_length()
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.blocks.iter().map(EliasFano::heap_bytes).sum::<usize>()
            + self.blocks.capacity() * std::mem::size_of::<EliasFano>()
            + self.directory.heap_bytes()
    }

    /// Return the value at index `i`.
    pub fn select(&self, i: usize) -> Result<u64> {
        let (block_id, local) = self.directory.block_for_index(i)?;
        Ok(self.directory.base(block_id) + self.blocks[block_id].select(local)?)
    }

    /// Alias for [`UniformlyPartitionedEliasFano::select`].
    pub fn get(&self, i: usize) -> Result<u64> {
        self.select(i)
    }

    /// Return the number of elements strictly less than `x`.
    pub fn rank(&self, x: u64) -> usize {
        match self.directory.last_block_below(x) {
            None => 0,
            Some(block_id) => {
                let base = self.directory.base(block_id);
                self.directory.count_before(block_id) + self.blocks[block_id].rank(x - base)
            }
        }
    }

    /// Return the smallest element `>= x`.
    pub fn next_geq(&self, x: u64) -> Result<u64> {
        if self.is_empty() {
            return Err(Error::NotFound(x));
        }
        let first = self.directory.base(0);
        if x <= first {
            return Ok(first);
        }
        let block_id = self.directory.block_for_value(x);
        let base = self.directory.base(block_id);
        match self.blocks[block_id].next_geq(x - base) {
            Ok(v) => Ok(base + v),
            // Past this block's maximum: the next block's base is the answer.
            Err(Error::NotFound(_)) if block_id + 1 < self.num_blocks() => {
                Ok(self.directory.base(block_id + 1))
            }
            Err(Error::NotFound(_)) => Err(Error::NotFound(x)),
            Err(e) => Err(e),
        }
    }

    /// Return the largest element `<= x`.
    pub fn next_leq(&self, x: u64) -> Result<u64> {
        if self.is_empty() || x < self.directory.base(0) {
            return Err(Error::NotFound(x));
        }
        // The chosen block's base is <= x, so the block always holds an answer.
        let block_id = self.directory.block_for_value(x);
        let base = self.directory.base(block_id);
        Ok(base + self.blocks[block_id].next_leq(x - base)?)
    }

    /// Iterate over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            upef: self,
            block_id: 0,
            inner: None,
            remaining: self.len(),
        }
    }

    /// Serialize this partitioned structure to a stable binary encoding (little-endian).
    ///
    /// Format (versioned):
    /// - magic: 8 bytes (`QSEFUP01`)
    /// - universe: u64
    /// - block_size: u64
    /// - n: u64
    /// - num_blocks: u64
    /// - bases: `num_blocks` u64
    /// - blocks: for each block: len_bytes u64, then `len_bytes` bytes (EliasFano::to_bytes)
    ///
    /// Prefix counts are rebuilt from block lengths on load.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        put_u64(&mut out, self.universe);
        put_u64(&mut out, self.block_size() as u64);
        put_u64(&mut out, self.len() as u64);
        put_u64(&mut out, self.blocks.len() as u64);

        for &b in self.directory.bases() {
            put_u64(&mut out, b);
        }
        for blk in &self.blocks {
            let bytes = blk.to_bytes();
            put_u64(&mut out, bytes.len() as u64);
            out.extend_from_slice(&bytes);
        }
        out
    }

    /// Deserialize a partitioned Elias–Fano structure from `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        r.magic(MAGIC, "UniformlyPartitionedEliasFano")?;

        let universe = r.u64()?;
        let block_size = r.usize()?;
        let n = r.usize()?;
        let num_blocks = r.usize()?;

        if block_size == 0 {
            return Err(Error::InvalidEncoding(
                "block_size must be >= 1".to_string(),
            ));
        }
        // Bound allocation against total input to prevent allocation bombs.
        if num_blocks.saturating_mul(8) > r.remaining() {
            return Err(Error::InvalidEncoding(format!(
                "UPEF num_blocks ({num_blocks}) too large for input ({} bytes)",
                bytes.len()
            )));
        }

        let mut bases = Vec::with_capacity(num_blocks);
        for _ in 0..num_blocks {
            bases.push(r.u64()?);
        }

        let mut directory = PartitionDirectory::new(block_size);
        let mut blocks = Vec::with_capacity(num_blocks);
        for (j, &base) in bases.iter().enumerate() {
            let len_bytes = r.usize()?;
            let ef = EliasFano::from_bytes(r.take(len_bytes)?)?;

            let full = j + 1 < num_blocks;
            if ef.is_empty() || ef.len() > block_size || (full && ef.len() != block_size) {
                return Err(Error::InvalidEncoding(format!(
                    "block {j} holds {} elements with block_size {block_size}",
                    ef.len()
                )));
            }
            let last = ef.select(ef.len() - 1)?;
            let next_base = bases.get(j + 1).copied().unwrap_or(universe);
            let fits = base
                .checked_add(last)
                .is_some_and(|max| max < universe && (!full || max <= next_base));
            if !fits || ef.select(0)? != 0 {
                return Err(Error::InvalidEncoding(format!(
                    "block {j} is not ordered within the universe"
                )));
            }
            directory.push(base, ef.len());
            blocks.push(ef);
        }
        r.finish("UniformlyPartitionedEliasFano")?;

        if directory.len() != n {
            return Err(Error::InvalidEncoding(format!(
                "UPEF n ({n}) does not match sum of block lengths ({})",
                directory.len()
            )));
        }

        log::debug!(
            "UniformlyPartitionedEliasFano::decode n={} universe={} blocks={}",
            n,
            universe,
            num_blocks
        );

        Ok(Self {
            universe,
            directory,
            blocks,
        })
    }

    /// Write the [`UniformlyPartitionedEliasFano::to_bytes`] encoding to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a structure written by [`UniformlyPartitionedEliasFano::write_to`].
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

impl MonotoneSequence for UniformlyPartitionedEliasFano {
    type Iter<'a> = Iter<'a>;

    fn len(&self) -> usize {
        UniformlyPartitionedEliasFano::len(self)
    }

    fn universe(&self) -> u64 {
        self.universe
    }

    fn select(&self, i: usize) -> Result<u64> {
        UniformlyPartitionedEliasFano::select(self, i)
    }

    fn rank(&self, x: u64) -> usize {
        UniformlyPartitionedEliasFano::rank(self, x)
    }

    fn next_geq(&self, x: u64) -> Result<u64> {
        UniformlyPartitionedEliasFano::next_geq(self, x)
    }

    fn next_leq(&self, x: u64) -> Result<u64> {
        UniformlyPartitionedEliasFano::next_leq(self, x)
    }

    fn iter(&self) -> Iter<'_> {
        UniformlyPartitionedEliasFano::iter(self)
    }

    fn bit_length(&self) -> usize {
        UniformlyPartitionedEliasFano::bit_length(self)
    }
}

impl<'a> IntoIterator for &'a UniformlyPartitionedEliasFano {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Ascending cursor over an [`UniformlyPartitionedEliasFano`], block by block.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    upef: &'a UniformlyPartitionedEliasFano,
    block_id: usize,
    inner: Option<(u64, elias_fano::Iter<'a>)>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((base, it)) = &mut self.inner {
                if let Some(v) = it.next() {
                    self.remaining -= 1;
                    return Some(*base + v);
                }
            }
            let block = self.upef.blocks.get(self.block_id)?;
            self.inner = Some((self.upef.directory.base(self.block_id), block.iter()));
            self.block_id += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
