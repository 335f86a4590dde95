//! Elias-Fano encoding for monotone sequences.
//!
//! Provides near-optimal space for sorted integers while allowing
//! $O(1)$ random access to any element and fast successor/predecessor
//! search.
//!
//! # Theory
//!
//! For $n$ sorted integers in range $[0, U)$, Elias-Fano uses:
//! - $L = \lfloor \log_2(U/n) \rfloor$ bits for each "lower" part, stored
//!   explicitly at fixed width.
//! - A bit vector for the "upper" parts: for each element, a run of zeros
//!   equal to the gap from the previous upper part, then a one. The $i$-th
//!   one sits at position $\text{upper}_i + i$.
//!
//! The upper bit vector is padded to exactly $\lfloor (U-1)/2^L \rfloor + 1$
//! zeros, so every bucket of the universe is closed by a zero.
//!
//! Total space is at most $n \lceil \log_2(U/n) \rceil + 3n + 1$ bits, plus
//! the rank/select directory over the upper bits.

use std::io::{Read, Write};
use std::iter::FusedIterator;

use crate::bitbuf::BitBuffer;
use crate::codec::{put_bits, put_u64, ByteReader};
use crate::error::{Error, Result};
use crate::rank_select::SparseRankSelect;
use crate::sequence::MonotoneSequence;

const MAGIC: &[u8; 8] = b"QSEFCL01";

/// Check that `values` is non-decreasing and fits below `universe`.
pub(crate) fn validate(values: &[u64], universe: u64) -> Result<()> {
    for (index, pair) in values.windows(2).enumerate() {
        if pair[0] > pair[1] {
            return Err(Error::NotMonotone {
                index: index + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    match values.last() {
        Some(&max) if max >= universe => Err(Error::UniverseTooSmall { universe, max }),
        _ => Ok(()),
    }
}

/// Validate `values` and return the smallest universe that covers them.
pub(crate) fn implied_universe(values: &[u64]) -> Result<u64> {
    validate(values, u64::MAX)?;
    Ok(values.last().map_or(0, |&max| max + 1))
}

/// L = floor(log2(U/n)), or 0 when `n == 0` or `U < n`.
fn low_bits_width(universe: u64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let ratio = universe / n as u64;
    if ratio > 0 {
        (63 - ratio.leading_zeros()) as usize
    } else {
        0
    }
}

/// Elias-Fano encoding structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliasFano {
    high_bits: SparseRankSelect,
    low_bits: BitBuffer,
    low_len: usize,
    universe: u64,
    n: usize,
}

impl EliasFano {
    /// Create a new Elias-Fano structure from a sorted sequence, using
    /// `max + 1` as the universe.
    ///
    /// # Errors
    ///
    /// [`Error::NotMonotone`] if `values` decreases anywhere, and
    /// [`Error::UniverseTooSmall`] if it contains `u64::MAX`.
    pub fn new(values: &[u64]) -> Result<Self> {
        let universe = implied_universe(values)?;
        Ok(Self::build(values, universe))
    }

    /// Create a new Elias-Fano structure over an explicit universe.
    ///
    /// # Errors
    ///
    /// [`Error::NotMonotone`] if `values` decreases anywhere, and
    /// [`Error::UniverseTooSmall`] if any value is `>= universe`.
    pub fn with_universe(values: &[u64], universe: u64) -> Result<Self> {
        validate(values, universe)?;
        Ok(Self::build(values, universe))
    }

    /// Encode already-validated values.
    pub(crate) fn build(values: &[u64], universe: u64) -> Self {
        let n = values.len();
        let l = low_bits_width(universe, n);

        let mut low_bits = BitBuffer::with_capacity(n * l);
        for &v in values {
            low_bits.append_bits(v, l);
        }

        let num_zeros = if n == 0 {
            0
        } else {
            ((universe - 1) >> l) as usize + 1
        };
        let mut upper = BitBuffer::with_capacity(n + num_zeros);
        let mut prev_high = 0usize;
        for &v in values {
            let high = (v >> l) as usize;
            upper.append_zeros(high - prev_high);
            upper.append_one();
            prev_high = high;
        }
        upper.append_zeros(num_zeros - prev_high);

        log::debug!(
            "EliasFano::build n={} universe={} low_len={} upper_bits={}",
            n,
            universe,
            l,
            upper.len()
        );

        Self {
            high_bits: SparseRankSelect::new(upper),
            low_bits,
            low_len: l,
            universe,
            n,
        }
    }

    /// Return the number of elements.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the sequence has 0 elements.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Exclusive upper bound on stored values.
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Width of the explicitly stored lower part of each value.
    pub fn low_len(&self) -> usize {
        self.low_len
    }

    /// Bits of encoded payload (lower bits plus upper bits), excluding the
    /// rank/select directory.
    pub fn bit_length(&self) -> usize {
        self.low_bits.len() + self.high_bits.len()
    }

    /// Bits spent on the rank/select directory over the upper bits.
    pub fn directory_bits(&self) -> usize {
        self.high_bits.directory_bits()
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.low_bits.heap_bytes() + self.high_bits.heap_bytes()
    }

    #[inline]
    fn low(&self, i: usize) -> u64 {
        self.low_bits.read_bits_unchecked(i * self.low_len, self.low_len)
    }

    /// Return the value at index `i`.
    pub fn select(&self, i: usize) -> Result<u64> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        let pos = self.high_bits.select1(i)?;
        let high = (pos - i) as u64;
        Ok((high << self.low_len) | self.low(i))
    }

    /// Alias for [`EliasFano::select`].
    pub fn get(&self, i: usize) -> Result<u64> {
        self.select(i)
    }

    /// Return the number of elements strictly less than `x`.
    ///
    /// This is the insertion point of `x`: `0` when `x` is at most the
    /// minimum, `len()` when `x` exceeds the maximum.
    pub fn rank(&self, x: u64) -> usize {
        if self.n == 0 {
            return 0;
        }
        if x >= self.universe {
            return self.n;
        }

        let high = (x >> self.low_len) as usize;
        let low = x & crate::bitbuf::low_mask(self.low_len);

        // Bucket `high` starts right after the `high`-th zero.
        let mut pos = if high == 0 {
            0
        } else {
            match self.high_bits.select0(high - 1) {
                Ok(p) => p + 1,
                Err(_) => return self.n,
            }
        };
        let mut rank = self.high_bits.rank1(pos);

        while self.high_bits.get(pos) && self.low(rank) < low {
            rank += 1;
            pos += 1;
        }
        rank
    }

    /// Return the smallest element `>= x`.
    pub fn next_geq(&self, x: u64) -> Result<u64> {
        let i = self.rank(x);
        if i == self.n {
            return Err(Error::NotFound(x));
        }
        self.select(i)
    }

    /// Return the largest element `<= x`.
    pub fn next_leq(&self, x: u64) -> Result<u64> {
        let i = match x.checked_add(1) {
            Some(next) => self.rank(next),
            None => self.n,
        };
        if i == 0 {
            return Err(Error::NotFound(x));
        }
        self.select(i - 1)
    }

    /// Iterate over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ef: self,
            front: 0,
            back: self.n,
        }
    }

    /// Serialize this structure to a stable binary encoding (little-endian).
    ///
    /// Format (versioned):
    /// - magic: 8 bytes (`QSEFCL01`)
    /// - n: u64
    /// - universe: u64
    /// - low_len: u64
    /// - lower bits: len_bits u64, then `ceil(len_bits / 64)` u64 words
    /// - upper bits: len_bits u64, then `ceil(len_bits / 64)` u64 words
    ///
    /// The rank/select directory is rebuilt on load.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(48 + self.heap_bytes());
        out.extend_from_slice(MAGIC);
        put_u64(&mut out, self.n as u64);
        put_u64(&mut out, self.universe);
        put_u64(&mut out, self.low_len as u64);
        put_bits(&mut out, &self.low_bits);
        put_bits(&mut out, self.high_bits.bits());
        out
    }

    /// Deserialize an Elias-Fano structure from `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let ef = Self::decode(&mut r)?;
        r.finish("EliasFano")?;
        Ok(ef)
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        r.magic(MAGIC, "EliasFano")?;
        let n = r.usize()?;
        let universe = r.u64()?;
        let low_len = r.usize()?;
        let low_bits = r.bits()?;
        let upper = r.bits()?;

        if low_len != low_bits_width(universe, n) {
            return Err(Error::InvalidEncoding(format!(
                "low_len {low_len} inconsistent with n={n}, universe={universe}"
            )));
        }
        if n > 0 && universe == 0 {
            return Err(Error::InvalidEncoding(
                "non-empty sequence with empty universe".to_string(),
            ));
        }
        if Some(low_bits.len()) != n.checked_mul(low_len) {
            return Err(Error::InvalidEncoding(format!(
                "lower bits hold {} bits, expected {n} x {low_len}",
                low_bits.len()
            )));
        }
        let num_zeros = if n == 0 {
            0
        } else {
            ((universe - 1) >> low_len) as usize + 1
        };
        if Some(upper.len()) != n.checked_add(num_zeros) {
            return Err(Error::InvalidEncoding(format!(
                "upper bits hold {} bits, expected {}",
                upper.len(),
                n.saturating_add(num_zeros)
            )));
        }
        // The last bucket is always closed by a zero; this bounds every
        // upper part by `(universe - 1) >> low_len`.
        if n > 0 && upper.get(upper.len() - 1) {
            return Err(Error::InvalidEncoding(
                "upper bits do not end with a zero".to_string(),
            ));
        }
        let high_bits = SparseRankSelect::new(upper);
        if high_bits.count_ones() != n {
            return Err(Error::InvalidEncoding(format!(
                "upper bits hold {} ones, expected {n}",
                high_bits.count_ones()
            )));
        }

        let ef = Self {
            high_bits,
            low_bits,
            low_len,
            universe,
            n,
        };
        if n > 0 && ef.select(n - 1)? >= universe {
            return Err(Error::InvalidEncoding(
                "largest element exceeds universe".to_string(),
            ));
        }
        log::debug!(
            "EliasFano::decode n={} universe={} low_len={}",
            n,
            universe,
            low_len
        );
        Ok(ef)
    }

    /// Write the [`EliasFano::to_bytes`] encoding to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a structure written by [`EliasFano::write_to`].
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

impl MonotoneSequence for EliasFano {
    type Iter<'a> = Iter<'a>;

    fn len(&self) -> usize {
        self.n
    }

    fn universe(&self) -> u64 {
        self.universe
    }

    fn select(&self, i: usize) -> Result<u64> {
        EliasFano::select(self, i)
    }

    fn rank(&self, x: u64) -> usize {
        EliasFano::rank(self, x)
    }

    fn next_geq(&self, x: u64) -> Result<u64> {
        EliasFano::next_geq(self, x)
    }

    fn next_leq(&self, x: u64) -> Result<u64> {
        EliasFano::next_leq(self, x)
    }

    fn iter(&self) -> Iter<'_> {
        EliasFano::iter(self)
    }

    fn bit_length(&self) -> usize {
        EliasFano::bit_length(self)
    }
}

impl<'a> IntoIterator for &'a EliasFano {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Ascending cursor over an [`EliasFano`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    ef: &'a EliasFano,
    front: usize,
    back: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.front >= self.back {
            return None;
        }
        let v = self.ef.select(self.front).ok()?;
        self.front += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<u64> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.ef.select(self.back).ok()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
