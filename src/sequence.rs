//! The query surface shared by every monotone sequence encoding.
//!
//! [`EliasFano`](crate::EliasFano) and
//! [`UniformlyPartitionedEliasFano`](crate::UniformlyPartitionedEliasFano) are
//! interchangeable behind this trait: callers pick the encoding at
//! construction time and write their queries once.

use crate::error::Result;

/// Number of bits needed to write any value in `[0, universe)` at fixed width.
pub(crate) fn fixed_width_bits(universe: u64) -> usize {
    if universe <= 1 {
        0
    } else {
        (64 - (universe - 1).leading_zeros()) as usize
    }
}

/// A static, non-decreasing sequence of `u64` drawn from `[0, universe)`.
///
/// All indices are 0-based.
pub trait MonotoneSequence {
    /// Ascending iterator over the stored values.
    type Iter<'a>: Iterator<Item = u64>
    where
        Self: 'a;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// Return true if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exclusive upper bound on stored values.
    fn universe(&self) -> u64;

    /// The `i`-th smallest value.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`](crate::Error::IndexOutOfBounds) if `i >= len()`.
    fn select(&self, i: usize) -> Result<u64>;

    /// Alias for [`MonotoneSequence::select`].
    fn get(&self, i: usize) -> Result<u64> {
        self.select(i)
    }

    /// Number of stored values strictly less than `x`.
    fn rank(&self, x: u64) -> usize;

    /// Smallest stored value `>= x`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if every value is below `x`.
    fn next_geq(&self, x: u64) -> Result<u64>;

    /// Largest stored value `<= x`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if every value is above `x`.
    fn next_leq(&self, x: u64) -> Result<u64>;

    /// A fresh cursor over the values in ascending order.
    fn iter(&self) -> Self::Iter<'_>;

    /// Bits of encoded payload.
    fn bit_length(&self) -> usize;

    /// Size of a plain fixed-width array over the same universe divided by
    /// [`MonotoneSequence::bit_length`]. Zero when nothing is encoded.
    fn compression_ratio(&self) -> f64 {
        let bits = self.bit_length();
        if bits == 0 {
            return 0.0;
        }
        (self.len() * fixed_width_bits(self.universe())) as f64 / bits as f64
    }

    /// Values `y` with `y & mask == pattern & mask`, ascending.
    fn matching(&self, pattern: u64, mask: u64) -> Matching<Self::Iter<'_>> {
        Matching {
            inner: self.iter(),
            pattern: pattern & mask,
            mask,
        }
    }
}

/// Iterator returned by [`MonotoneSequence::matching`].
#[derive(Debug, Clone)]
pub struct Matching<I> {
    inner: I,
    pattern: u64,
    mask: u64,
}

impl<I: Iterator<Item = u64>> Iterator for Matching<I> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let (pattern, mask) = (self.pattern, self.mask);
        self.inner.find(|&v| v & mask == pattern)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_bits_matches_ceil_log2() {
        assert_eq!(fixed_width_bits(0), 0);
        assert_eq!(fixed_width_bits(1), 0);
        assert_eq!(fixed_width_bits(2), 1);
        assert_eq!(fixed_width_bits(3), 2);
        assert_eq!(fixed_width_bits(4), 2);
        assert_eq!(fixed_width_bits(5), 3);
        assert_eq!(fixed_width_bits(1 << 40), 40);
        assert_eq!(fixed_width_bits(u64::MAX), 64);
    }
}
