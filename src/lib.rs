//! # Quasi-Succinct Monotone Sequences
//!
//! *Sorted integers in close to the information-theoretic minimum, still searchable.*
//!
//! ## Intuition First
//!
//! Imagine a phone book where, instead of printing every number in full, you
//! print only the last few digits of each entry and, for the leading digits,
//! a tally mark each time the prefix changes. Because the book is sorted, the
//! tallies are tiny, and the whole thing shrinks to about two bits plus the
//! short suffix per entry. With a small index over the tallies you can still
//! open the book at entry $i$, or jump straight to the first entry at or after
//! a given number, without reading anything else.
//!
//! ## The Problem
//!
//! A sorted list of $n$ integers from $[0, m)$ stored as a plain array costs
//! $n \lceil \log_2 m \rceil$ bits. The information-theoretic minimum is about
//! $n \log_2(m/n) + 1.44n$ bits. Gap-coded compression gets close to that but
//! loses random access.
//!
//! ## Historical Context
//!
//! ```text
//! 1971  Fano        Fano's associative memory: early partitioning of bits
//! 1974  Elias       Elias's static file storage: monotone sequences
//! 1989  Jacobson    Defined the succinct paradigm in his PhD thesis (rank/select)
//! 2008  Vigna       Broadword rank9/select9
//! 2013  Vigna       Quasi-succinct indices for posting lists
//! 2014  Ottaviano   Partitioned Elias-Fano indexes
//! ```
//!
//! ## Mathematical Formulation
//!
//! With $l = \lfloor \log_2(m/n) \rfloor$, each value $x_i$ splits into a low
//! part $x_i \bmod 2^l$, stored verbatim, and a high part
//! $h_i = \lfloor x_i / 2^l \rfloor$, stored as a unary gap code in a bit
//! vector whose $i$-th one-bit sits at position $h_i + i$. Then
//!
//! - `select(i)` $= ((\text{select}_1(i) - i) \ll l) \mid \text{low}_i$
//! - `rank(x)` starts at the bucket of $h = x \gg l$, found with
//!   $\text{select}_0(h - 1)$, and compares low parts inside that bucket only.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(1)$ `select`; `rank`, `next_geq`, `next_leq` cost $O(1)$
//!   plus the size of one bucket (expected constant on uniform data).
//! - **Space**: at most $n \lceil \log_2(m/n) \rceil + 3n + 1$ bits of payload
//!   plus a rank/select directory of roughly 25% of the high bits.
//!
//! ## What Could Go Wrong
//!
//! 1. **Static only**: there is no insert or delete; rebuild from the full
//!    sorted sequence instead.
//! 2. **Clustered data**: a single global $l$ wastes bits when values bunch up.
//!    [`UniformlyPartitionedEliasFano`] fixes this with per-block universes.
//! 3. **Universe width**: values are `u64` and the universe is exclusive, so
//!    `u64::MAX` itself cannot be stored.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **`BitBuffer`**: append-only word-packed bits with fixed-width reads.
//! - **`SparseRankSelect`**: Rank9 directory with sampled select over a `BitBuffer`.
//! - **`EliasFano`**: the classical encoding.
//! - **`PartitionDirectory`** / **`UniformlyPartitionedEliasFano`**: fixed-size blocks, each
//!   Elias-Fano encoded over its own base.
//! - **`MonotoneSequence`**: the query trait both encodings implement.
//!
//! Indices are 0-based. `rank(x)` is the insertion point of `x` and never fails.
//!
//! ```
//! use quasi_succinct::{EliasFano, MonotoneSequence, UniformlyPartitionedEliasFano};
//!
//! let values: [u64; 5] = [123, 1343, 2141, 35312, 4343434];
//! let ef = EliasFano::new(&values)?;
//! let upef = UniformlyPartitionedEliasFano::new(&values, 2)?;
//!
//! fn check(seq: &impl MonotoneSequence) -> quasi_succinct::error::Result<()> {
//!     assert_eq!(seq.select(2)?, 2141);
//!     assert_eq!(seq.rank(4343434), 4);
//!     assert_eq!(seq.next_geq(1345)?, 2141);
//!     assert_eq!(seq.next_leq(4343420)?, 35312);
//!     Ok(())
//! }
//! check(&ef)?;
//! check(&upef)?;
//! # Ok::<(), quasi_succinct::Error>(())
//! ```
//!
//! ## References
//!
//! - Elias, P. (1974). "Efficient storage and retrieval by content and address of static files."
//! - Fano, R. (1971). "On the number of bits required to implement an associative memory."
//! - Vigna, S. (2013). "Quasi-succinct indices."
//! - Ottaviano, G., & Venturini, R. (2014). "Partitioned Elias-Fano indexes."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitbuf;
mod codec;
pub mod elias_fano;
pub mod error;
pub mod partition;
pub mod partitioned_elias_fano;
pub mod rank_select;
pub mod sequence;

pub use bitbuf::BitBuffer;
pub use elias_fano::EliasFano;
pub use error::Error;
pub use partition::PartitionDirectory;
pub use partitioned_elias_fano::{
    PartitionOptions, UniformlyPartitionedEliasFano, DEFAULT_BLOCK_SIZE,
};
pub use rank_select::SparseRankSelect;
pub use sequence::MonotoneSequence;
