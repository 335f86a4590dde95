//! Error types for quasi-succinct sequences.

use thiserror::Error;

/// Error variants for construction, queries and decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The input sequence decreases at `index`.
    #[error("sequence is not non-decreasing at index {index}: {previous} > {value}")]
    NotMonotone {
        /// Position of the offending element.
        index: usize,
        /// The element before it.
        previous: u64,
        /// The offending element.
        value: u64,
    },

    /// The declared universe does not cover the largest element.
    #[error("universe {universe} does not cover maximum element {max}")]
    UniverseTooSmall {
        /// Exclusive upper bound in effect.
        universe: u64,
        /// Largest element in the input.
        max: u64,
    },

    /// An index was provided that is out of the structure's bounds.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// No stored element satisfies a successor or predecessor query.
    #[error("no qualifying element for {0}")]
    NotFound(u64),

    /// A bit read reaches past the end of a buffer.
    #[error("bit range {offset}+{width} exceeds buffer length {len}")]
    BitRangeOutOfBounds {
        /// First bit of the read.
        offset: usize,
        /// Width of the read in bits.
        width: usize,
        /// Buffer length in bits.
        len: usize,
    },

    /// A serialized structure could not be decoded.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// An I/O error occurred during serialization or deserialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for quasi-succinct operations.
pub type Result<T> = std::result::Result<T, Error>;
