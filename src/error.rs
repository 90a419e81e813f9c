//! Error types for the crate.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by matrix construction and the streaming digest.
///
/// Buffer-size mismatches inside [`Compressor::compress`] are not listed
/// here: passing a wrongly sized buffer is a caller bug and panics.
///
/// [`Compressor::compress`]: crate::matrix::Compressor::compress
#[derive(Debug, Error)]
pub enum Error {
    /// The requested matrix has zero rows or zero columns.
    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,

    /// The requested column count cannot be split into input bytes.
    #[error("{0} columns is not a multiple of 8")]
    ColumnsNotByteAligned(usize),

    /// The compressor leaves no room for message bytes in a block.
    #[error("compression input length {input} does not exceed output length {output}")]
    BlockSizeNotPositive {
        /// Compression input length in bytes.
        input: usize,
        /// Compression output length in bytes.
        output: usize,
    },

    /// The block is too short for the 16-byte bit-length suffix.
    #[error("block size {0} cannot hold the 16-byte length suffix")]
    BlockTooSmall(usize),

    /// A salt was supplied whose length is not exactly one block.
    #[error("bad salt size: want {want}, got {got}")]
    SaltSize {
        /// Required salt length (one block) in bytes.
        want: usize,
        /// Length of the salt that was supplied.
        got: usize,
    },

    /// Accepting the write would overflow the 64-bit bit counter.
    #[error("length overflow: {written} bytes written, {requested} more requested")]
    LengthOverflow {
        /// Bytes consumed since the last reset.
        written: u64,
        /// Size of the rejected write.
        requested: usize,
    },

    /// The matrix byte source failed or ran out of bytes.
    #[error("reading matrix entries: {0}")]
    Io(#[from] std::io::Error),
}
