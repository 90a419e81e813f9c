//! The sumhash compression function: matrix representation, seeded
//! expansion and the byte-indexed lookup-table accelerator.

use std::io::{Read, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use sha3::{digest::ExtendableOutput, Shake256};

use crate::error::{Error, Result};

/// The n-by-m sumhash matrix A with elements in Z_q where q=2^64.
///
/// Row i holds the m columns that feed output lane i. Message bits
/// select columns: bit k of input byte j selects column 8j+k.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Vec<u64>>,
}

impl Matrix {
    /// Fills an n-by-m matrix from `rand`, row-major, reading each
    /// element as 8 little-endian bytes.
    ///
    /// `m` must be a positive multiple of 8 and `n` positive. A short
    /// read or I/O failure from `rand` is returned to the caller.
    pub fn random<R: Read>(mut rand: R, n: usize, m: usize) -> Result<Matrix> {
        if n == 0 || m == 0 {
            return Err(Error::EmptyMatrix);
        }
        if m % 8 != 0 {
            return Err(Error::ColumnsNotByteAligned(m));
        }

        let mut rows = Vec::with_capacity(n);
        for _ in 0..n {
            let mut row = Vec::with_capacity(m);
            for _ in 0..m {
                row.push(rand.read_u64::<LittleEndian>()?);
            }
            rows.push(row);
        }
        Ok(Matrix { rows })
    }

    /// Expands a matrix deterministically from `seed`.
    ///
    /// A SHAKE256 instance absorbs `u16_le(64) || u16_le(n) || u16_le(m)`
    /// followed by the seed bytes, then serves as the byte source for
    /// [`Matrix::random`]. The header domain-separates matrices of
    /// different dimensions derived from the same seed: identical
    /// (n, m, seed) always yields a bitwise-identical matrix.
    pub fn from_seed(seed: &[u8], n: usize, m: usize) -> Result<Matrix> {
        let mut xof = Shake256::default();
        xof.write_all(&64u16.to_le_bytes())?;
        xof.write_all(&(n as u16).to_le_bytes())?;
        xof.write_all(&(m as u16).to_le_bytes())?;
        xof.write_all(seed)?;

        Matrix::random(xof.finalize_xof(), n, m)
    }

    /// Precomputes the per-byte column sums of this matrix.
    ///
    /// The table trades memory (n * m/8 * 256 words) for speed: one
    /// indexed add per input byte instead of 8 conditional adds.
    pub fn lookup_table(&self) -> LookupTable {
        let mut table = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut sums = Vec::with_capacity(row.len() / 8);
            for octet in row.chunks_exact(8) {
                let mut by_byte = [0u64; 256];
                for (b, sum) in by_byte.iter_mut().enumerate() {
                    *sum = sum_bits(octet, b as u8);
                }
                sums.push(by_byte);
            }
            table.push(sums);
        }
        LookupTable { table }
    }

    /// Number of rows (output lanes).
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.rows[0].len()
    }
}

/// Adds the columns of `octet` selected by the bits of `b`, mod 2^64.
///
/// Branchless: each column is masked with 0 or !0 derived from its
/// selector bit, keeping the arithmetic data-independent.
#[inline]
fn sum_bits(octet: &[u64], b: u8) -> u64 {
    let mut x = 0u64;
    for (k, &col) in octet.iter().enumerate() {
        x = x.wrapping_add(col & ((b as u64 >> k) & 1).wrapping_neg());
    }
    x
}

/// Precomputed sums from a matrix for every possible byte of input.
/// Its dimensions are `[n][m/8][256]` u64 words.
#[derive(Clone)]
pub struct LookupTable {
    table: Vec<Vec<[u64; 256]>>,
}

/// The compression function performed on a message block.
///
/// Implementations map `input_len()` message bytes to `output_len()`
/// output bytes holding little-endian u64 lanes. Both [`Matrix`] and
/// [`LookupTable`] implement this with byte-identical results.
pub trait Compressor {
    /// Compresses `msg` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `msg.len() != input_len()` or `dst.len() != output_len()`;
    /// either indicates a caller bug.
    fn compress(&self, dst: &mut [u8], msg: &[u8]);

    /// The message length in bytes accepted by [`compress`](Self::compress).
    fn input_len(&self) -> usize;

    /// The output length in bytes produced by [`compress`](Self::compress).
    fn output_len(&self) -> usize;

    /// Message bytes consumed per compression step of the iterated hash.
    fn block_size(&self) -> usize {
        self.input_len() - self.output_len()
    }
}

impl Compressor for Matrix {
    fn compress(&self, dst: &mut [u8], msg: &[u8]) {
        assert_eq!(
            msg.len(),
            self.input_len(),
            "compress: message is {} bytes, want {}",
            msg.len(),
            self.input_len()
        );
        assert_eq!(
            dst.len(),
            self.output_len(),
            "compress: output is {} bytes, want {}",
            dst.len(),
            self.output_len()
        );

        for (lane, row) in dst.chunks_exact_mut(8).zip(&self.rows) {
            let mut x = 0u64;
            for (j, &byte) in msg.iter().enumerate() {
                x = x.wrapping_add(sum_bits(&row[8 * j..8 * j + 8], byte));
            }
            lane.copy_from_slice(&x.to_le_bytes());
        }
    }

    fn input_len(&self) -> usize {
        self.rows[0].len() / 8
    }

    fn output_len(&self) -> usize {
        self.rows.len() * 8
    }
}

impl Compressor for LookupTable {
    fn compress(&self, dst: &mut [u8], msg: &[u8]) {
        assert_eq!(
            msg.len(),
            self.input_len(),
            "compress: message is {} bytes, want {}",
            msg.len(),
            self.input_len()
        );
        assert_eq!(
            dst.len(),
            self.output_len(),
            "compress: output is {} bytes, want {}",
            dst.len(),
            self.output_len()
        );

        for (lane, sums) in dst.chunks_exact_mut(8).zip(&self.table) {
            let mut x = 0u64;
            for (&byte, by_byte) in msg.iter().zip(sums) {
                x = x.wrapping_add(by_byte[byte as usize]);
            }
            lane.copy_from_slice(&x.to_le_bytes());
        }
    }

    fn input_len(&self) -> usize {
        self.table[0].len()
    }

    fn output_len(&self) -> usize {
        self.table.len() * 8
    }
}

impl<C: Compressor> Compressor for Arc<C> {
    fn compress(&self, dst: &mut [u8], msg: &[u8]) {
        (**self).compress(dst, msg)
    }

    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }
}
