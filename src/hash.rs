//! Merkle–Damgård iteration over a sumhash compressor.

use std::mem;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::matrix::Compressor;

/// A streaming sumhash digest.
///
/// Each compression step consumes one block of `block_size()` message
/// bytes: the compressor input is the current chaining value followed by
/// the (optionally salted) block. Finalization pads with `0x80`, zero
/// bytes and a 128-bit little-endian bit count, ending exactly on a
/// block boundary.
///
/// The struct layout follows the classic iterated-hash shape: a chaining
/// value, a partial-block buffer with its fill level, and a running byte
/// count.
#[derive(Clone)]
pub struct Digest<C: Compressor> {
    c: C,
    size: usize,
    block_size: usize,

    h: Vec<u8>,    // chaining value, little-endian u64 lanes
    x: Vec<u8>,    // partial-block buffer
    nx: usize,     // bytes buffered in x
    len: u64,      // bytes consumed since the last reset

    salt: Option<Vec<u8>>,
}

impl<C: Compressor + Clone> Digest<C> {
    /// Creates a digest over the compressor `c`.
    ///
    /// In salted mode the salt must be exactly `block_size` bytes; it is
    /// XORed into every message block before compression. Construction
    /// fails if the compressor leaves no room for message bytes
    /// (`input_len <= output_len`), if the block cannot hold the 16-byte
    /// length suffix, or on a salt-size mismatch.
    pub fn new(c: C, salt: Option<Vec<u8>>) -> Result<Digest<C>> {
        let input_len = c.input_len();
        let output_len = c.output_len();
        if input_len <= output_len {
            return Err(Error::BlockSizeNotPositive {
                input: input_len,
                output: output_len,
            });
        }
        let block_size = input_len - output_len;
        if block_size < 16 {
            return Err(Error::BlockTooSmall(block_size));
        }
        if let Some(ref salt) = salt {
            if salt.len() != block_size {
                return Err(Error::SaltSize {
                    want: block_size,
                    got: salt.len(),
                });
            }
        }

        let mut d = Digest {
            c,
            size: output_len,
            block_size,
            h: vec![0; output_len],
            x: vec![0; block_size],
            nx: 0,
            len: 0,
            salt,
        };
        d.reset();
        Ok(d)
    }

    /// Returns the digest to its initial state.
    ///
    /// In salted mode one all-zero block is absorbed immediately, so the
    /// salt acts as a prefix of the hashed input: the chaining value
    /// becomes `C(0 || 0^block_size XOR salt)` and `len` starts at
    /// `block_size`.
    pub fn reset(&mut self) {
        self.h.fill(0);
        self.nx = 0;
        self.len = 0;

        if self.salt.is_some() {
            let zeros = vec![0u8; self.block_size];
            self.len = self.block_size as u64;
            self.ingest(&zeros);
        }
    }

    /// Digest length in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Message bytes consumed per compression step.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Absorbs `p`, returning the number of bytes accepted (always
    /// `p.len()` on success).
    ///
    /// Fails without consuming anything if the total byte count would
    /// reach 2^61, the point at which the bit count no longer fits the
    /// 64-bit length suffix.
    pub fn write(&mut self, p: &[u8]) -> Result<usize> {
        let nn = p.len();
        if nn as u64 >= (1 << 61) - self.len {
            return Err(Error::LengthOverflow {
                written: self.len,
                requested: nn,
            });
        }

        self.len += nn as u64;
        self.ingest(p);
        Ok(nn)
    }

    /// Appends the current digest to `prefix` and returns it.
    ///
    /// Finalization runs on a snapshot: the caller may keep writing to
    /// and summing the live digest afterwards.
    pub fn sum(&self, mut prefix: Vec<u8>) -> Vec<u8> {
        let mut d = self.clone();
        let digest = d.check_sum();
        prefix.extend_from_slice(&digest);
        prefix
    }

    /// Buffers `p`, compressing every full block as it forms.
    fn ingest(&mut self, mut p: &[u8]) {
        if self.nx > 0 {
            // Top up the partial block first.
            let n = p.len().min(self.block_size - self.nx);
            self.x[self.nx..self.nx + n].copy_from_slice(&p[..n]);
            self.nx += n;
            if self.nx == self.block_size {
                let x = mem::take(&mut self.x);
                self.blocks(&x);
                self.x = x;
                self.nx = 0;
            }
            p = &p[n..];
        }
        if p.len() >= self.block_size {
            let n = p.len() / self.block_size * self.block_size;
            self.blocks(&p[..n]);
            p = &p[n..];
        }
        if !p.is_empty() {
            self.x[..p.len()].copy_from_slice(p);
            self.nx = p.len();
        }
    }

    /// Compresses full blocks of data. `data.len()` must be a multiple
    /// of the block size.
    fn blocks(&mut self, data: &[u8]) {
        let mut cin = vec![0u8; self.c.input_len()];
        for block in data.chunks_exact(self.block_size) {
            cin[..self.size].copy_from_slice(&self.h);
            match self.salt {
                Some(ref salt) => {
                    for ((c, &b), &s) in cin[self.size..].iter_mut().zip(block).zip(salt) {
                        *c = b ^ s;
                    }
                }
                None => cin[self.size..].copy_from_slice(block),
            }
            self.c.compress(&mut self.h, &cin);
        }
    }

    fn check_sum(&mut self) -> Vec<u8> {
        let b = self.block_size as u64;
        let p = b - 16;
        let bitlen = self.len << 3;

        // 0x80 then zeros, stopping 16 bytes short of a block boundary.
        let mut tmp = vec![0u8; self.block_size];
        tmp[0] = 0x80;
        let rem = self.len % b;
        let pad = if rem < p { p - rem } else { b + p - rem };
        self.ingest(&tmp[..pad as usize]);

        // 128-bit little-endian bit count; the high half is always zero
        // because len is a u64.
        LittleEndian::write_u64(&mut tmp[..8], bitlen);
        LittleEndian::write_u64(&mut tmp[8..16], 0);
        self.ingest(&tmp[..16]);

        assert_eq!(self.nx, 0, "padding did not drain the block buffer");
        self.h.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matrix::Matrix;
    use anyhow::Result;
    use sha3::{digest::ExtendableOutput, Shake256};
    use std::io::Read;

    fn params_agree(n: usize, m: usize) -> Result<()> {
        let mut xof = Shake256::default().finalize_xof();
        let a = Matrix::random(&mut xof, n, m)?;
        let at = a.lookup_table();
        let input_len = a.input_len();

        let mut h1 = Digest::new(a, None)?;
        let mut h2 = Digest::new(at, None)?;
        assert_eq!(h1.size(), n * 8);
        assert_eq!(h2.size(), n * 8);
        assert_eq!(h1.block_size(), m / 8 - n * 8);
        assert_eq!(h2.block_size(), m / 8 - n * 8);

        for l in [1, 64, 100, 128, input_len, 6000, 6007] {
            let mut msg = vec![0u8; l];
            xof.read_exact(&mut msg)?;

            h1.write(&msg)?;
            h2.write(&msg)?;
            assert_eq!(
                h1.sum(Vec::new()),
                h2.sum(Vec::new()),
                "matrix and lookup table digests differ at length {l}"
            );

            h1.reset();
            h2.reset();
        }
        Ok(())
    }

    #[test]
    fn matrix_and_lookup_table_agree() -> Result<()> {
        params_agree(14, 14 * 64 * 4)?;
        params_agree(10, 10 * 64 * 2)
    }

    #[test]
    fn chunking_does_not_change_the_digest() -> Result<()> {
        let a = Matrix::from_seed(b"chunks", 4, 4 * 64 * 2)?;
        let mut msg = vec![0u8; 6007];
        Shake256::default().finalize_xof().read_exact(&mut msg)?;

        let mut whole = Digest::new(a.clone(), None)?;
        whole.write(&msg)?;
        let want = whole.sum(Vec::new());

        for chunk in [1, 7, 63, 64, 65, 128, 1000] {
            let mut h = Digest::new(a.clone(), None)?;
            for piece in msg.chunks(chunk) {
                assert_eq!(h.write(piece)?, piece.len());
            }
            assert_eq!(h.sum(Vec::new()), want, "chunk size {chunk} diverged");
        }
        Ok(())
    }

    #[test]
    fn sum_does_not_disturb_streaming() -> Result<()> {
        let a = Matrix::from_seed(b"snapshot", 4, 4 * 64 * 2)?;
        let mut msg = vec![0u8; 300];
        Shake256::default().finalize_xof().read_exact(&mut msg)?;

        let mut all_at_once = Digest::new(a.clone(), None)?;
        all_at_once.write(&msg)?;
        let want = all_at_once.sum(Vec::new());

        let mut h = Digest::new(a, None)?;
        h.write(&msg[..150])?;
        let early = h.sum(Vec::new());
        h.write(&msg[150..])?;
        assert_eq!(h.sum(Vec::new()), want, "summing mid-stream changed the state");
        assert_ne!(early, want);
        Ok(())
    }

    #[test]
    fn sum_appends_to_the_prefix() -> Result<()> {
        let a = Matrix::from_seed(b"prefix", 4, 4 * 64 * 2)?;
        let mut h = Digest::new(a, None)?;
        h.write(b"some input")?;

        let bare = h.sum(Vec::new());
        let prefixed = h.sum(vec![0xab; 17]);
        assert_eq!(prefixed.len(), 17 + bare.len());
        assert_eq!(&prefixed[..17], &[0xab; 17][..]);
        assert_eq!(&prefixed[17..], &bare[..]);
        Ok(())
    }

    #[test]
    fn reset_matches_a_fresh_digest() -> Result<()> {
        let a = Matrix::from_seed(b"reset", 4, 4 * 64 * 2)?;
        let salt = vec![0x5a; 4 * 64 * 2 / 8 - 4 * 8];

        for salt in [None, Some(salt)] {
            let mut fresh = Digest::new(a.clone(), salt.clone())?;
            fresh.write(b"payload")?;
            let want = fresh.sum(Vec::new());

            let mut reused = Digest::new(a.clone(), salt)?;
            reused.write(b"something else entirely")?;
            reused.reset();
            reused.write(b"payload")?;
            assert_eq!(reused.sum(Vec::new()), want);
        }
        Ok(())
    }

    #[test]
    fn salted_and_unsalted_diverge() -> Result<()> {
        let a = Matrix::from_seed(b"salted", 4, 4 * 64 * 2)?;
        let block_size = a.input_len() - a.output_len();

        let mut unsalted = Digest::new(a.clone(), None)?;
        let mut salted = Digest::new(a.clone(), Some(vec![0x77; block_size]))?;
        let mut other_salt = Digest::new(a, Some(vec![0x78; block_size]))?;

        unsalted.write(b"input")?;
        salted.write(b"input")?;
        other_salt.write(b"input")?;

        let d1 = unsalted.sum(Vec::new());
        let d2 = salted.sum(Vec::new());
        let d3 = other_salt.sum(Vec::new());
        assert_ne!(d1, d2);
        assert_ne!(d2, d3);
        Ok(())
    }

    #[test]
    fn rejects_bad_construction() -> Result<()> {
        // 1 row, 64 columns: input and output are both 8 bytes.
        let square = Matrix::from_seed(b"square", 1, 64)?;
        assert!(matches!(
            Digest::new(square, None),
            Err(Error::BlockSizeNotPositive { input: 8, output: 8 })
        ));

        // 1 row, 128 columns: 8 bytes of block cannot hold the suffix.
        let narrow = Matrix::from_seed(b"narrow", 1, 128)?;
        assert!(matches!(
            Digest::new(narrow, None),
            Err(Error::BlockTooSmall(8))
        ));

        let a = Matrix::from_seed(b"saltcheck", 4, 4 * 64 * 2)?;
        let block_size = a.input_len() - a.output_len();
        assert!(matches!(
            Digest::new(a, Some(vec![0u8; block_size - 1])),
            Err(Error::SaltSize { .. })
        ));
        Ok(())
    }
}
