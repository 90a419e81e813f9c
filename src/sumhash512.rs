//! The sumhash512 parameterization: seed `"Algorand"`, n=8, m=1024.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::hash::Digest;
use crate::matrix::{LookupTable, Matrix};

/// The size in bytes of a sumhash512 checksum.
pub const DIGEST_SIZE: usize = 64;

/// The block size in bytes of the sumhash512 hash function.
pub const DIGEST_BLOCK_SIZE: usize = 64;

const SEED: &[u8] = b"Algorand";
const ROWS: usize = 8;
const COLUMNS: usize = 1024;

// Built once per process; every digest shares the ~2 MiB table by
// reference.
static COMPRESSOR: Lazy<Arc<LookupTable>> = Lazy::new(|| {
    let matrix =
        Matrix::from_seed(SEED, ROWS, COLUMNS).expect("the sumhash512 parameters are valid");
    Arc::new(matrix.lookup_table())
});

/// A shared handle to the precomputed sumhash512 compressor.
pub fn compressor() -> Arc<LookupTable> {
    Arc::clone(&COMPRESSOR)
}

/// Creates an unsalted sumhash512 digest: 64-byte output, 64-byte blocks.
pub fn new() -> Digest<Arc<LookupTable>> {
    Digest::new(compressor(), None).expect("the sumhash512 dimensions are valid")
}

/// Creates a salted sumhash512 digest.
///
/// The salt must be exactly [`DIGEST_BLOCK_SIZE`] bytes; it is XORed
/// into every message block before compression.
pub fn new_salted(salt: &[u8]) -> Result<Digest<Arc<LookupTable>>> {
    Digest::new(compressor(), Some(salt.to_vec()))
}
