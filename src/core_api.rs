//! RustCrypto `digest` trait bindings for sumhash512.

use std::fmt;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use digest::{
    block_buffer::Eager,
    core_api::{AlgorithmName, Buffer, BufferKindUser, CoreWrapper, FixedOutputCore, UpdateCore},
    crypto_common::{Block, BlockSizeUser},
    typenum::U64,
    HashMarker, Output, OutputSizeUser, Reset,
};

use crate::matrix::{Compressor, LookupTable};
use crate::sumhash512::{self, DIGEST_BLOCK_SIZE, DIGEST_SIZE};

/// sumhash512 behind the `digest` crate interface.
///
/// ```
/// use digest::{FixedOutput, Update};
/// use subsetsum::core_api::Sumhash512;
///
/// let mut h = Sumhash512::default();
/// h.update(b"some data");
/// let digest = h.finalize_fixed();
/// # assert_eq!(digest.len(), 64);
/// ```
pub type Sumhash512 = CoreWrapper<Sumhash512Core>;

/// Core sumhash512 state for [`CoreWrapper`].
///
/// Produces the same digests as [`sumhash512::new`] and
/// [`sumhash512::new_salted`] in their respective modes.
#[derive(Clone)]
pub struct Sumhash512Core {
    c: Arc<LookupTable>,
    h: [u8; DIGEST_SIZE],
    len: u64,
    salt: Option<[u8; DIGEST_BLOCK_SIZE]>,
}

impl Sumhash512Core {
    /// Creates an unsalted core.
    pub fn new() -> Self {
        Self::with_salt(None)
    }

    /// Creates a core that XORs `salt` into every message block.
    pub fn new_salted(salt: [u8; DIGEST_BLOCK_SIZE]) -> Self {
        Self::with_salt(Some(salt))
    }

    fn with_salt(salt: Option<[u8; DIGEST_BLOCK_SIZE]>) -> Self {
        let mut core = Sumhash512Core {
            c: sumhash512::compressor(),
            h: [0; DIGEST_SIZE],
            len: 0,
            salt,
        };
        core.init();
        core
    }

    fn init(&mut self) {
        self.h = [0; DIGEST_SIZE];
        self.len = 0;
        if self.salt.is_some() {
            // Absorb one zero block so the salt acts as a prefix of the
            // input.
            self.compress_block(&[0; DIGEST_BLOCK_SIZE]);
        }
    }

    fn compress_block(&mut self, block: &[u8]) {
        let mut cin = [0u8; DIGEST_SIZE + DIGEST_BLOCK_SIZE];
        cin[..DIGEST_SIZE].copy_from_slice(&self.h);
        match self.salt {
            Some(ref salt) => {
                for ((c, &b), &s) in cin[DIGEST_SIZE..].iter_mut().zip(block).zip(salt.iter()) {
                    *c = b ^ s;
                }
            }
            None => cin[DIGEST_SIZE..].copy_from_slice(block),
        }
        self.c.compress(&mut self.h, &cin);
        self.len += DIGEST_BLOCK_SIZE as u64;
    }
}

impl Default for Sumhash512Core {
    fn default() -> Self {
        Self::new()
    }
}

impl HashMarker for Sumhash512Core {}

impl BlockSizeUser for Sumhash512Core {
    type BlockSize = U64;
}

impl BufferKindUser for Sumhash512Core {
    type BufferKind = Eager;
}

impl OutputSizeUser for Sumhash512Core {
    type OutputSize = U64;
}

impl UpdateCore for Sumhash512Core {
    fn update_blocks(&mut self, blocks: &[Block<Self>]) {
        for block in blocks {
            self.compress_block(block);
        }
    }
}

impl FixedOutputCore for Sumhash512Core {
    fn finalize_fixed_core(&mut self, buffer: &mut Buffer<Self>, out: &mut Output<Self>) {
        let bitlen = (self.len + buffer.get_pos() as u64) << 3;
        let mut suffix = [0u8; 16];
        LittleEndian::write_u64(&mut suffix[..8], bitlen);
        buffer.digest_pad(0x80, &suffix, |block| self.compress_block(block));
        out.copy_from_slice(&self.h);
    }
}

impl Reset for Sumhash512Core {
    fn reset(&mut self) {
        self.init();
    }
}

impl AlgorithmName for Sumhash512Core {
    fn write_alg_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sumhash512")
    }
}
