#![warn(missing_docs)]
//! The subset-sum hash function.
//!
//! sumhash is an unkeyed cryptographic compression function over Z/2^64:
//! a public n-by-m matrix of 64-bit words defines a map in which every
//! input bit selects one matrix column, and the selected columns are
//! added lane-wise with wrapping arithmetic. A Merkle–Damgård iteration
//! on top of it turns the compression function into a streaming hash
//! with an optional block-sized salt.
//!
//! The [`sumhash512`] module carries the fixed parameterization used by
//! the Algorand ecosystem: the matrix is expanded from the seed
//! `"Algorand"` with n=8 and m=1024, producing 64-byte digests over
//! 64-byte blocks.
//!
//! # Examples
//!
//! Hashing with the fixed sumhash512 parameters:
//!
//! ```
//! use subsetsum::sumhash512;
//!
//! # fn main() -> subsetsum::Result<()> {
//! let mut h = sumhash512::new();
//! h.write(b"hello world")?;
//! println!("{}", hex::encode(h.sum(Vec::new())));
//! # Ok(())
//! # }
//! ```
//!
//! Salted mode requires a salt of exactly one block:
//!
//! ```
//! use subsetsum::sumhash512;
//!
//! # fn main() -> subsetsum::Result<()> {
//! let salt = vec![0x13; sumhash512::DIGEST_BLOCK_SIZE];
//! let mut h = sumhash512::new_salted(&salt)?;
//! h.write(b"hello world")?;
//! let digest = h.sum(Vec::new());
//! # assert_eq!(digest.len(), 64);
//! # Ok(())
//! # }
//! ```
//!
//! The [`core_api`] module exposes the same function through the
//! RustCrypto `digest` traits:
//!
//! ```
//! use digest::{FixedOutput, Update};
//! use subsetsum::core_api::Sumhash512;
//!
//! let mut h = Sumhash512::default();
//! h.update(b"hello world");
//! println!("{}", hex::encode(h.finalize_fixed()));
//! ```

pub mod core_api;
pub mod error;
pub mod hash;
pub mod matrix;
pub mod sumhash512;

pub use error::{Error, Result};
pub use hash::Digest;
pub use matrix::{Compressor, LookupTable, Matrix};
