//! Hashing primitives for the audit chain.

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, chain_hash};
