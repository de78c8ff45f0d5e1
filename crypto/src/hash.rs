//! Blake2b hashing for audit records.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use pollguard_types::RecordHash;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a record's canonical bytes together with the previous record's hash,
/// producing the next link of the audit chain.
pub fn chain_hash(record_bytes: &[u8], previous: &RecordHash) -> RecordHash {
    RecordHash::new(blake2b_256_multi(&[record_bytes, previous.as_bytes()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"pollguard");
        let h2 = blake2b_256(b"pollguard");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_different_inputs() {
        assert_ne!(blake2b_256(b"voter-a"), blake2b_256(b"voter-b"));
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn chain_hash_depends_on_previous() {
        let a = chain_hash(b"record", &RecordHash::ZERO);
        let b = chain_hash(b"record", &a);
        assert_ne!(a, b);
    }

    #[test]
    fn chain_hash_depends_on_record() {
        let prev = RecordHash::new([7u8; 32]);
        assert_ne!(chain_hash(b"record-1", &prev), chain_hash(b"record-2", &prev));
    }
}
