//! The 32-byte digest type that links the audit chain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Blake2b-256 digest of an audit record.
///
/// Each record's hash incorporates the previous record's hash, forming the
/// chain that makes retroactive edits detectable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHash([u8; 32]);

impl RecordHash {
    /// The zero hash — the `previous_hash` of the first record in a ledger.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordHash({})", hex::encode(&self.0[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hash() {
        assert!(RecordHash::ZERO.is_zero());
        assert!(!RecordHash::new([1u8; 32]).is_zero());
    }

    #[test]
    fn display_is_hex() {
        let h = RecordHash::new([0xab; 32]);
        assert_eq!(h.to_string(), "ab".repeat(32));
    }
}
