//! Audit log storage — sequenced record bytes plus history indices.
//!
//! The store deals in opaque serialized records; hashing, sequencing policy,
//! and deserialization live in `pollguard-ledger`, which is the single
//! writer. Backends persist records under their sequence number and maintain
//! the per-terminal and per-voter indices the fraud rules query.

use crate::StoreError;
use pollguard_types::{RecordHash, TerminalId, Timestamp, VoterId};

/// Trait for the append-only audit log.
pub trait AuditStore: Send + Sync {
    /// Persist a sealed record under `sequence`.
    ///
    /// The caller guarantees `sequence` is the current head + 1 (the ledger
    /// serializes appends); the backend must still reject gaps so a second
    /// writer can never silently fork the chain. The append — record bytes,
    /// head pointer, and all indices — must be atomic: a reader never
    /// observes a partially applied append.
    #[allow(clippy::too_many_arguments)]
    fn append(
        &self,
        sequence: u64,
        voter: &VoterId,
        terminal: &TerminalId,
        recorded_at: Timestamp,
        hash: &RecordHash,
        record_bytes: &[u8],
    ) -> Result<(), StoreError>;

    /// The last appended record's `(sequence, hash)`, or `None` if empty.
    fn head(&self) -> Result<Option<(u64, RecordHash)>, StoreError>;

    /// Fetch a record's serialized bytes by sequence number.
    fn get(&self, sequence: u64) -> Result<Vec<u8>, StoreError>;

    /// Count records for `terminal` with `recorded_at >= cutoff`.
    fn count_by_terminal_since(
        &self,
        terminal: &TerminalId,
        cutoff: Timestamp,
    ) -> Result<u64, StoreError>;

    /// The most recent record for `voter`, if any.
    fn last_by_voter(&self, voter: &VoterId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All records with `recorded_at >= cutoff`, oldest first.
    /// Used to assemble the model's training window.
    fn scan_since(&self, cutoff: Timestamp) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Total number of records.
    fn record_count(&self) -> Result<u64, StoreError>;
}

impl<T: AuditStore + ?Sized> AuditStore for std::sync::Arc<T> {
    fn append(
        &self,
        sequence: u64,
        voter: &VoterId,
        terminal: &TerminalId,
        recorded_at: Timestamp,
        hash: &RecordHash,
        record_bytes: &[u8],
    ) -> Result<(), StoreError> {
        (**self).append(sequence, voter, terminal, recorded_at, hash, record_bytes)
    }

    fn head(&self) -> Result<Option<(u64, RecordHash)>, StoreError> {
        (**self).head()
    }

    fn get(&self, sequence: u64) -> Result<Vec<u8>, StoreError> {
        (**self).get(sequence)
    }

    fn count_by_terminal_since(
        &self,
        terminal: &TerminalId,
        cutoff: Timestamp,
    ) -> Result<u64, StoreError> {
        (**self).count_by_terminal_since(terminal, cutoff)
    }

    fn last_by_voter(&self, voter: &VoterId) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).last_by_voter(voter)
    }

    fn scan_since(&self, cutoff: Timestamp) -> Result<Vec<Vec<u8>>, StoreError> {
        (**self).scan_since(cutoff)
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        (**self).record_count()
    }
}
