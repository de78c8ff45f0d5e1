//! Ledger append and history queries.

use crate::error::LedgerError;
use crate::record::{AuditRecord, RecordDraft};
use pollguard_store::AuditStore;
use pollguard_types::{RecordHash, TerminalId, Timestamp, VoterId};
use std::sync::Mutex;

/// The append-only audit ledger over a storage backend.
///
/// All appends go through one writer lock: the head read, sequence
/// assignment, hash linkage, and store append form a single critical
/// section, so sequence numbers are strictly increasing with no gaps and
/// no reader ever observes a half-linked record.
pub struct AuditLedger<S: AuditStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: AuditStore> AuditLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Append a draft, returning the sealed record with its assigned
    /// sequence number and hash.
    pub fn append(&self, draft: RecordDraft) -> Result<AuditRecord, LedgerError> {
        // A poisoned lock means a prior append panicked; the store itself is
        // still consistent (backend appends are atomic), so recover and
        // re-read the head.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (sequence, previous_hash) = match self.store.head()? {
            Some((head_seq, head_hash)) => (head_seq + 1, head_hash),
            None => (1, RecordHash::ZERO),
        };

        let record = AuditRecord::seal(draft, sequence, previous_hash)?;
        self.store.append(
            record.sequence,
            &record.voter,
            &record.terminal,
            record.recorded_at,
            &record.hash,
            &record.to_bytes()?,
        )?;
        Ok(record)
    }

    /// Fetch a record by sequence number.
    pub fn get(&self, sequence: u64) -> Result<AuditRecord, LedgerError> {
        AuditRecord::from_bytes(&self.store.get(sequence)?)
    }

    /// Count records for a terminal within the trailing window.
    pub fn recent_by_terminal(
        &self,
        terminal: &TerminalId,
        window_secs: u64,
        now: Timestamp,
    ) -> Result<u64, LedgerError> {
        Ok(self
            .store
            .count_by_terminal_since(terminal, now.sub_secs(window_secs))?)
    }

    /// The most recent record for a voter, if any.
    pub fn last_by_voter(&self, voter: &VoterId) -> Result<Option<AuditRecord>, LedgerError> {
        match self.store.last_by_voter(voter)? {
            Some(bytes) => Ok(Some(AuditRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All records recorded at or after `cutoff`, oldest first.
    pub fn records_since(&self, cutoff: Timestamp) -> Result<Vec<AuditRecord>, LedgerError> {
        self.store
            .scan_since(cutoff)?
            .iter()
            .map(|bytes| AuditRecord::from_bytes(bytes))
            .collect()
    }

    /// Total number of records.
    pub fn record_count(&self) -> Result<u64, LedgerError> {
        Ok(self.store.record_count()?)
    }

    /// Walk the whole chain, recomputing every hash and checking every
    /// link. Returns the number of verified records.
    pub fn verify_chain(&self) -> Result<u64, LedgerError> {
        let Some((head_seq, _)) = self.store.head()? else {
            return Ok(0);
        };

        let mut previous = RecordHash::ZERO;
        for sequence in 1..=head_seq {
            let record = self.get(sequence)?;
            if record.sequence != sequence {
                return Err(LedgerError::ChainCorrupted {
                    sequence,
                    detail: format!("stored sequence is {}", record.sequence),
                });
            }
            if record.previous_hash != previous {
                return Err(LedgerError::ChainCorrupted {
                    sequence,
                    detail: "previous-hash link does not match prior record".into(),
                });
            }
            let recomputed = record.compute_hash()?;
            if record.hash != recomputed {
                return Err(LedgerError::ChainCorrupted {
                    sequence,
                    detail: "record hash does not match its contents".into(),
                });
            }
            previous = record.hash;
        }
        Ok(head_seq)
    }
}
