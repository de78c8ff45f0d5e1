//! Nullable stores — thread-safe in-memory claim and audit storage.

use pollguard_store::{AuditStore, ClaimEntry, ClaimOutcome, ClaimStore, StoreError};
use pollguard_types::{RecordHash, TerminalId, Timestamp, VoterId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// An in-memory claim store.
///
/// The whole claim map sits behind one mutex, so the existence check and
/// the insert in `try_claim` are a single critical section — the same CAS
/// contract the LMDB backend provides with a write transaction.
pub struct MemClaimStore {
    claims: Mutex<HashMap<String, ClaimEntry>>,
}

impl MemClaimStore {
    pub fn new() -> Self {
        Self {
            claims: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemClaimStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimStore for MemClaimStore {
    fn try_claim(
        &self,
        voter: &VoterId,
        terminal: &TerminalId,
        now: Timestamp,
        horizon_secs: u64,
    ) -> Result<ClaimOutcome, StoreError> {
        let mut claims = self.claims.lock().unwrap();
        if let Some(existing) = claims.get(voter.as_str()) {
            if !existing.is_expired(horizon_secs, now) {
                return Ok(ClaimOutcome::AlreadyClaimed(existing.clone()));
            }
        }
        claims.insert(
            voter.as_str().to_string(),
            ClaimEntry {
                terminal: terminal.clone(),
                claimed_at: now,
            },
        );
        Ok(ClaimOutcome::Claimed)
    }

    fn get_claim(&self, voter: &VoterId) -> Result<Option<ClaimEntry>, StoreError> {
        Ok(self.claims.lock().unwrap().get(voter.as_str()).cloned())
    }

    fn release(&self, voter: &VoterId) -> Result<(), StoreError> {
        self.claims.lock().unwrap().remove(voter.as_str());
        Ok(())
    }

    fn claim_count(&self) -> Result<u64, StoreError> {
        Ok(self.claims.lock().unwrap().len() as u64)
    }
}

/// One stored audit record plus the index fields the queries need.
struct StoredRecord {
    voter: String,
    terminal: String,
    recorded_at: Timestamp,
    hash: RecordHash,
    bytes: Vec<u8>,
}

/// An in-memory audit store. Records live in an append-only vec; the
/// sequence number is `index + 1`.
///
/// `fail_appends` makes the next N appends return a backend error, for
/// exercising the orchestrator's compensation and fatal paths.
pub struct MemAuditStore {
    records: Mutex<Vec<StoredRecord>>,
    fail_appends: AtomicU32,
}

impl MemAuditStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_appends: AtomicU32::new(0),
        }
    }

    /// Make the next `n` appends fail with a backend error.
    pub fn fail_appends(&self, n: u32) {
        self.fail_appends.store(n, Ordering::SeqCst);
    }
}

impl Default for MemAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for MemAuditStore {
    fn append(
        &self,
        sequence: u64,
        voter: &VoterId,
        terminal: &TerminalId,
        recorded_at: Timestamp,
        hash: &RecordHash,
        record_bytes: &[u8],
    ) -> Result<(), StoreError> {
        if self
            .fail_appends
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Backend("injected append failure".into()));
        }
        let mut records = self.records.lock().unwrap();
        let expected = records.len() as u64 + 1;
        if sequence != expected {
            return Err(StoreError::SequenceGap {
                expected,
                got: sequence,
            });
        }
        records.push(StoredRecord {
            voter: voter.as_str().to_string(),
            terminal: terminal.as_str().to_string(),
            recorded_at,
            hash: *hash,
            bytes: record_bytes.to_vec(),
        });
        Ok(())
    }

    fn head(&self) -> Result<Option<(u64, RecordHash)>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .last()
            .map(|r| (records.len() as u64, r.hash)))
    }

    fn get(&self, sequence: u64) -> Result<Vec<u8>, StoreError> {
        let records = self.records.lock().unwrap();
        let index = sequence
            .checked_sub(1)
            .ok_or_else(|| StoreError::NotFound("sequence 0".into()))? as usize;
        records
            .get(index)
            .map(|r| r.bytes.clone())
            .ok_or_else(|| StoreError::NotFound(format!("sequence {sequence}")))
    }

    fn count_by_terminal_since(
        &self,
        terminal: &TerminalId,
        cutoff: Timestamp,
    ) -> Result<u64, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.terminal == terminal.as_str() && r.recorded_at >= cutoff)
            .count() as u64)
    }

    fn last_by_voter(&self, voter: &VoterId) -> Result<Option<Vec<u8>>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .find(|r| r.voter == voter.as_str())
            .map(|r| r.bytes.clone()))
    }

    fn scan_since(&self, cutoff: Timestamp) -> Result<Vec<Vec<u8>>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.recorded_at >= cutoff)
            .map(|r| r.bytes.clone())
            .collect())
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}
