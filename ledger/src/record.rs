//! The audit record — one sealed entry in the hash chain.

use crate::error::LedgerError;
use pollguard_crypto::chain_hash;
use pollguard_types::{
    AuditOutcome, FraudVerdict, RecordHash, StationId, TerminalId, Timestamp,
    VerificationMethod, VoterId,
};
use serde::{Deserialize, Serialize};

/// The outcome of one verification attempt, before sequencing.
///
/// The ledger assigns `sequence`, links `previous_hash`, and computes the
/// record hash when the draft is appended.
#[derive(Clone, Debug)]
pub struct RecordDraft {
    pub voter: VoterId,
    pub terminal: TerminalId,
    pub station: StationId,
    pub method: VerificationMethod,
    /// Seconds the identification step took, as measured by the terminal.
    pub duration_secs: f64,
    /// Terminal-reported load at the time of the attempt.
    pub terminal_load: f64,
    /// Terminal-side retry count for the attempt.
    pub retry_count: u32,
    pub outcome: AuditOutcome,
    pub reason: Option<String>,
    pub verdict: FraudVerdict,
    pub recorded_at: Timestamp,
}

/// A sealed record in the audit chain. Never mutated after append.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Strictly increasing, gap-free, 1-based. Doubles as the verification
    /// receipt identifier returned to the terminal.
    pub sequence: u64,
    pub voter: VoterId,
    pub terminal: TerminalId,
    pub station: StationId,
    pub method: VerificationMethod,
    /// Feature fields the anomaly model trains on (terminal-measured).
    pub duration_secs: f64,
    pub terminal_load: f64,
    pub retry_count: u32,
    pub outcome: AuditOutcome,
    pub reason: Option<String>,
    pub verdict: FraudVerdict,
    pub recorded_at: Timestamp,
    /// Hash of the preceding record (zero for the first record).
    pub previous_hash: RecordHash,
    /// Blake2b-256 over this record's canonical fields ++ `previous_hash`.
    pub hash: RecordHash,
}

impl AuditRecord {
    /// Seal a draft under the given sequence number and chain head.
    pub fn seal(
        draft: RecordDraft,
        sequence: u64,
        previous_hash: RecordHash,
    ) -> Result<Self, LedgerError> {
        let mut record = Self {
            sequence,
            voter: draft.voter,
            terminal: draft.terminal,
            station: draft.station,
            method: draft.method,
            duration_secs: draft.duration_secs,
            terminal_load: draft.terminal_load,
            retry_count: draft.retry_count,
            outcome: draft.outcome,
            reason: draft.reason,
            verdict: draft.verdict,
            recorded_at: draft.recorded_at,
            previous_hash,
            hash: RecordHash::ZERO,
        };
        record.hash = record.compute_hash()?;
        Ok(record)
    }

    /// Recompute this record's hash from its fields and `previous_hash`.
    pub fn compute_hash(&self) -> Result<RecordHash, LedgerError> {
        Ok(chain_hash(&self.canonical_bytes()?, &self.previous_hash))
    }

    /// Canonical bytes covered by the hash: every field except
    /// `previous_hash` (hashed separately as the chain link) and `hash`.
    fn canonical_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(&(
            self.sequence,
            &self.voter,
            &self.terminal,
            &self.station,
            &self.method,
            self.duration_secs,
            self.terminal_load,
            self.retry_count,
            &self.outcome,
            &self.reason,
            &self.verdict,
            self.recorded_at,
        ))
        .map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}
