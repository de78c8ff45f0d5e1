//! LMDB implementation of AuditStore.
//!
//! Databases:
//! - `audit_records`:     `be64(seq) -> record bytes`
//! - `audit_times`:       `be64(seq) -> le64(recorded_at)`
//! - `audit_by_terminal`: `terminal ++ 0x00 ++ be64(seq) -> le64(recorded_at)`
//! - `audit_by_voter`:    `voter ++ 0x00 ++ be64(seq) -> be64(seq)`
//! - `audit_meta`:        `"head" -> be64(seq) ++ hash`
//!
//! Composite index keys are `id ++ 0x00 ++ be64(seq)`; the NUL byte keeps
//! distinct ids from sharing a prefix during range scans. The whole append
//! commits as one write transaction.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use pollguard_store::{AuditStore, StoreError};
use pollguard_types::{RecordHash, TerminalId, Timestamp, VoterId};

use crate::LmdbError;

const HEAD_KEY: &[u8] = b"head";

pub struct LmdbAuditStore {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) times_db: Database<Bytes, Bytes>,
    pub(crate) terminal_idx_db: Database<Bytes, Bytes>,
    pub(crate) voter_idx_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// Build composite key `id ++ 0x00 ++ be64(seq)`.
fn composite_key(id: &str, sequence: u64) -> Vec<u8> {
    let id = id.as_bytes();
    let mut key = Vec::with_capacity(id.len() + 1 + 8);
    key.extend_from_slice(id);
    key.push(0);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

/// Prefix bounds for all sequences under one id.
fn prefix_bounds(id: &str) -> (Vec<u8>, Vec<u8>) {
    let mut lower = id.as_bytes().to_vec();
    lower.push(0);
    let mut upper = id.as_bytes().to_vec();
    upper.push(1);
    (lower, upper)
}

fn decode_head(bytes: &[u8]) -> Result<(u64, RecordHash), LmdbError> {
    if bytes.len() != 8 + 32 {
        return Err(LmdbError::Serialization(
            "audit head has unexpected byte length".to_string(),
        ));
    }
    let seq = u64::from_be_bytes(bytes[..8].try_into().expect("checked length"));
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes[8..]);
    Ok((seq, RecordHash::new(hash)))
}

fn decode_time(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("timestamp has unexpected byte length".into()))?;
    Ok(u64::from_le_bytes(arr))
}

impl AuditStore for LmdbAuditStore {
    fn append(
        &self,
        sequence: u64,
        voter: &VoterId,
        terminal: &TerminalId,
        recorded_at: Timestamp,
        hash: &RecordHash,
        record_bytes: &[u8],
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let expected = match self.meta_db.get(&wtxn, HEAD_KEY).map_err(LmdbError::from)? {
            Some(bytes) => decode_head(bytes)?.0 + 1,
            None => 1,
        };
        if sequence != expected {
            return Err(StoreError::SequenceGap {
                expected,
                got: sequence,
            });
        }

        let seq_key = sequence.to_be_bytes();
        let time_bytes = recorded_at.as_secs().to_le_bytes();
        self.records_db
            .put(&mut wtxn, &seq_key, record_bytes)
            .map_err(LmdbError::from)?;
        self.times_db
            .put(&mut wtxn, &seq_key, &time_bytes)
            .map_err(LmdbError::from)?;
        self.terminal_idx_db
            .put(
                &mut wtxn,
                &composite_key(terminal.as_str(), sequence),
                &time_bytes,
            )
            .map_err(LmdbError::from)?;
        self.voter_idx_db
            .put(&mut wtxn, &composite_key(voter.as_str(), sequence), &seq_key)
            .map_err(LmdbError::from)?;

        let mut head = Vec::with_capacity(8 + 32);
        head.extend_from_slice(&seq_key);
        head.extend_from_slice(hash.as_bytes());
        self.meta_db
            .put(&mut wtxn, HEAD_KEY, &head)
            .map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn head(&self) -> Result<Option<(u64, RecordHash)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.meta_db.get(&rtxn, HEAD_KEY).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(decode_head(bytes)?)),
            None => Ok(None),
        }
    }

    fn get(&self, sequence: u64) -> Result<Vec<u8>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .records_db
            .get(&rtxn, &sequence.to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("audit record {sequence}")))?;
        Ok(bytes.to_vec())
    }

    fn count_by_terminal_since(
        &self,
        terminal: &TerminalId,
        cutoff: Timestamp,
    ) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let (lower, upper) = prefix_bounds(terminal.as_str());
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let iter = self
            .terminal_idx_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let mut count = 0u64;
        for result in iter {
            let (_key, value) = result.map_err(LmdbError::from)?;
            if decode_time(value)? >= cutoff.as_secs() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn last_by_voter(&self, voter: &VoterId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let (lower, upper) = prefix_bounds(voter.as_str());
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let mut iter = self
            .voter_idx_db
            .rev_range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        match iter.next() {
            Some(result) => {
                let (_key, seq_bytes) = result.map_err(LmdbError::from)?;
                let bytes = self
                    .records_db
                    .get(&rtxn, seq_bytes)
                    .map_err(LmdbError::from)?
                    .ok_or_else(|| {
                        LmdbError::NotFound("voter index points at missing record".to_string())
                    })?;
                Ok(Some(bytes.to_vec()))
            }
            None => Ok(None),
        }
    }

    fn scan_since(&self, cutoff: Timestamp) -> Result<Vec<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut records = Vec::new();
        let iter = self.times_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (seq_key, time_bytes) = result.map_err(LmdbError::from)?;
            if decode_time(time_bytes)? < cutoff.as_secs() {
                continue;
            }
            let bytes = self
                .records_db
                .get(&rtxn, seq_key)
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    LmdbError::NotFound("time index points at missing record".to_string())
                })?;
            records.push(bytes.to_vec());
        }
        Ok(records)
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.records_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
