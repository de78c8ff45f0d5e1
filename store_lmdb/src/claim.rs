//! LMDB implementation of ClaimStore.
//!
//! The claim CAS runs inside a single LMDB write transaction. LMDB allows
//! one writer at a time, so the existence check and the insert are atomic
//! with respect to every other claimant.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use pollguard_store::{ClaimEntry, ClaimOutcome, ClaimStore, StoreError};
use pollguard_types::{TerminalId, Timestamp, VoterId};

use crate::LmdbError;

pub struct LmdbClaimStore {
    pub(crate) env: Arc<Env>,
    pub(crate) claims_db: Database<Bytes, Bytes>,
}

impl ClaimStore for LmdbClaimStore {
    fn try_claim(
        &self,
        voter: &VoterId,
        terminal: &TerminalId,
        now: Timestamp,
        horizon_secs: u64,
    ) -> Result<ClaimOutcome, StoreError> {
        let key = voter.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(bytes) = self.claims_db.get(&wtxn, key).map_err(LmdbError::from)? {
            let existing: ClaimEntry = bincode::deserialize(bytes)
                .map_err(|e| LmdbError::Serialization(e.to_string()))?;
            if !existing.is_expired(horizon_secs, now) {
                return Ok(ClaimOutcome::AlreadyClaimed(existing));
            }
        }

        let entry = ClaimEntry {
            terminal: terminal.clone(),
            claimed_at: now,
        };
        let bytes =
            bincode::serialize(&entry).map_err(|e| LmdbError::Serialization(e.to_string()))?;
        self.claims_db
            .put(&mut wtxn, key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(ClaimOutcome::Claimed)
    }

    fn get_claim(&self, voter: &VoterId) -> Result<Option<ClaimEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .claims_db
            .get(&rtxn, voter.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes)
                    .map_err(|e| LmdbError::Serialization(e.to_string()))
                    .map_err(StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn release(&self, voter: &VoterId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.claims_db
            .delete(&mut wtxn, voter.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn claim_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.claims_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use std::sync::Barrier;

    fn open_store(dir: &std::path::Path) -> LmdbClaimStore {
        LmdbEnvironment::open_default(dir)
            .unwrap()
            .claim_store()
            .unwrap()
    }

    #[test]
    fn claim_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());

        let outcome = store
            .try_claim(
                &VoterId::new("V1"),
                &TerminalId::new("T1"),
                Timestamp::new(100),
                3600,
            )
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);

        let entry = store.get_claim(&VoterId::new("V1")).unwrap().unwrap();
        assert_eq!(entry.terminal, TerminalId::new("T1"));
        assert_eq!(entry.claimed_at, Timestamp::new(100));
        assert_eq!(store.claim_count().unwrap(), 1);
    }

    #[test]
    fn duplicate_claim_reports_holder() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let voter = VoterId::new("V1");

        store
            .try_claim(&voter, &TerminalId::new("T1"), Timestamp::new(100), 3600)
            .unwrap();
        let outcome = store
            .try_claim(&voter, &TerminalId::new("T2"), Timestamp::new(150), 3600)
            .unwrap();
        match outcome {
            ClaimOutcome::AlreadyClaimed(entry) => {
                assert_eq!(entry.terminal, TerminalId::new("T1"));
            }
            ClaimOutcome::Claimed => panic!("duplicate claim must not win"),
        }
    }

    #[test]
    fn expired_claim_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let voter = VoterId::new("V1");

        store
            .try_claim(&voter, &TerminalId::new("T1"), Timestamp::new(0), 60)
            .unwrap();
        let outcome = store
            .try_claim(&voter, &TerminalId::new("T2"), Timestamp::new(60), 60)
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);
    }

    #[test]
    fn release_then_claim_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let voter = VoterId::new("V1");

        store
            .try_claim(&voter, &TerminalId::new("T1"), Timestamp::new(0), 3600)
            .unwrap();
        store.release(&voter).unwrap();
        assert!(store.get_claim(&voter).unwrap().is_none());
        let outcome = store
            .try_claim(&voter, &TerminalId::new("T2"), Timestamp::new(1), 3600)
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);
    }

    #[test]
    fn racing_claims_on_disk_have_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open_store(dir.path()));
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    store
                        .try_claim(
                            &VoterId::new("V1"),
                            &TerminalId::new(format!("T{t}")),
                            Timestamp::new(100),
                            3600,
                        )
                        .unwrap()
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = outcomes
            .iter()
            .filter(|o| **o == ClaimOutcome::Claimed)
            .count();
        assert_eq!(winners, 1);
    }
}
