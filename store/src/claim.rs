//! Claim storage — the exactly-once keyspace `voter_id -> ClaimState`.

use crate::StoreError;
use pollguard_types::{TerminalId, Timestamp, VoterId};
use serde::{Deserialize, Serialize};

/// A live claim on a voter id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    /// The terminal that won the claim.
    pub terminal: TerminalId,
    /// When the claim was taken.
    pub claimed_at: Timestamp,
}

impl ClaimEntry {
    /// Whether this claim has passed the horizon and counts as unclaimed.
    pub fn is_expired(&self, horizon_secs: u64, now: Timestamp) -> bool {
        self.claimed_at.has_expired(horizon_secs, now)
    }
}

/// Result of a claim attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller won the claim and may proceed.
    Claimed,
    /// Another terminal already holds the claim.
    AlreadyClaimed(ClaimEntry),
}

/// Trait for the claim keyspace.
///
/// `try_claim` is the one compare-and-swap primitive in the system: the
/// existence check and the insert MUST happen inside a single atomic step
/// (one lock acquisition, one write transaction), never as a separable
/// read-then-write pair. Two concurrent callers racing on the same voter id
/// must never both observe [`ClaimOutcome::Claimed`].
pub trait ClaimStore: Send + Sync {
    /// Atomically claim `voter` for `terminal` unless a live (non-expired)
    /// claim already exists. An expired claim is overwritten in the same
    /// atomic step.
    fn try_claim(
        &self,
        voter: &VoterId,
        terminal: &TerminalId,
        now: Timestamp,
        horizon_secs: u64,
    ) -> Result<ClaimOutcome, StoreError>;

    /// Look up the current claim for a voter, if any (expired or not).
    fn get_claim(&self, voter: &VoterId) -> Result<Option<ClaimEntry>, StoreError>;

    /// Remove a claim. Used by the orchestrator's compensation path and by
    /// administrative re-runs; never part of the normal verified flow.
    fn release(&self, voter: &VoterId) -> Result<(), StoreError>;

    /// Number of claims currently stored (live and expired).
    fn claim_count(&self) -> Result<u64, StoreError>;
}

impl<T: ClaimStore + ?Sized> ClaimStore for std::sync::Arc<T> {
    fn try_claim(
        &self,
        voter: &VoterId,
        terminal: &TerminalId,
        now: Timestamp,
        horizon_secs: u64,
    ) -> Result<ClaimOutcome, StoreError> {
        (**self).try_claim(voter, terminal, now, horizon_secs)
    }

    fn get_claim(&self, voter: &VoterId) -> Result<Option<ClaimEntry>, StoreError> {
        (**self).get_claim(voter)
    }

    fn release(&self, voter: &VoterId) -> Result<(), StoreError> {
        (**self).release(voter)
    }

    fn claim_count(&self) -> Result<u64, StoreError> {
        (**self).claim_count()
    }
}
