//! Atomic claim logic over a [`ClaimStore`].

use pollguard_store::{ClaimOutcome, ClaimStore, StoreError};
use pollguard_types::{TerminalId, Timestamp, VoterId};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("voter id must be non-empty")]
    EmptyVoterId,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a guard claim attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimDecision {
    /// The caller won the claim and may proceed with verification.
    Claimed,
    /// The voter id is already claimed; the caller must reject.
    AlreadyClaimed {
        terminal: TerminalId,
        claimed_at: Timestamp,
    },
}

/// The exactly-once state guard keyed by voter identity.
///
/// All atomicity lives in the store's `try_claim` (one lock acquisition or
/// one write transaction); the guard adds validation and the expiry-horizon
/// policy. Claims expire at the horizon so test runs and re-runs can reuse
/// voter ids — in production the horizon must exceed the longest possible
/// election day.
pub struct DoubleVoteGuard<C: ClaimStore> {
    store: Arc<C>,
    horizon_secs: u64,
}

impl<C: ClaimStore> DoubleVoteGuard<C> {
    pub fn new(store: Arc<C>, horizon_secs: u64) -> Self {
        Self {
            store,
            horizon_secs,
        }
    }

    /// Attempt to claim `voter` for `terminal`.
    ///
    /// Exactly one of any set of concurrent callers for the same voter id
    /// observes [`ClaimDecision::Claimed`]; the rest observe the winner's
    /// terminal and claim time.
    pub fn try_claim(
        &self,
        voter: &VoterId,
        terminal: &TerminalId,
        now: Timestamp,
    ) -> Result<ClaimDecision, ClaimError> {
        if !voter.is_valid() {
            return Err(ClaimError::EmptyVoterId);
        }
        match self
            .store
            .try_claim(voter, terminal, now, self.horizon_secs)?
        {
            ClaimOutcome::Claimed => Ok(ClaimDecision::Claimed),
            ClaimOutcome::AlreadyClaimed(entry) => Ok(ClaimDecision::AlreadyClaimed {
                terminal: entry.terminal,
                claimed_at: entry.claimed_at,
            }),
        }
    }

    /// Drop a claim so the voter id can be retried. Compensation-path and
    /// administrative use only.
    pub fn release(&self, voter: &VoterId) -> Result<(), ClaimError> {
        Ok(self.store.release(voter)?)
    }

    /// Current number of stored claims.
    pub fn claim_count(&self) -> Result<u64, ClaimError> {
        Ok(self.store.claim_count()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollguard_nullables::MemClaimStore;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Barrier;

    fn guard() -> DoubleVoteGuard<MemClaimStore> {
        DoubleVoteGuard::new(Arc::new(MemClaimStore::new()), 24 * 3600)
    }

    fn voter(s: &str) -> VoterId {
        VoterId::new(s)
    }

    fn terminal(s: &str) -> TerminalId {
        TerminalId::new(s)
    }

    // ── Basic semantics ─────────────────────────────────────────────────

    #[test]
    fn first_claim_wins_second_rejected() {
        let guard = guard();
        let first = guard
            .try_claim(&voter("V1"), &terminal("T1"), Timestamp::new(100))
            .unwrap();
        assert_eq!(first, ClaimDecision::Claimed);

        let second = guard
            .try_claim(&voter("V1"), &terminal("T2"), Timestamp::new(200))
            .unwrap();
        assert_eq!(
            second,
            ClaimDecision::AlreadyClaimed {
                terminal: terminal("T1"),
                claimed_at: Timestamp::new(100),
            }
        );
    }

    #[test]
    fn distinct_voters_claim_independently() {
        let guard = guard();
        for i in 0..5 {
            let decision = guard
                .try_claim(&voter(&format!("V{i}")), &terminal("T1"), Timestamp::new(100))
                .unwrap();
            assert_eq!(decision, ClaimDecision::Claimed);
        }
        assert_eq!(guard.claim_count().unwrap(), 5);
    }

    #[test]
    fn empty_voter_id_is_rejected_without_mutation() {
        let guard = guard();
        let result = guard.try_claim(&voter("  "), &terminal("T1"), Timestamp::new(100));
        assert!(matches!(result, Err(ClaimError::EmptyVoterId)));
        assert_eq!(guard.claim_count().unwrap(), 0);
    }

    #[test]
    fn claim_expires_at_horizon() {
        let store = Arc::new(MemClaimStore::new());
        let guard = DoubleVoteGuard::new(store, 3600);
        guard
            .try_claim(&voter("V1"), &terminal("T1"), Timestamp::new(0))
            .unwrap();

        // One second before the horizon: still held.
        let held = guard
            .try_claim(&voter("V1"), &terminal("T2"), Timestamp::new(3599))
            .unwrap();
        assert!(matches!(held, ClaimDecision::AlreadyClaimed { .. }));

        // At the horizon: the voter id is unclaimed again.
        let reclaimed = guard
            .try_claim(&voter("V1"), &terminal("T2"), Timestamp::new(3600))
            .unwrap();
        assert_eq!(reclaimed, ClaimDecision::Claimed);
    }

    #[test]
    fn release_reopens_the_voter_id() {
        let guard = guard();
        guard
            .try_claim(&voter("V1"), &terminal("T1"), Timestamp::new(100))
            .unwrap();
        guard.release(&voter("V1")).unwrap();
        let decision = guard
            .try_claim(&voter("V1"), &terminal("T2"), Timestamp::new(101))
            .unwrap();
        assert_eq!(decision, ClaimDecision::Claimed);
    }

    // ── The double-claim race ───────────────────────────────────────────

    #[test]
    fn concurrent_claims_have_exactly_one_winner() {
        let store = Arc::new(MemClaimStore::new());
        let guard = Arc::new(DoubleVoteGuard::new(store, 24 * 3600));
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    guard
                        .try_claim(&voter("V1"), &terminal(&format!("T{t}")), Timestamp::new(100))
                        .unwrap()
                })
            })
            .collect();

        let decisions: Vec<ClaimDecision> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = decisions
            .iter()
            .filter(|d| **d == ClaimDecision::Claimed)
            .collect();
        assert_eq!(winners.len(), 1, "exactly one claim must win");

        // Every loser must reference the winning terminal.
        let winning_terminal = decisions
            .iter()
            .enumerate()
            .find_map(|(t, d)| (*d == ClaimDecision::Claimed).then(|| terminal(&format!("T{t}"))))
            .unwrap();
        for decision in &decisions {
            if let ClaimDecision::AlreadyClaimed { terminal: t, .. } = decision {
                assert_eq!(*t, winning_terminal);
            }
        }
    }

    proptest! {
        /// Any interleaving of claims over a handful of voters yields one
        /// winner per voter, and the winner is the first claimant.
        #[test]
        fn one_winner_per_voter(claims in proptest::collection::vec((0u8..5, 0u8..4), 1..40)) {
            let guard = guard();
            let mut winners: HashMap<u8, u8> = HashMap::new();

            for (i, (v, t)) in claims.iter().enumerate() {
                let decision = guard
                    .try_claim(
                        &voter(&format!("V{v}")),
                        &terminal(&format!("T{t}")),
                        Timestamp::new(1000 + i as u64),
                    )
                    .unwrap();
                match decision {
                    ClaimDecision::Claimed => {
                        prop_assert!(
                            winners.insert(*v, *t).is_none(),
                            "voter V{} claimed twice", v
                        );
                    }
                    ClaimDecision::AlreadyClaimed { terminal: held, .. } => {
                        let expected = winners.get(v).expect("rejected claim with no winner");
                        let expected_str = format!("T{}", expected);
                        prop_assert_eq!(held.as_str(), expected_str.as_str());
                    }
                }
            }
        }
    }
}
