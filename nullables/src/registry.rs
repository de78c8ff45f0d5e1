//! Nullable voter registry — preloaded eligibility snapshots for testing.

use pollguard_registry::{RegistryError, VoterRegistry};
use pollguard_types::{VoterEligibility, VoterId, VoterStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory registry double.
///
/// `fail_next` makes the next call return `Unavailable`, for exercising the
/// orchestrator's compensation path.
pub struct NullRegistry {
    voters: Mutex<HashMap<String, VoterEligibility>>,
    fail_next: AtomicBool,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self {
            voters: Mutex::new(HashMap::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Preload a voter row.
    pub fn insert(&self, eligibility: VoterEligibility) {
        self.voters
            .lock()
            .unwrap()
            .insert(eligibility.voter_id.as_str().to_string(), eligibility);
    }

    /// Make the next registry call fail with `Unavailable`.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Current registry status for a voter (test assertions).
    pub fn status_of(&self, voter: &VoterId) -> Option<VoterStatus> {
        self.voters
            .lock()
            .unwrap()
            .get(voter.as_str())
            .map(|v| v.status)
    }

    fn check_failure(&self) -> Result<(), RegistryError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

impl Default for NullRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VoterRegistry for NullRegistry {
    fn get_eligibility(&self, voter: &VoterId) -> Result<Option<VoterEligibility>, RegistryError> {
        self.check_failure()?;
        Ok(self.voters.lock().unwrap().get(voter.as_str()).cloned())
    }

    fn mark_voted(&self, voter: &VoterId) -> Result<(), RegistryError> {
        self.check_failure()?;
        if let Some(row) = self.voters.lock().unwrap().get_mut(voter.as_str()) {
            row.status = VoterStatus::Voted;
        }
        Ok(())
    }
}
