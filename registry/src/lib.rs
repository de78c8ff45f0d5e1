//! The voter-registry boundary.
//!
//! The registry (storage, encryption, registration) is an external
//! collaborator; this crate defines only the interface the verification
//! core consumes. Implementations live outside the core — tests use the
//! nullable registry from `pollguard-nullables`.

use pollguard_types::{VoterEligibility, VoterId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("voter registry unavailable: {0}")]
    Unavailable(String),

    #[error("voter registry returned malformed data: {0}")]
    Malformed(String),
}

/// Read/annotate access to the external voter registry.
pub trait VoterRegistry: Send + Sync {
    /// Fetch a voter's eligibility snapshot. `Ok(None)` means the voter id
    /// is unknown to the registry.
    fn get_eligibility(&self, voter: &VoterId) -> Result<Option<VoterEligibility>, RegistryError>;

    /// Record that the voter completed check-in. Idempotent and best-effort:
    /// the authoritative exactly-once decision is the claim store's, so a
    /// failure here is logged by the caller, not escalated.
    fn mark_voted(&self, voter: &VoterId) -> Result<(), RegistryError>;
}
