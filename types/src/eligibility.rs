//! Eligibility snapshot supplied by the external voter registry.

use crate::ids::{StationId, VoterId};
use serde::{Deserialize, Serialize};

/// Registry-side status of a voter.
///
/// `Voted` is the registry's best-effort secondary record (written via
/// `mark_voted`); the authoritative exactly-once decision is the claim
/// store's, so `Voted` here is advisory only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoterStatus {
    Active,
    Voted,
    Revoked,
}

/// A read-only snapshot of a voter's registry row, fetched once per request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoterEligibility {
    pub voter_id: VoterId,
    /// Name shown to the poll worker on a successful check-in.
    pub display_name: String,
    /// The one station this voter may check in at.
    pub assigned_station: StationId,
    pub status: VoterStatus,
}
