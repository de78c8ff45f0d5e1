//! The verification request submitted by a check-in terminal.

use crate::ids::{StationId, TerminalId, VoterId};
use crate::method::VerificationMethod;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A single verification attempt, immutable once received.
///
/// `duration_secs`, `terminal_load`, and `retry_count` are measured by the
/// terminal and feed the fraud model's feature vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// The voter being checked in.
    pub voter_id: VoterId,
    /// How the voter identified themselves.
    pub method: VerificationMethod,
    /// The terminal issuing the request.
    pub terminal_id: TerminalId,
    /// The polling station the terminal is deployed at.
    pub station_id: StationId,
    /// The terminal's own clock at submission time.
    pub client_timestamp: Timestamp,
    /// Wall-clock seconds the identification step took at the terminal.
    pub duration_secs: f64,
    /// Number of requests the terminal had in flight, as reported by it.
    pub terminal_load: f64,
    /// How many times this attempt was retried at the terminal.
    pub retry_count: u32,
}

impl VerificationRequest {
    /// Field-level validation. A request failing this check is terminal
    /// with `invalid_request` and mutates no state.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.voter_id.is_valid() {
            return Err("voter_id must be non-empty");
        }
        if !self.terminal_id.is_valid() {
            return Err("terminal_id must be non-empty");
        }
        if !self.station_id.is_valid() {
            return Err("station_id must be non-empty");
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err("duration_secs must be a non-negative number");
        }
        if !self.terminal_load.is_finite() || self.terminal_load < 0.0 {
            return Err("terminal_load must be a non-negative number");
        }
        Ok(())
    }
}
