//! Deterministic rule checks. All rules run on every evaluation; their
//! findings are unioned into the verdict's reason list in this order.

use crate::error::FraudError;
use pollguard_ledger::AuditLedger;
use pollguard_store::AuditStore;
use pollguard_types::{EngineParams, Timestamp, VerificationRequest};

pub const REASON_SPEED: &str = "Verification speed abnormally fast";
pub const REASON_RATE: &str = "High verification rate at terminal";
pub const REASON_TRAVEL: &str = "Impossible travel between polling stations";
pub const REASON_UNTRAINED: &str = "Model not trained, insufficient data";

/// Run the speed, rate, and impossible-travel rules against the request and
/// the ledger's recent history.
pub fn rule_reasons<S: AuditStore>(
    request: &VerificationRequest,
    ledger: &AuditLedger<S>,
    params: &EngineParams,
    now: Timestamp,
) -> Result<Vec<String>, FraudError> {
    let mut reasons = Vec::new();

    // Strictly less-than: a duration exactly at the threshold is not flagged.
    if request.duration_secs < params.speed_threshold_secs {
        reasons.push(REASON_SPEED.to_string());
    }

    // The attempt being scored counts toward its own terminal's rate, so the
    // 31st in-window attempt at a terminal (threshold 30) is the first one
    // flagged.
    let recent =
        ledger.recent_by_terminal(&request.terminal_id, params.rate_window_secs, now)? + 1;
    if recent > params.rate_threshold {
        reasons.push(REASON_RATE.to_string());
    }

    if let Some(last) = ledger.last_by_voter(&request.voter_id)? {
        if last.station != request.station_id
            && last.recorded_at.elapsed_since(now) < params.travel_window_secs
        {
            reasons.push(REASON_TRAVEL.to_string());
        }
    }

    Ok(reasons)
}
