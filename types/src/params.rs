//! Engine parameters — every tunable threshold in one place.

use serde::{Deserialize, Serialize};

/// Tunable parameters shared by the guard, the fraud engine, and the
/// orchestrator. Election-day defaults via [`EngineParams::election_defaults`];
/// any subset can be overridden from the TOML config.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    // ── Double-vote guard ────────────────────────────────────────────────
    /// Seconds after which a claim expires and the voter id returns to
    /// unclaimed. Exists for re-runs and tests; must exceed the longest
    /// possible election day in production. Default: 24 hours.
    pub claim_horizon_secs: u64,

    // ── Fraud rules ──────────────────────────────────────────────────────
    /// Attempts faster than this (strictly less-than) are flagged.
    pub speed_threshold_secs: f64,

    /// Trailing window for the per-terminal rate rule.
    pub rate_window_secs: u64,

    /// Attempts per terminal within the rate window (including the one
    /// being scored) above which (strictly greater-than) the rule fires.
    pub rate_threshold: u64,

    /// A voter reappearing at a different station within this window is
    /// flagged as impossible travel.
    pub travel_window_secs: u64,

    // ── Anomaly model ────────────────────────────────────────────────────
    /// Minimum historical records before the model can be trained.
    pub min_training_records: usize,

    /// Trailing window of history the model trains on.
    pub training_window_secs: u64,

    /// Cadence of the background retraining task.
    pub retrain_interval_secs: u64,

    // ── Orchestrator policy ──────────────────────────────────────────────
    /// Fraud scoring is advisory by default (`None`). When set, a verdict
    /// with confidence strictly above this value rejects the attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_block_confidence: Option<f64>,
}

impl EngineParams {
    /// Election-day defaults — the intended live configuration.
    pub fn election_defaults() -> Self {
        Self {
            claim_horizon_secs: 24 * 3600,

            speed_threshold_secs: 2.0,
            rate_window_secs: 5 * 60,
            rate_threshold: 30,
            travel_window_secs: 3600,

            min_training_records: 100,
            training_window_secs: 4 * 3600,
            retrain_interval_secs: 15 * 60,

            hard_block_confidence: None,
        }
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::election_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_election_policy() {
        let p = EngineParams::default();
        assert_eq!(p.claim_horizon_secs, 86_400);
        assert_eq!(p.speed_threshold_secs, 2.0);
        assert_eq!(p.rate_threshold, 30);
        assert_eq!(p.rate_window_secs, 300);
        assert_eq!(p.travel_window_secs, 3600);
        assert_eq!(p.min_training_records, 100);
        assert!(p.hard_block_confidence.is_none());
    }
}
