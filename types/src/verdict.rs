//! Fraud verdicts and audit outcomes.

use serde::{Deserialize, Serialize};

/// The terminal outcome of a verification attempt, as recorded in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The voter was checked in.
    Verified,
    /// An expected business rejection (already voted, wrong station, ...).
    Rejected,
    /// The attempt could not be completed (bad request, upstream failure).
    Failed,
}

/// The fraud engine's assessment of one verification attempt.
///
/// Produced once per scored request and attached to its audit record;
/// never modified after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudVerdict {
    /// Whether the attempt should be surfaced for human review.
    pub is_suspicious: bool,
    /// Model confidence in [0, 1]. Zero when the model is untrained.
    pub confidence: f64,
    /// Rule and model findings, in evaluation order.
    pub reasons: Vec<String>,
}

impl FraudVerdict {
    /// Verdict attached to records written before scoring ran
    /// (pre-claim rejections and compensating failure records).
    pub fn unscored() -> Self {
        Self {
            is_suspicious: false,
            confidence: 0.0,
            reasons: Vec::new(),
        }
    }
}
