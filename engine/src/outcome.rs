//! Terminal outcomes of a verification request, as returned to the caller.

use pollguard_types::{FraudVerdict, StationId};
use serde::{Deserialize, Serialize};

/// Expected business rejections. Recorded in the audit ledger and returned
/// to the terminal; never retried by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    AlreadyVoted,
    WrongPollingStation,
    VoterRevoked,
    /// Only produced when the hard-block threshold is configured.
    FraudSuspected,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::AlreadyVoted => "already_voted",
            RejectReason::WrongPollingStation => "wrong_polling_station",
            RejectReason::VoterRevoked => "voter_revoked",
            RejectReason::FraudSuspected => "fraud_suspected",
        }
    }
}

/// Failures: the attempt could not be completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// Missing or malformed fields. Fails fast, mutates no state, and is
    /// the one outcome that is not recorded.
    InvalidRequest,
    VoterNotFound,
    /// Registry, claim store, or ledger infrastructure failure.
    UpstreamUnavailable,
}

impl FailReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailReason::InvalidRequest => "invalid_request",
            FailReason::VoterNotFound => "voter_not_found",
            FailReason::UpstreamUnavailable => "upstream_unavailable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    Verified,
    Rejected,
    Failed,
}

/// What the transport layer sends back to the terminal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub status: VerifyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// On `wrong_polling_station`: where the voter should go instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_station: Option<StationId>,
    /// On success: the voter's display name for the poll worker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_name: Option<String>,
    /// On success: the audit record's sequence id, printed on the receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<u64>,
    /// The fraud verdict, when scoring ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<FraudVerdict>,
}

impl VerifyResponse {
    pub fn verified(voter_name: String, receipt: u64, verdict: FraudVerdict) -> Self {
        Self {
            status: VerifyStatus::Verified,
            reason: None,
            correct_station: None,
            voter_name: Some(voter_name),
            receipt: Some(receipt),
            verdict: Some(verdict),
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            status: VerifyStatus::Rejected,
            reason: Some(reason.as_str().to_string()),
            correct_station: None,
            voter_name: None,
            receipt: None,
            verdict: None,
        }
    }

    pub fn rejected_wrong_station(correct_station: StationId) -> Self {
        Self {
            correct_station: Some(correct_station),
            ..Self::rejected(RejectReason::WrongPollingStation)
        }
    }

    pub fn failed(reason: FailReason) -> Self {
        Self {
            status: VerifyStatus::Failed,
            reason: Some(reason.as_str().to_string()),
            correct_station: None,
            voter_name: None,
            receipt: None,
            verdict: None,
        }
    }

    pub fn with_verdict(mut self, verdict: FraudVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }
}
