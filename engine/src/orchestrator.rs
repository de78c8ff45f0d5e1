//! The per-request verification state machine.

use crate::error::EngineError;
use crate::outcome::{FailReason, RejectReason, VerifyResponse};
use pollguard_claims::{ClaimDecision, DoubleVoteGuard};
use pollguard_fraud::FraudEngine;
use pollguard_ledger::{AuditLedger, RecordDraft};
use pollguard_registry::VoterRegistry;
use pollguard_store::{AuditStore, ClaimStore};
use pollguard_types::{
    AuditOutcome, EngineParams, FraudVerdict, StationId, Timestamp, VerificationRequest,
    VoterStatus,
};
use pollguard_utils::StatsCounter;
use std::sync::Arc;

const STAT_VERIFIED: &str = "verified";
const STAT_REJECTED: &str = "rejected";
const STAT_FAILED: &str = "failed";
const STAT_SUSPICIOUS: &str = "suspicious";

/// Coordinates registry, guard, ledger, and fraud engine per request.
///
/// All collaborators are injected: production wires the LMDB-backed stores,
/// tests wire the nullable doubles through the same seams.
pub struct VerificationOrchestrator<R, C, S>
where
    R: VoterRegistry,
    C: ClaimStore,
    S: AuditStore + 'static,
{
    registry: Arc<R>,
    guard: DoubleVoteGuard<C>,
    ledger: Arc<AuditLedger<S>>,
    fraud: Arc<FraudEngine<S>>,
    params: EngineParams,
    stats: StatsCounter,
}

impl<R, C, S> VerificationOrchestrator<R, C, S>
where
    R: VoterRegistry,
    C: ClaimStore,
    S: AuditStore + 'static,
{
    pub fn new(
        registry: Arc<R>,
        claim_store: Arc<C>,
        ledger: Arc<AuditLedger<S>>,
        fraud: Arc<FraudEngine<S>>,
        params: EngineParams,
    ) -> Self {
        Self {
            registry,
            guard: DoubleVoteGuard::new(claim_store, params.claim_horizon_secs),
            ledger,
            fraud,
            params,
            stats: StatsCounter::new(&[
                STAT_VERIFIED,
                STAT_REJECTED,
                STAT_FAILED,
                STAT_SUSPICIOUS,
            ]),
        }
    }

    /// Run one verification request through the full state machine.
    ///
    /// Business outcomes come back as `Ok(response)`. The only `Err` is
    /// [`EngineError::Fatal`]: a claim was taken and neither the outcome
    /// nor the compensating failure record could be written.
    pub fn verify(
        &self,
        request: &VerificationRequest,
        now: Timestamp,
    ) -> Result<VerifyResponse, EngineError> {
        // ── Received ────────────────────────────────────────────────────
        if let Err(detail) = request.validate() {
            tracing::warn!(terminal = %request.terminal_id, detail, "invalid request");
            self.stats.increment(STAT_FAILED);
            return Ok(VerifyResponse::failed(FailReason::InvalidRequest));
        }

        // ── EligibilityChecked ──────────────────────────────────────────
        let eligibility = match self.registry.get_eligibility(&request.voter_id) {
            Ok(Some(eligibility)) => eligibility,
            Ok(None) => {
                tracing::info!(voter = %request.voter_id, "voter not found in registry");
                return Ok(self.record_failure(request, FailReason::VoterNotFound, now));
            }
            Err(e) => {
                tracing::warn!(voter = %request.voter_id, "registry lookup failed: {e}");
                self.stats.increment(STAT_FAILED);
                return Ok(VerifyResponse::failed(FailReason::UpstreamUnavailable));
            }
        };

        if eligibility.status == VoterStatus::Revoked {
            tracing::info!(voter = %request.voter_id, "voter registration revoked");
            return Ok(self.record_rejection(request, RejectReason::VoterRevoked, None, now));
        }
        if eligibility.status == VoterStatus::Voted {
            // Advisory only: the claim store is the authority on repeats.
            tracing::debug!(voter = %request.voter_id, "registry already marks voter as voted");
        }

        if eligibility.assigned_station != request.station_id {
            tracing::info!(
                voter = %request.voter_id,
                at = %request.station_id,
                assigned = %eligibility.assigned_station,
                "voter at wrong polling station"
            );
            let response = self.record_rejection(
                request,
                RejectReason::WrongPollingStation,
                Some(eligibility.assigned_station.clone()),
                now,
            );
            return Ok(response);
        }

        // ── Claimed ─────────────────────────────────────────────────────
        match self.guard.try_claim(&request.voter_id, &request.terminal_id, now) {
            Ok(ClaimDecision::Claimed) => {}
            Ok(ClaimDecision::AlreadyClaimed { terminal, .. }) => {
                tracing::info!(
                    voter = %request.voter_id,
                    held_by = %terminal,
                    "duplicate verification attempt"
                );
                return Ok(self.record_rejection(request, RejectReason::AlreadyVoted, None, now));
            }
            Err(e) => {
                tracing::warn!(voter = %request.voter_id, "claim attempt failed: {e}");
                self.stats.increment(STAT_FAILED);
                return Ok(VerifyResponse::failed(FailReason::UpstreamUnavailable));
            }
        }

        // ── Scored ──────────────────────────────────────────────────────
        // From here on a claim is held: every failure must resolve it.
        let verdict = match self.fraud.evaluate(request, now) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(voter = %request.voter_id, "fraud scoring failed: {e}");
                return self.resolve_failed_claim(request, now);
            }
        };
        if verdict.is_suspicious {
            self.stats.increment(STAT_SUSPICIOUS);
        }

        if let Some(threshold) = self.params.hard_block_confidence {
            if verdict.is_suspicious && verdict.confidence > threshold {
                // The claim is retained: the incident goes to human review
                // rather than being retryable at another terminal.
                tracing::warn!(
                    voter = %request.voter_id,
                    confidence = verdict.confidence,
                    "verification hard-blocked on fraud confidence"
                );
                let draft = self.draft(
                    request,
                    AuditOutcome::Rejected,
                    Some(RejectReason::FraudSuspected.as_str()),
                    verdict.clone(),
                    now,
                );
                return match self.ledger.append(draft) {
                    Ok(_) => {
                        self.stats.increment(STAT_REJECTED);
                        Ok(VerifyResponse::rejected(RejectReason::FraudSuspected)
                            .with_verdict(verdict))
                    }
                    Err(e) => {
                        tracing::warn!(voter = %request.voter_id, "audit append failed: {e}");
                        self.resolve_failed_claim(request, now)
                    }
                };
            }
        }

        // ── Recorded ────────────────────────────────────────────────────
        let draft = self.draft(
            request,
            AuditOutcome::Verified,
            None,
            verdict.clone(),
            now,
        );
        let record = match self.ledger.append(draft) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(voter = %request.voter_id, "audit append failed: {e}");
                return self.resolve_failed_claim(request, now);
            }
        };

        // Best-effort secondary record; the claim store already holds the
        // authoritative decision.
        if let Err(e) = self.registry.mark_voted(&request.voter_id) {
            tracing::warn!(voter = %request.voter_id, "registry mark_voted failed: {e}");
        }

        self.stats.increment(STAT_VERIFIED);
        tracing::info!(
            voter = %request.voter_id,
            terminal = %request.terminal_id,
            receipt = record.sequence,
            suspicious = verdict.is_suspicious,
            "voter verified"
        );
        Ok(VerifyResponse::verified(
            eligibility.display_name,
            record.sequence,
            verdict,
        ))
    }

    /// Spawn the fraud model's background retraining task.
    pub fn spawn_retraining(
        &self,
        shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        self.fraud.spawn_retraining(shutdown)
    }

    /// Counter snapshot: verified / rejected / failed / suspicious totals.
    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    // ── Recording helpers ───────────────────────────────────────────────

    fn draft(
        &self,
        request: &VerificationRequest,
        outcome: AuditOutcome,
        reason: Option<&str>,
        verdict: FraudVerdict,
        now: Timestamp,
    ) -> RecordDraft {
        RecordDraft {
            voter: request.voter_id.clone(),
            terminal: request.terminal_id.clone(),
            station: request.station_id.clone(),
            method: request.method,
            duration_secs: request.duration_secs,
            terminal_load: request.terminal_load,
            retry_count: request.retry_count,
            outcome,
            reason: reason.map(str::to_string),
            verdict,
            recorded_at: now,
        }
    }

    /// Record a pre-claim business rejection. A ledger failure here holds
    /// no claim, so it degrades to `upstream_unavailable` with no
    /// compensation needed.
    fn record_rejection(
        &self,
        request: &VerificationRequest,
        reason: RejectReason,
        correct_station: Option<StationId>,
        now: Timestamp,
    ) -> VerifyResponse {
        let draft = self.draft(
            request,
            AuditOutcome::Rejected,
            Some(reason.as_str()),
            FraudVerdict::unscored(),
            now,
        );
        match self.ledger.append(draft) {
            Ok(_) => {
                self.stats.increment(STAT_REJECTED);
                match correct_station {
                    Some(station) => VerifyResponse::rejected_wrong_station(station),
                    None => VerifyResponse::rejected(reason),
                }
            }
            Err(e) => {
                tracing::warn!(voter = %request.voter_id, "audit append failed: {e}");
                self.stats.increment(STAT_FAILED);
                VerifyResponse::failed(FailReason::UpstreamUnavailable)
            }
        }
    }

    /// Record a failure outcome (no claim held).
    fn record_failure(
        &self,
        request: &VerificationRequest,
        reason: FailReason,
        now: Timestamp,
    ) -> VerifyResponse {
        let draft = self.draft(
            request,
            AuditOutcome::Failed,
            Some(reason.as_str()),
            FraudVerdict::unscored(),
            now,
        );
        if let Err(e) = self.ledger.append(draft) {
            tracing::warn!(voter = %request.voter_id, "audit append failed: {e}");
            self.stats.increment(STAT_FAILED);
            return VerifyResponse::failed(FailReason::UpstreamUnavailable);
        }
        self.stats.increment(STAT_FAILED);
        VerifyResponse::failed(reason)
    }

    /// Compensation path: an infrastructure failure happened after a
    /// successful claim. Write the claim-resolved-as-failed record, then
    /// release the claim so the voter can retry once the infrastructure
    /// recovers. If even the compensating write fails, release best-effort
    /// and surface the fatal condition for manual intervention.
    fn resolve_failed_claim(
        &self,
        request: &VerificationRequest,
        now: Timestamp,
    ) -> Result<VerifyResponse, EngineError> {
        let draft = self.draft(
            request,
            AuditOutcome::Failed,
            Some(FailReason::UpstreamUnavailable.as_str()),
            FraudVerdict::unscored(),
            now,
        );
        match self.ledger.append(draft) {
            Ok(_) => {
                if let Err(e) = self.guard.release(&request.voter_id) {
                    tracing::warn!(voter = %request.voter_id, "claim release failed: {e}");
                }
                self.stats.increment(STAT_FAILED);
                Ok(VerifyResponse::failed(FailReason::UpstreamUnavailable))
            }
            Err(e) => {
                let _ = self.guard.release(&request.voter_id);
                tracing::error!(
                    voter = %request.voter_id,
                    "compensating audit write failed, manual intervention required: {e}"
                );
                Err(EngineError::Fatal {
                    voter: request.voter_id.to_string(),
                    detail: e.to_string(),
                })
            }
        }
    }
}
