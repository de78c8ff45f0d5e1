//! The fraud engine — rules plus model, one verdict per request.

use crate::error::FraudError;
use crate::features::FeatureVector;
use crate::model::{ModelSlot, ZScoreModel};
use crate::rules;
use pollguard_ledger::AuditLedger;
use pollguard_store::AuditStore;
use pollguard_types::{EngineParams, FraudVerdict, Timestamp, VerificationRequest};
use std::sync::Arc;
use std::time::Duration;

/// Map a raw decision-function score onto a confidence in [0, 1].
///
/// Logistic over the signed score: strongly negative (anomalous) scores
/// approach 1, strongly positive (inlier) scores approach 0. The clamp
/// guards the contract even if a model implementation returns something
/// wild.
fn confidence_from_score(score: f64) -> f64 {
    let confidence = 1.0 / (1.0 + (2.0 * score).exp());
    confidence.clamp(0.0, 1.0)
}

/// Combines rule checks and the anomaly model into a [`FraudVerdict`].
///
/// Scoring is read-only over the ledger and never blocks on training: the
/// model is consulted through a [`ModelSlot`] that a background task swaps.
pub struct FraudEngine<S: AuditStore> {
    ledger: Arc<AuditLedger<S>>,
    params: EngineParams,
    slot: ModelSlot,
}

impl<S: AuditStore + 'static> FraudEngine<S> {
    pub fn new(ledger: Arc<AuditLedger<S>>, params: EngineParams) -> Self {
        Self {
            ledger,
            params,
            slot: ModelSlot::new(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.slot.is_trained()
    }

    /// Score one request against the ledger's recent history.
    ///
    /// The rule checks always run; the untrained model degrades confidence
    /// to zero and adds its placeholder reason without suppressing them.
    /// The placeholder alone does not make a verdict suspicious.
    pub fn evaluate(
        &self,
        request: &VerificationRequest,
        now: Timestamp,
    ) -> Result<FraudVerdict, FraudError> {
        let mut reasons = rules::rule_reasons(request, &self.ledger, &self.params, now)?;
        let rule_flagged = !reasons.is_empty();

        let (confidence, model_flagged) = match self.slot.current() {
            Some(model) => {
                let result = model.score(&FeatureVector::from_request(request));
                (confidence_from_score(result.score), result.is_anomaly)
            }
            None => {
                reasons.push(rules::REASON_UNTRAINED.to_string());
                (0.0, false)
            }
        };

        let verdict = FraudVerdict {
            is_suspicious: model_flagged || rule_flagged,
            confidence,
            reasons,
        };
        if verdict.is_suspicious {
            tracing::info!(
                voter = %request.voter_id,
                terminal = %request.terminal_id,
                confidence = verdict.confidence,
                reasons = ?verdict.reasons,
                "suspicious verification attempt"
            );
        }
        Ok(verdict)
    }

    /// Fit a model on the trailing training window and publish it.
    ///
    /// Returns `Ok(false)` when there is not enough history yet — that is a
    /// degraded mode, not an error. Intended for tests, first-boot priming,
    /// and the background task; never called on the request path.
    pub fn train_now(&self, now: Timestamp) -> Result<bool, FraudError> {
        let cutoff = now.sub_secs(self.params.training_window_secs);
        let records = self.ledger.records_since(cutoff)?;
        if records.len() < self.params.min_training_records {
            return Ok(false);
        }

        let samples: Vec<FeatureVector> =
            records.iter().map(FeatureVector::from_record).collect();
        match ZScoreModel::fit(&samples) {
            Some(model) => {
                let count = model.sample_count();
                self.slot.publish(Arc::new(model));
                tracing::info!(samples = count, "anomaly model trained");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Spawn the background retraining task.
    ///
    /// Fires immediately, then on the configured cadence, fitting off the
    /// async runtime and publishing via the slot's atomic swap. Stops when
    /// the shutdown channel fires.
    pub fn spawn_retraining(
        self: &Arc<Self>,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        let cadence = Duration::from_secs(engine.params.retrain_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cadence);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => {
                        tracing::info!("model retraining task shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let engine = Arc::clone(&engine);
                        match tokio::task::spawn_blocking(move || {
                            engine.train_now(Timestamp::now())
                        })
                        .await
                        {
                            Ok(Ok(true)) => {}
                            Ok(Ok(false)) => {
                                tracing::debug!("not enough history to train anomaly model");
                            }
                            Ok(Err(e)) => tracing::warn!("model retraining failed: {e}"),
                            Err(e) => tracing::warn!("model retraining task panicked: {e}"),
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollguard_ledger::RecordDraft;
    use pollguard_nullables::MemAuditStore;
    use pollguard_types::{
        AuditOutcome, StationId, TerminalId, VerificationMethod, VoterId,
    };

    fn setup() -> (Arc<AuditLedger<MemAuditStore>>, FraudEngine<MemAuditStore>) {
        let ledger = Arc::new(AuditLedger::new(MemAuditStore::new()));
        let engine = FraudEngine::new(Arc::clone(&ledger), EngineParams::default());
        (ledger, engine)
    }

    fn request(duration: f64) -> VerificationRequest {
        VerificationRequest {
            voter_id: VoterId::new("V1"),
            method: VerificationMethod::Card,
            terminal_id: TerminalId::new("T1"),
            station_id: StationId::new("S1"),
            client_timestamp: Timestamp::new(50_000),
            duration_secs: duration,
            terminal_load: 1.0,
            retry_count: 0,
        }
    }

    fn history_draft(i: u64, at: u64) -> RecordDraft {
        RecordDraft {
            voter: VoterId::new(format!("H{i}")),
            terminal: TerminalId::new(format!("T{}", i % 7)),
            station: StationId::new("S1"),
            method: VerificationMethod::Card,
            duration_secs: 4.0 + (i % 5) as f64 * 0.3,
            terminal_load: 1.0 + (i % 3) as f64,
            retry_count: (i % 2) as u32,
            outcome: AuditOutcome::Verified,
            reason: None,
            verdict: FraudVerdict::unscored(),
            recorded_at: Timestamp::new(at),
        }
    }

    fn seed_history(ledger: &AuditLedger<MemAuditStore>, count: u64, start_at: u64) {
        for i in 0..count {
            ledger.append(history_draft(i, start_at + i * 20)).unwrap();
        }
    }

    // ── Untrained mode ──────────────────────────────────────────────────

    #[test]
    fn untrained_empty_history_scenario() {
        let (_ledger, engine) = setup();
        let verdict = engine.evaluate(&request(5.0), Timestamp::new(50_000)).unwrap();
        assert!(!verdict.is_suspicious);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.reasons, vec![rules::REASON_UNTRAINED.to_string()]);
    }

    #[test]
    fn rules_still_fire_when_untrained() {
        let (_ledger, engine) = setup();
        let verdict = engine.evaluate(&request(1.0), Timestamp::new(50_000)).unwrap();
        assert!(verdict.is_suspicious, "rule finding makes the verdict suspicious");
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(
            verdict.reasons,
            vec![
                rules::REASON_SPEED.to_string(),
                rules::REASON_UNTRAINED.to_string(),
            ]
        );
    }

    // ── Training ────────────────────────────────────────────────────────

    #[test]
    fn training_needs_minimum_history() {
        let (ledger, engine) = setup();
        seed_history(&ledger, 99, 48_000);
        assert!(!engine.train_now(Timestamp::new(50_000)).unwrap());
        assert!(!engine.is_trained());

        ledger.append(history_draft(99, 49_990)).unwrap();
        assert!(engine.train_now(Timestamp::new(50_000)).unwrap());
        assert!(engine.is_trained());
    }

    #[test]
    fn training_window_excludes_old_records() {
        let (ledger, engine) = setup();
        // 200 records, all older than the 4-hour window ending at t=114_400.
        seed_history(&ledger, 200, 50_000);
        assert!(!engine.train_now(Timestamp::new(100_000 + 4 * 3600)).unwrap());
    }

    // ── Trained evaluation ──────────────────────────────────────────────

    #[test]
    fn trained_inlier_is_clean_with_bounded_confidence() {
        let (ledger, engine) = setup();
        seed_history(&ledger, 120, 48_000);
        assert!(engine.train_now(Timestamp::new(51_000)).unwrap());

        let verdict = engine.evaluate(&request(4.5), Timestamp::new(51_000)).unwrap();
        assert!(!verdict.is_suspicious);
        assert!(verdict.reasons.is_empty());
        assert!((0.0..=1.0).contains(&verdict.confidence));
        assert!(verdict.confidence < 0.5, "inlier confidence should be low");
    }

    #[test]
    fn trained_outlier_is_suspicious_with_clamped_confidence() {
        let (ledger, engine) = setup();
        seed_history(&ledger, 120, 48_000);
        engine.train_now(Timestamp::new(51_000)).unwrap();

        let mut outlier = request(5.0);
        outlier.duration_secs = 900.0;
        outlier.terminal_load = 500.0;
        outlier.retry_count = 60;

        let verdict = engine.evaluate(&outlier, Timestamp::new(51_000)).unwrap();
        assert!(verdict.is_suspicious);
        assert!((0.0..=1.0).contains(&verdict.confidence));
        assert!(verdict.confidence > 0.5, "outlier confidence should be high");
        // The model label alone flags it; no rule reason required.
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn confidence_mapping_is_always_in_range() {
        for score in [-1e9, -100.0, -1.0, 0.0, 0.5, 1.0, 100.0, 1e9] {
            let confidence = confidence_from_score(score);
            assert!((0.0..=1.0).contains(&confidence), "score {score} mapped out of range");
        }
        assert!(confidence_from_score(-2.0) > confidence_from_score(0.5));
    }

    // ── Background task ─────────────────────────────────────────────────

    #[tokio::test]
    async fn retraining_task_trains_and_shuts_down() {
        let (ledger, engine) = setup();
        seed_history(&ledger, 150, Timestamp::now().as_secs() - 600);
        let engine = Arc::new(engine);
        let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

        let handle = engine.spawn_retraining(shutdown_rx);
        // First tick fires immediately; give the blocking fit a moment.
        for _ in 0..50 {
            if engine.is_trained() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(engine.is_trained());

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
