//! Fraud scoring for verification attempts.
//!
//! Two independent signal sources feed one [`FraudVerdict`]:
//! deterministic rule checks (speed, per-terminal rate, impossible travel)
//! and a trained anomaly model consulted as a black box behind the
//! [`AnomalyModel`] trait. The model is published with a copy-on-write swap
//! and retrained by a background task, so scoring never blocks on training.
//!
//! A suspicious verdict is advisory: it is recorded and surfaced for human
//! review, the orchestrator decides what to do with it.

pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod rules;

pub use engine::FraudEngine;
pub use error::FraudError;
pub use features::FeatureVector;
pub use model::{AnomalyModel, AnomalyScore, ModelSlot, ZScoreModel};
