//! The verification orchestrator.
//!
//! Ties the registry, the double-vote guard, the audit ledger, and the
//! fraud engine into the per-request state machine:
//!
//! `Received -> EligibilityChecked -> Claimed|Rejected -> Scored -> Recorded`
//!
//! Every component is injected through the constructor, so the whole engine
//! runs against the LMDB backends in production and the nullable doubles in
//! tests.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;

pub use config::EngineConfig;
pub use error::EngineError;
pub use orchestrator::VerificationOrchestrator;
pub use outcome::{FailReason, RejectReason, VerifyResponse, VerifyStatus};
