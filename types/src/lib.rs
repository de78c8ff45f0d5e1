//! Fundamental types for the PollGuard verification core.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, timestamps, the audit record hash, verification
//! requests, registry eligibility snapshots, fraud verdicts, and the tunable
//! engine parameters.

pub mod eligibility;
pub mod hash;
pub mod ids;
pub mod method;
pub mod params;
pub mod request;
pub mod time;
pub mod verdict;

pub use eligibility::{VoterEligibility, VoterStatus};
pub use hash::RecordHash;
pub use ids::{StationId, TerminalId, VoterId};
pub use method::VerificationMethod;
pub use params::EngineParams;
pub use request::VerificationRequest;
pub use time::Timestamp;
pub use verdict::{AuditOutcome, FraudVerdict};
