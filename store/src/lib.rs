//! Abstract storage traits for the PollGuard core.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.

pub mod audit;
pub mod claim;
pub mod error;

pub use audit::AuditStore;
pub use claim::{ClaimEntry, ClaimOutcome, ClaimStore};
pub use error::StoreError;
