//! The audit ledger — append-only, tamper-evident verification history.
//!
//! Every verification attempt ends as one [`AuditRecord`] whose hash
//! incorporates the previous record's hash, so any retroactive edit breaks
//! the chain from that point on. The ledger is the single writer of
//! sequence order and the single source of truth for the history the fraud
//! engine queries.

pub mod error;
pub mod ledger;
pub mod record;

pub use error::LedgerError;
pub use ledger::AuditLedger;
pub use record::{AuditRecord, RecordDraft};
