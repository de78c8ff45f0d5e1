//! LMDB storage backend for the PollGuard core.
//!
//! Implements the storage traits from `pollguard-store` using the `heed`
//! LMDB bindings. Each logical store maps to one or more LMDB databases
//! within a single environment. LMDB serializes write transactions, which
//! is exactly what the claim CAS and the audit append contract need: the
//! whole check-and-write runs inside one transaction.

pub mod audit;
pub mod claim;
pub mod environment;
pub mod error;

pub use audit::LmdbAuditStore;
pub use claim::LmdbClaimStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
