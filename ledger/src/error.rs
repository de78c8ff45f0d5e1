use pollguard_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("record serialization failed: {0}")]
    Serialization(String),

    #[error("audit chain corrupted at sequence {sequence}: {detail}")]
    ChainCorrupted { sequence: u64, detail: String },
}
