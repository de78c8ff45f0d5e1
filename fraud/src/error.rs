use pollguard_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FraudError {
    #[error("history query failed: {0}")]
    History(#[from] LedgerError),
}
