use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    /// The one unrecoverable failure mode: a claim was taken, the outcome
    /// could not be recorded, and the compensating audit write failed too.
    /// Requires manual intervention.
    #[error("verification for voter {voter} cannot be resolved: {detail}")]
    Fatal { voter: String, detail: String },
}
