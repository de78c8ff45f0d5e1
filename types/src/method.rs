//! How a voter identified themselves at the terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identification method used for a verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    /// Voter card read by the terminal's card reader.
    Card,
    /// Fingerprint / biometric scan matched against the registry.
    Biometric,
    /// Manual ID entry by a poll worker (fallback path).
    Manual,
}

impl VerificationMethod {
    /// Stable numeric code, used as a model feature.
    pub fn code(&self) -> u8 {
        match self {
            VerificationMethod::Card => 1,
            VerificationMethod::Biometric => 2,
            VerificationMethod::Manual => 3,
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationMethod::Card => "card",
            VerificationMethod::Biometric => "biometric",
            VerificationMethod::Manual => "manual",
        };
        write!(f, "{s}")
    }
}
