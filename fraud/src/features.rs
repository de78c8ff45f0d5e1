//! Feature extraction for the anomaly model.

use pollguard_ledger::AuditRecord;
use pollguard_types::VerificationRequest;

/// The model's input: one verification attempt reduced to numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector {
    /// Fractional hour of day in [0, 24).
    pub hour_of_day: f64,
    /// Seconds the identification step took.
    pub duration_secs: f64,
    /// Terminal-reported load.
    pub terminal_load: f64,
    /// Numeric code of the identification method.
    pub method_code: f64,
    /// Terminal-side retry count.
    pub retry_count: f64,
}

impl FeatureVector {
    pub const DIM: usize = 5;

    /// Features for a live request (hour taken from the terminal's clock,
    /// matching what the model was trained on).
    pub fn from_request(request: &VerificationRequest) -> Self {
        Self {
            hour_of_day: request.client_timestamp.hour_of_day(),
            duration_secs: request.duration_secs,
            terminal_load: request.terminal_load,
            method_code: request.method.code() as f64,
            retry_count: request.retry_count as f64,
        }
    }

    /// Features for a historical record (training path).
    pub fn from_record(record: &AuditRecord) -> Self {
        Self {
            hour_of_day: record.recorded_at.hour_of_day(),
            duration_secs: record.duration_secs,
            terminal_load: record.terminal_load,
            method_code: record.method.code() as f64,
            retry_count: record.retry_count as f64,
        }
    }

    pub fn as_array(&self) -> [f64; Self::DIM] {
        [
            self.hour_of_day,
            self.duration_secs,
            self.terminal_load,
            self.method_code,
            self.retry_count,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollguard_types::{
        StationId, TerminalId, Timestamp, VerificationMethod, VerificationRequest, VoterId,
    };

    #[test]
    fn request_features_use_client_clock() {
        let request = VerificationRequest {
            voter_id: VoterId::new("V1"),
            method: VerificationMethod::Biometric,
            terminal_id: TerminalId::new("T1"),
            station_id: StationId::new("S1"),
            client_timestamp: Timestamp::new(9 * 3600 + 1800), // 09:30 UTC
            duration_secs: 3.5,
            terminal_load: 2.0,
            retry_count: 1,
        };
        let f = FeatureVector::from_request(&request);
        assert!((f.hour_of_day - 9.5).abs() < 1e-9);
        assert_eq!(f.duration_secs, 3.5);
        assert_eq!(f.method_code, 2.0);
        assert_eq!(f.retry_count, 1.0);
        assert_eq!(f.as_array().len(), FeatureVector::DIM);
    }
}
