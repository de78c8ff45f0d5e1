//! The anomaly model seam and its shipped implementation.

use crate::features::FeatureVector;
use std::sync::{Arc, RwLock};

/// Raw model output for one feature vector.
///
/// `score` follows decision-function conventions: positive for inliers,
/// negative for outliers. `is_anomaly` is the model's own binary label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnomalyScore {
    pub score: f64,
    pub is_anomaly: bool,
}

/// A trained scoring function, consumed as a black box.
///
/// Implementations must be immutable once constructed — retraining builds a
/// fresh model and publishes it through [`ModelSlot`], never mutates a live
/// one.
pub trait AnomalyModel: Send + Sync {
    fn score(&self, features: &FeatureVector) -> AnomalyScore;
}

/// Mean absolute z-score above which a sample is labeled anomalous.
const ANOMALY_Z_CUTOFF: f64 = 3.0;

/// Floor for per-feature standard deviation, so constant features do not
/// divide by zero.
const STD_FLOOR: f64 = 1e-9;

/// Per-feature Gaussian outlier detector.
///
/// Stores the mean and standard deviation of each feature over the training
/// window. Scoring computes the mean absolute z-score across features and
/// maps it onto the decision-function convention: z = 0 scores +0.5,
/// z = [`ANOMALY_Z_CUTOFF`] scores -1.0, monotone in between and beyond.
#[derive(Clone, Debug)]
pub struct ZScoreModel {
    mean: [f64; FeatureVector::DIM],
    std: [f64; FeatureVector::DIM],
    samples: usize,
}

impl ZScoreModel {
    /// Fit the detector to a training window. Returns `None` for an empty
    /// window; the minimum-record policy lives in the fraud engine.
    pub fn fit(samples: &[FeatureVector]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;

        let mut mean = [0.0; FeatureVector::DIM];
        for sample in samples {
            for (m, x) in mean.iter_mut().zip(sample.as_array()) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = [0.0; FeatureVector::DIM];
        for sample in samples {
            for ((v, m), x) in var.iter_mut().zip(mean).zip(sample.as_array()) {
                *v += (x - m) * (x - m);
            }
        }
        let mut std = [0.0; FeatureVector::DIM];
        for (s, v) in std.iter_mut().zip(var) {
            *s = (v / n).sqrt();
        }

        Some(Self {
            mean,
            std,
            samples: samples.len(),
        })
    }

    /// Number of samples this model was fitted on.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    fn mean_abs_z(&self, features: &FeatureVector) -> f64 {
        let values = features.as_array();
        let mut total = 0.0;
        for i in 0..FeatureVector::DIM {
            let std = self.std[i].max(STD_FLOOR);
            total += (values[i] - self.mean[i]).abs() / std;
        }
        total / FeatureVector::DIM as f64
    }
}

impl AnomalyModel for ZScoreModel {
    fn score(&self, features: &FeatureVector) -> AnomalyScore {
        let z = self.mean_abs_z(features);
        AnomalyScore {
            // z = 0 -> +0.5, z at the cutoff -> -1.0, monotone throughout.
            score: 0.5 - z / 2.0,
            is_anomaly: z > ANOMALY_Z_CUTOFF,
        }
    }
}

/// Shared-read, singly-updated model holder.
///
/// Readers clone the `Arc` under a short read lock; training publishes a
/// fully-formed replacement under a short write lock. A reader always sees
/// either the old model or the new one, never a partially trained one.
pub struct ModelSlot {
    inner: RwLock<Option<Arc<dyn AnomalyModel>>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// The currently published model, if any.
    pub fn current(&self) -> Option<Arc<dyn AnomalyModel>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Atomically replace the published model.
    pub fn publish(&self, model: Arc<dyn AnomalyModel>) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(model);
    }

    pub fn is_trained(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}
