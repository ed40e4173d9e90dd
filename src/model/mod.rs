//! Fitted model primitives.
//!
//! `StandardScaler` and `RandomForest` are only ever handed around
//! together as `TrainedArtifacts`, stamped with a shared fingerprint so a
//! scaler can never be paired with a classifier it was not trained with.

pub mod forest;
pub mod scaler;
pub mod tree;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use forest::{ForestParams, RandomForest};
pub use scaler::StandardScaler;

use crate::types::{ThunderError, FEATURE_NAMES};

/// A scaler and the classifier trained alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedArtifacts {
    fingerprint: Uuid,
    trained_at: DateTime<Utc>,
    scaler: StandardScaler,
    classifier: RandomForest,
}

impl TrainedArtifacts {
    /// Pair a freshly fitted scaler and classifier under a new fingerprint.
    pub fn pair(scaler: StandardScaler, classifier: RandomForest) -> Self {
        Self {
            fingerprint: Uuid::new_v4(),
            trained_at: Utc::now(),
            scaler,
            classifier,
        }
    }

    /// Reassemble artifacts read back from storage.
    pub(crate) fn from_parts(
        fingerprint: Uuid,
        trained_at: DateTime<Utc>,
        scaler: StandardScaler,
        classifier: RandomForest,
    ) -> Self {
        Self {
            fingerprint,
            trained_at,
            scaler,
            classifier,
        }
    }

    pub fn fingerprint(&self) -> Uuid {
        self.fingerprint
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &RandomForest {
        &self.classifier
    }

    /// Check the pair against the feature layout readings are built with.
    pub fn check_compatible(&self) -> Result<(), ThunderError> {
        let names = self.scaler.feature_names();
        if names.len() != FEATURE_NAMES.len() || names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b) {
            return Err(ThunderError::ModelMismatch(format!(
                "artifacts were fitted on features {names:?}, expected {FEATURE_NAMES:?}"
            )));
        }
        if self.classifier.n_features() != self.scaler.n_features() {
            return Err(ThunderError::ModelMismatch(format!(
                "scaler has {} features but classifier has {}",
                self.scaler.n_features(),
                self.classifier.n_features()
            )));
        }
        Ok(())
    }
}
