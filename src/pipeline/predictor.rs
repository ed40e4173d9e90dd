//! Risk prediction for a single reading.

use std::path::Path;
use tracing::debug;

use crate::model::TrainedArtifacts;
use crate::storage;
use crate::types::{PredictionResult, ThunderError, WeatherReading};

/// Scores readings with one scaler/classifier pair.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: TrainedArtifacts,
}

impl Predictor {
    /// Wrap in-memory artifacts, e.g. straight from the trainer.
    pub fn new(artifacts: TrainedArtifacts) -> Result<Self, ThunderError> {
        artifacts.check_compatible()?;
        Ok(Self { artifacts })
    }

    /// Load the artifact pair persisted in `dir`.
    pub fn load(dir: &Path) -> Result<Self, ThunderError> {
        match storage::load_artifacts(dir)? {
            Some(artifacts) => Self::new(artifacts),
            None => Err(ThunderError::ModelMismatch(format!(
                "no trained artifacts in {}",
                dir.display()
            ))),
        }
    }

    pub fn artifacts(&self) -> &TrainedArtifacts {
        &self.artifacts
    }

    /// Predict from a raw feature vector in `FEATURE_NAMES` order.
    pub fn predict_features(&self, features: &[f64]) -> Result<PredictionResult, ThunderError> {
        let scaled = self.artifacts.scaler().transform(features)?;
        let (risk_level, max_proba) = self.artifacts.classifier().predict_with_proba(&scaled)?;
        let probability = (max_proba * 100.0 * 10.0).round() / 10.0;

        debug!(%risk_level, probability, "Prediction made");
        Ok(PredictionResult {
            risk_level,
            probability,
            message: risk_level.message().to_string(),
        })
    }

    pub fn predict(&self, reading: &WeatherReading) -> Result<PredictionResult, ThunderError> {
        self.predict_features(&reading.features())
    }
}

/// Predict with optional artifacts. Missing artifacts are a mismatch.
pub fn predict(
    reading: &WeatherReading,
    artifacts: Option<&TrainedArtifacts>,
) -> Result<PredictionResult, ThunderError> {
    let artifacts = artifacts
        .ok_or_else(|| ThunderError::ModelMismatch("no trained artifacts available".into()))?;
    artifacts.check_compatible()?;
    Predictor {
        artifacts: artifacts.clone(),
    }
    .predict(reading)
}
