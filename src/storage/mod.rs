//! Artifact persistence.
//!
//! Saves and loads the fitted scaler and classifier as two JSON files in
//! the model directory. Both files carry the pair's fingerprint; loading
//! refuses a directory where only one file exists or the two disagree.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{RandomForest, StandardScaler, TrainedArtifacts};
use crate::types::ThunderError;

/// File holding the fitted scaler.
pub const SCALER_FILE: &str = "scaler.json";

/// File holding the fitted classifier.
pub const MODEL_FILE: &str = "thunderstorm_model.json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    fingerprint: Uuid,
    trained_at: DateTime<Utc>,
    payload: T,
}

fn storage_err(path: &Path, action: &str, e: impl std::fmt::Display) -> ThunderError {
    ThunderError::Storage(format!("Failed to {action} {}: {e}", path.display()))
}

fn write_envelope<T: Serialize>(
    path: &Path,
    artifacts: &TrainedArtifacts,
    payload: &T,
) -> Result<(), ThunderError> {
    let envelope = Envelope {
        fingerprint: artifacts.fingerprint(),
        trained_at: artifacts.trained_at(),
        payload,
    };
    let json = serde_json::to_string(&envelope).map_err(|e| storage_err(path, "serialise", e))?;
    std::fs::write(path, json).map_err(|e| storage_err(path, "write", e))
}

fn read_envelope<T: DeserializeOwned>(path: &Path) -> Result<Envelope<T>, ThunderError> {
    let json = std::fs::read_to_string(path).map_err(|e| storage_err(path, "read", e))?;
    serde_json::from_str(&json).map_err(|e| storage_err(path, "parse", e))
}

fn paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(SCALER_FILE), dir.join(MODEL_FILE))
}

/// Save both artifacts, creating `dir` if needed.
pub fn save_artifacts(artifacts: &TrainedArtifacts, dir: &Path) -> Result<(), ThunderError> {
    std::fs::create_dir_all(dir).map_err(|e| storage_err(dir, "create", e))?;
    let (scaler_path, model_path) = paths(dir);

    write_envelope(&scaler_path, artifacts, artifacts.scaler())?;
    write_envelope(&model_path, artifacts, artifacts.classifier())?;

    debug!(
        dir = %dir.display(),
        fingerprint = %artifacts.fingerprint(),
        "Artifacts saved"
    );
    Ok(())
}

/// Load the artifact pair from `dir`.
/// Returns None if neither file exists (nothing trained yet).
pub fn load_artifacts(dir: &Path) -> Result<Option<TrainedArtifacts>, ThunderError> {
    let (scaler_path, model_path) = paths(dir);

    match (scaler_path.exists(), model_path.exists()) {
        (false, false) => {
            info!(dir = %dir.display(), "No saved artifacts found");
            return Ok(None);
        }
        (true, false) | (false, true) => {
            return Err(ThunderError::ModelMismatch(format!(
                "unpaired artifacts in {}: {SCALER_FILE} and {MODEL_FILE} must both exist",
                dir.display()
            )));
        }
        (true, true) => {}
    }

    let scaler: Envelope<StandardScaler> = read_envelope(&scaler_path)?;
    let model: Envelope<RandomForest> = read_envelope(&model_path)?;

    if scaler.fingerprint != model.fingerprint {
        return Err(ThunderError::ModelMismatch(format!(
            "scaler {} was not trained with classifier {}",
            scaler.fingerprint, model.fingerprint
        )));
    }

    info!(
        dir = %dir.display(),
        fingerprint = %model.fingerprint,
        trained_at = %model.trained_at,
        trees = model.payload.n_trees(),
        "Artifacts loaded from disk"
    );

    Ok(Some(TrainedArtifacts::from_parts(
        model.fingerprint,
        model.trained_at,
        scaler.payload,
        model.payload,
    )))
}

/// Delete both artifact files (for testing or reset).
pub fn delete_artifacts(dir: &Path) -> Result<(), ThunderError> {
    let (scaler_path, model_path) = paths(dir);
    for path in [scaler_path, model_path] {
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| storage_err(&path, "delete", e))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
