//! Model training.
//!
//! Seeded 80/20 split, scaler fitted on the training partition only,
//! random forest on the scaled features, holdout accuracy, and the
//! scaler/classifier pair persisted together.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::model::{ForestParams, RandomForest, StandardScaler, TrainedArtifacts};
use crate::storage;
use crate::types::{Dataset, RiskLevel, ThunderError, FEATURE_NAMES};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Share of samples held out for scoring.
    pub test_fraction: f64,
    /// Seed for the split and the forest.
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Directory the artifact pair is written to.
    pub model_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            model_dir: PathBuf::from("models"),
        }
    }
}

// ---------------------------------------------------------------------------
// Trainer
// ---------------------------------------------------------------------------

/// Result of one training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: TrainedArtifacts,
    /// Holdout accuracy in [0, 1].
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
}

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Shuffle `n` indices with the pinned seed and cut off the test share
    /// (rounded up). Both partitions are non-empty for `n >= 2`.
    pub fn split(&self, n: usize) -> Split {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let test_size = if n < 2 {
            0
        } else {
            ((n as f64 * self.config.test_fraction).ceil() as usize).clamp(1, n - 1)
        };
        let train = indices.split_off(test_size);
        Split {
            train,
            test: indices,
        }
    }

    /// Fit, score and persist. No files are written unless fitting succeeds.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome, ThunderError> {
        let counts = dataset.class_counts();
        if dataset.len() < 2 {
            return Err(ThunderError::InsufficientData(format!(
                "need at least 2 samples, got {}",
                dataset.len()
            )));
        }
        if counts.len() < 2 {
            return Err(ThunderError::InsufficientData(format!(
                "need at least 2 label classes, dataset only has {:?}",
                counts.keys().collect::<Vec<_>>()
            )));
        }

        let features: Vec<Vec<f64>> = dataset
            .samples()
            .iter()
            .map(|s| s.reading.features().to_vec())
            .collect();
        let labels: Vec<RiskLevel> = dataset.samples().iter().map(|s| s.risk).collect();

        let split = self.split(dataset.len());
        let pick_rows = |idx: &[usize]| idx.iter().map(|&i| features[i].clone()).collect::<Vec<_>>();
        let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();

        let x_train = pick_rows(&split.train);
        let y_train = pick_labels(&split.train);
        let x_test = pick_rows(&split.test);
        let y_test = pick_labels(&split.test);

        let scaler = StandardScaler::fit(&x_train, &FEATURE_NAMES)?;
        let x_train = scaler.transform_all(&x_train)?;
        let x_test = scaler.transform_all(&x_test)?;

        let params = ForestParams {
            n_trees: self.config.n_trees,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            seed: self.config.seed,
        };
        let classifier = RandomForest::fit(&x_train, &y_train, &params)?;
        let accuracy = classifier.score(&x_test, &y_test)?;

        if classifier.classes().len() < counts.len() {
            warn!(
                trained = ?classifier.classes(),
                present = ?counts.keys().collect::<Vec<_>>(),
                "Some classes only appear in the test partition"
            );
        }

        let artifacts = TrainedArtifacts::pair(scaler, classifier);
        storage::save_artifacts(&artifacts, &self.config.model_dir)?;

        info!(
            samples = dataset.len(),
            train = split.train.len(),
            test = split.test.len(),
            accuracy = format!("{accuracy:.2}"),
            model_dir = %self.config.model_dir.display(),
            fingerprint = %artifacts.fingerprint(),
            "Model trained"
        );

        Ok(TrainingOutcome {
            artifacts,
            accuracy,
            train_size: split.train.len(),
            test_size: split.test.len(),
        })
    }
}
