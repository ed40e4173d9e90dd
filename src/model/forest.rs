//! Random-forest classifier over `RiskLevel` labels.
//!
//! Bootstrap-aggregated CART trees. Every tree draws its seed from one
//! master `StdRng`, so a fixed seed reproduces the exact same forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::tree::{DecisionTree, TreeParams};
use crate::types::{RiskLevel, ThunderError};

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Classes seen in training, ascending. Index order of every
    /// probability vector.
    classes: Vec<RiskLevel>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[RiskLevel],
        params: &ForestParams,
    ) -> Result<Self, ThunderError> {
        if rows.len() != labels.len() {
            return Err(ThunderError::ModelMismatch(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let n_features = match rows.first() {
            Some(r) => r.len(),
            None => {
                return Err(ThunderError::InsufficientData(
                    "cannot fit classifier on zero rows".into(),
                ))
            }
        };
        if rows.iter().any(|r| r.len() != n_features) {
            return Err(ThunderError::ModelMismatch(
                "rows have differing feature counts".into(),
            ));
        }

        let classes: Vec<RiskLevel> = labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if classes.len() < 2 {
            return Err(ThunderError::InsufficientData(format!(
                "classifier needs at least 2 label classes, training rows only contain {classes:?}"
            )));
        }
        let y: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
        };

        let n = rows.len();
        let mut master = StdRng::seed_from_u64(params.seed);
        let trees: Vec<DecisionTree> = (0..params.n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.gen::<u64>());
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(rows, &y, &sample, classes.len(), &tree_params, &mut rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            rows = n,
            classes = ?classes,
            mean_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>() / trees.len().max(1),
            "Random forest fitted"
        );

        Ok(Self {
            classes,
            n_features,
            trees,
        })
    }

    pub fn classes(&self) -> &[RiskLevel] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the trees' leaf distributions, indexed like `classes()`.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ThunderError> {
        if row.len() != self.n_features {
            return Err(ThunderError::ModelMismatch(format!(
                "classifier was fitted on {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        if self.trees.is_empty() {
            return Err(ThunderError::ModelMismatch("classifier has no trees".into()));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let dist = tree.predict_proba(row);
            if dist.len() != proba.len() {
                return Err(ThunderError::ModelMismatch(format!(
                    "tree reports {} classes, forest has {}",
                    dist.len(),
                    proba.len()
                )));
            }
            for (p, d) in proba.iter_mut().zip(dist) {
                *p += d;
            }
        }
        let n = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n;
        }
        Ok(proba)
    }

    /// Most likely class and its probability.
    pub fn predict_with_proba(&self, row: &[f64]) -> Result<(RiskLevel, f64), ThunderError> {
        let proba = self.predict_proba(row)?;
        Ok(arg_max(&self.classes, &proba))
    }

    pub fn predict(&self, row: &[f64]) -> Result<RiskLevel, ThunderError> {
        Ok(self.predict_with_proba(row)?.0)
    }

    /// Fraction of rows predicted correctly, in [0, 1].
    pub fn score(&self, rows: &[Vec<f64>], labels: &[RiskLevel]) -> Result<f64, ThunderError> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(ThunderError::InsufficientData(format!(
                "cannot score {} rows against {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let mut correct = 0usize;
        for (row, label) in rows.iter().zip(labels) {
            if self.predict(row)? == *label {
                correct += 1;
            }
        }
        Ok(correct as f64 / rows.len() as f64)
    }
}

/// Highest-probability class. Equal probabilities resolve to the class
/// whose name sorts first (green, red, yellow), matching label-encoded
/// class order.
fn arg_max(classes: &[RiskLevel], proba: &[f64]) -> (RiskLevel, f64) {
    let mut best = 0;
    for (i, p) in proba.iter().enumerate().skip(1) {
        if *p > proba[best] || (*p == proba[best] && classes[i].as_str() < classes[best].as_str()) {
            best = i;
        }
    }
    (classes[best], proba[best])
}
