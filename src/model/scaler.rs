//! Zero-mean, unit-variance feature scaling.

use serde::{Deserialize, Serialize};

use crate::types::ThunderError;

/// Per-feature standardisation fitted on the training partition.
///
/// Remembers the feature names it was fitted with so that a caller built
/// around a different feature order is rejected at transform time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    /// Population standard deviation; 1.0 for constant features.
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on `rows`, each of which must have one value per feature name.
    pub fn fit(rows: &[Vec<f64>], feature_names: &[&str]) -> Result<Self, ThunderError> {
        let n_features = feature_names.len();
        if rows.is_empty() {
            return Err(ThunderError::InsufficientData(
                "cannot fit scaler on zero rows".into(),
            ));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != n_features) {
            return Err(ThunderError::ModelMismatch(format!(
                "scaler expects {n_features} features, row has {}",
                bad.len()
            )));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; n_features];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut scale = vec![0.0; n_features];
        for row in rows {
            for ((s, v), m) in scale.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut scale {
            let std = (*s / n).sqrt();
            *s = if std > f64::EPSILON { std } else { 1.0 };
        }

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            mean,
            scale,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Standardise one row. No refitting happens here.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ThunderError> {
        if row.len() != self.n_features() {
            return Err(ThunderError::ModelMismatch(format!(
                "scaler was fitted on {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ThunderError> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
