//! CART classification tree.
//!
//! Grown to purity (or `max_depth`) with Gini impurity, a random subset
//! of candidate features per split, and midpoint thresholds. Nodes live in
//! a flat arena so persisted trees never nest.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Class-probability distribution of the training rows that reached it.
    Leaf { distribution: Vec<f64> },
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features drawn per split.
    pub max_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_classes: usize,
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `sample` (duplicates allowed, as
    /// produced by bootstrap resampling). `labels` are class indices.
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[usize],
        sample: &[usize],
        n_classes: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { distribution: Vec::new() }];
        let mut stack = vec![(0usize, sample.to_vec(), 0usize)];

        while let Some((id, idx, depth)) = stack.pop() {
            let mut counts = vec![0.0; n_classes];
            for &i in &idx {
                counts[labels[i]] += 1.0;
            }
            let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
            let depth_ok = params.max_depth.map_or(true, |d| depth < d);

            let split = if !pure && depth_ok && idx.len() >= params.min_samples_split {
                Self::best_split(rows, labels, &idx, &counts, params.max_features, rng)
            } else {
                None
            };

            match split {
                Some(c) => {
                    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                        idx.iter().copied().partition(|&i| rows[i][c.feature] <= c.threshold);
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf { distribution: Vec::new() });
                    nodes.push(Node::Leaf { distribution: Vec::new() });
                    nodes[id] = Node::Split {
                        feature: c.feature,
                        threshold: c.threshold,
                        left,
                        right,
                    };
                    stack.push((right, right_idx, depth + 1));
                    stack.push((left, left_idx, depth + 1));
                }
                None => {
                    let total = idx.len() as f64;
                    let distribution = if total > 0.0 {
                        counts.iter().map(|c| c / total).collect()
                    } else {
                        vec![1.0 / n_classes as f64; n_classes]
                    };
                    nodes[id] = Node::Leaf { distribution };
                }
            }
        }

        Self { nodes, n_classes }
    }

    /// Lowest weighted-Gini split among `max_features` shuffled features.
    /// Keeps drawing features past the budget while none has separated
    /// the rows (every visited feature constant on this node).
    fn best_split(
        rows: &[Vec<f64>],
        labels: &[usize],
        idx: &[usize],
        counts: &[f64],
        max_features: usize,
        rng: &mut StdRng,
    ) -> Option<Candidate> {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let n = idx.len() as f64;
        let mut best: Option<Candidate> = None;
        let mut order = idx.to_vec();

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= max_features && best.is_some() {
                break;
            }
            order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

            let mut left = vec![0.0; counts.len()];
            let mut right = counts.to_vec();
            for k in 0..order.len() - 1 {
                let class = labels[order[k]];
                left[class] += 1.0;
                right[class] -= 1.0;

                let value = rows[order[k]][feature];
                let next = rows[order[k + 1]][feature];
                if next <= value {
                    continue;
                }

                let n_left = (k + 1) as f64;
                let n_right = n - n_left;
                let impurity = (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n;
                if best.map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }

    /// Leaf distribution for one (already scaled) row.
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, d)) = stack.pop() {
            max = max.max(d);
            if let Node::Split { left, right, .. } = &self.nodes[id] {
                stack.push((*left, d + 1));
                stack.push((*right, d + 1));
            }
        }
        max
    }
}
