//! Gradient Boosting implementation
//!
//! Squared-error boosting over depth-limited regression trees, with row and
//! column subsampling.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::decision_tree::RegressionTree;
use super::Regressor;
use crate::error::Result;

/// Gradient Boosting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Subsample ratio for each tree
    pub subsample: f64,
    /// Column subsample ratio
    pub colsample_bytree: f64,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_leaf: 1,
            subsample: 0.8,
            colsample_bytree: 0.8,
            random_state: Some(42),
        }
    }
}

/// Gradient Boosting Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    trees: Vec<RegressionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_prediction: f64,
    feature_importances: Vec<f64>,
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_prediction: 0.0,
            feature_importances: Vec::new(),
        }
    }

    /// Fit the gradient boosting model
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        // Initialize with mean
        self.initial_prediction = y.mean().unwrap_or(0.0);

        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.feature_importances = vec![0.0; n_features];

        for _ in 0..self.config.n_estimators {
            // Compute residuals in parallel for large datasets
            let residuals: Array1<f64> = if n_samples > 10000 {
                let preds = &predictions;
                let res: Vec<f64> = (0..n_samples)
                    .into_par_iter()
                    .map(|i| y[i] - preds[i])
                    .collect();
                Array1::from_vec(res)
            } else {
                y.iter()
                    .zip(predictions.iter())
                    .map(|(yi, pi)| yi - pi)
                    .collect()
            };

            let sample_indices = subsample_indices(n_samples, self.config.subsample, &mut rng);
            let col_indices = subsample_indices(n_features, self.config.colsample_bytree, &mut rng);

            let (x_sub, y_sub) = subsample_data(x, &residuals, &sample_indices, &col_indices);

            // Train a tree on residuals
            let mut tree = RegressionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &y_sub)?;

            // Update predictions (with learning rate)
            let tree_pred = tree.predict(&x_sub)?;
            for (i, &idx) in sample_indices.iter().enumerate() {
                predictions[idx] += self.config.learning_rate * tree_pred[i];
            }

            // Accumulate feature importance
            if let Some(tree_importance) = tree.feature_importances() {
                for (j, &col_idx) in col_indices.iter().enumerate() {
                    if j < tree_importance.len() {
                        self.feature_importances[col_idx] += tree_importance[j];
                    }
                }
            }

            self.trees.push(tree);
            self.col_indices_per_tree.push(col_indices);
        }

        // Normalize feature importances
        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= total;
            }
        }

        Ok(())
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let n = x.nrows();
        let mut predictions = Array1::from_elem(n, self.initial_prediction);

        for (tree, col_indices) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(Axis(1), col_indices);
            let tree_pred = tree.predict(&x_sub)?;
            for i in 0..n {
                predictions[i] += self.config.learning_rate * tree_pred[i];
            }
        }

        Ok(predictions)
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        GradientBoostingRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        GradientBoostingRegressor::predict(self, x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        Some(Array1::from_vec(self.feature_importances.clone()))
    }
}

fn subsample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    let sample_size = ((n as f64) * ratio).ceil() as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size.max(1));
    indices.sort();
    indices
}

fn subsample_data(
    x: &Array2<f64>,
    y: &Array1<f64>,
    row_indices: &[usize],
    col_indices: &[usize],
) -> (Array2<f64>, Array1<f64>) {
    let x_rows = x.select(Axis(0), row_indices);
    let x_sub = x_rows.select(Axis(1), col_indices);
    let y_sub: Array1<f64> = Array1::from_vec(row_indices.iter().map(|&i| y[i]).collect());
    (x_sub, y_sub)
}
