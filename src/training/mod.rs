//! Model training module
//!
//! Provides the two regressors the pipeline compares:
//! - Gradient boosting over depth-limited regression trees
//! - Neural network (MLP) regression

mod decision_tree;
mod gradient_boosting;
mod metrics;
mod neural_network;

pub use decision_tree::{RegressionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use metrics::RegressionMetrics;
pub use neural_network::{Activation, MlpConfig, MlpRegressor};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Trait for regression models
pub trait Regressor: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Get feature importances (if available)
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}
